use ratatui::{
    layout::Rect,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::model::{MediaDetail, Pane};
use crate::tui::colors::{kind_marker, HEADER_COLOR, HELP_TEXT};
use crate::tui::state::AppState;

fn field<'a>(name: &'a str, value: Option<&'a str>) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:>10}: ", name), Style::default().fg(HELP_TEXT)),
        Span::raw(value.unwrap_or("-")),
    ])
}

fn detail_lines(detail: &MediaDetail) -> Vec<Line<'_>> {
    let mut lines = vec![
        field("Name", detail.name.as_deref()),
        field("Alt", Some(detail.alt.as_str())),
        field("Created", detail.created_at.as_deref()),
        field("Size", detail.size.as_deref()),
        field("Camera", detail.camera_model.as_deref()),
        field("Path", detail.path.as_deref()),
        field("Hash", detail.hash.as_deref()),
    ];
    if let Some(count) = detail.duplicates_count {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>10}: ", "Duplicates"), Style::default().fg(HELP_TEXT)),
            Span::raw(count.to_string()),
        ]));
    }
    lines
}

/// Full-screen view of the item open in a pane's preview
pub fn render_preview(frame: &mut Frame, area: Rect, state: &AppState, pane: Pane) {
    let gallery = state.gallery.pane(pane);
    let Some(id) = gallery.preview().current() else {
        return;
    };
    let position = gallery
        .ids()
        .iter()
        .position(|x| x == id)
        .map(|i| format!("{}/{}", i + 1, gallery.ids().len()))
        .unwrap_or_default();

    let detail = state.gallery.detail(pane, id);
    let url = state.gallery.media_url(pane, id);
    let is_video = detail.as_ref().map(|d| d.is_video()).unwrap_or(false);

    let mut lines = vec![
        Line::from(vec![
            kind_marker(is_video),
            Span::raw(" "),
            Span::styled(
                detail
                    .as_ref()
                    .map(|d| d.label().to_string())
                    .unwrap_or_else(|| id.to_string()),
                Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", position), Style::default().fg(HELP_TEXT)),
        ]),
        Line::from(""),
    ];
    match &detail {
        Some(detail) => lines.extend(detail_lines(detail)),
        None => lines.push(Line::from(Span::styled(
            "Loading details...",
            Style::default().fg(HELP_TEXT),
        ))),
    }
    lines.push(Line::from(""));
    lines.push(field("Media", Some(url.as_str())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ←/→: previous/next  Esc: close",
        Style::default().fg(HELP_TEXT),
    )));

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Preview ({}) ", pane))
        .title_style(Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
