use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::colors::{HEADER_COLOR, HELP_TEXT, WARNING_COLOR};
use super::state::AppState;
use super::widgets::{render_directory_list, render_media_grid, render_preview, render_status_bar};
use crate::model::Pane;

/// Main render function
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let size = frame.area();

    // Status bar at bottom, content above
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    if state.gallery.view_context().is_split() {
        // Source | destination
        let pane_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(content_area);

        for (pane, area) in Pane::ALL.into_iter().zip(pane_chunks.iter().copied()) {
            render_pane(frame, area, state, pane);
        }
    } else {
        let active = state.active;
        // The hidden pane must not receive clicks
        let hidden = state.view_mut(active.other());
        hidden.tree_area = Rect::default();
        hidden.grid_area = Rect::default();
        render_pane(frame, content_area, state, active);
    }

    render_status_bar(frame, status_area, state);

    if let Some(pane) = state.previewing() {
        render_preview(frame, content_area, state, pane);
    }

    if let Some((pane, count)) = state.confirm_delete {
        render_confirm_delete(frame, size, pane, count);
    }

    if state.show_help {
        render_help_overlay(frame, size);
    }
}

/// Directory list on top, grid below
fn render_pane(frame: &mut Frame, area: Rect, state: &mut AppState, pane: Pane) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);
    render_directory_list(frame, chunks[0], state, pane);
    render_media_grid(frame, chunks[1], state, pane);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_confirm_delete(frame: &mut Frame, area: Rect, pane: Pane, count: usize) {
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" Delete "),
            Span::styled(
                format!("{} item{}", count, if count == 1 { "" } else { "s" }),
                Style::default().fg(WARNING_COLOR).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" from {}?", pane)),
        ]),
        Line::from(""),
        Line::from(Span::styled(" y: delete  n/Esc: cancel", Style::default().fg(HELP_TEXT))),
    ];

    let dialog_area = centered(area, 44, 6);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Confirm ")
        .title_style(Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD));
    frame.render_widget(Paragraph::new(lines).block(block), dialog_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
  Key Bindings

  Panes:
    Tab          Switch pane
    t            Toggle tree / grid focus
    z            One pane / both panes
    Enter        Open directory / preview
    r            Reload listing
    R            Reload everything
    f            Cycle filter

  Grid:
    ←↑↓→         Move cursor
    Shift+arrow  Extend selection
    Space        Toggle item
    a / A        Select / deselect all
    m            Single / multiple mode
    d            Toggle date overlay
    + / -        More / fewer columns
    s            Save selected item
    x            Delete selection

  Preview:  ←/→ navigate, Esc close
  Mouse: click, Shift+click, double-click
    ?            Toggle help
    q            Quit
"#;

    let help_area = centered(area, 46, 29);

    // Clear the area behind the popup
    frame.render_widget(Clear, help_area);

    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" Help "));

    frame.render_widget(help, help_area);
}
