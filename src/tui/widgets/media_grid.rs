use ratatui::{
    layout::Rect,
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::grid::GridCell;
use crate::model::{looks_like_video, Pane};
use crate::tui::colors::{
    focus_style, kind_marker, DATE_COLOR, FOCUS_COLOR, HELP_TEXT, PLACEHOLDER_COLOR, SELECTED_BG,
    UNFOCUS_COLOR,
};
use crate::tui::state::{AppState, Focus, UNITS_PER_LINE};

/// Screen rectangle of a grid cell, clipped to `area`.
///
/// `row_height` is in grid units; cells scrolled fully out of view give `None`.
pub fn cell_rect(area: Rect, cell: &GridCell, row_height: u32, scroll: u64) -> Option<Rect> {
    let per_line = UNITS_PER_LINE as i64;
    let top = (cell.y as i64 - scroll as i64).div_euclid(per_line);
    let lines = (row_height as i64 + per_line - 1) / per_line;
    let bottom = top + lines.max(1);

    let visible_top = top.max(0);
    let visible_bottom = bottom.min(area.height as i64);
    if visible_top >= visible_bottom || cell.x >= area.width as u32 {
        return None;
    }
    let width = cell.size.min(area.width as u32 - cell.x);

    Some(Rect::new(
        area.x + cell.x as u16,
        area.y + visible_top as u16,
        width as u16,
        (visible_bottom - visible_top) as u16,
    ))
}

/// Map a screen position to grid units relative to the viewport
pub fn point_to_units(area: Rect, col: u16, row: u16) -> Option<(u32, u32)> {
    if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
        return None;
    }
    Some((
        (col - area.x) as u32,
        (row - area.y) as u32 * UNITS_PER_LINE,
    ))
}

pub fn render_media_grid(frame: &mut Frame, area: Rect, state: &mut AppState, pane: Pane) {
    let focused = state.active == pane && state.view(pane).focus == Focus::Grid;
    let gallery = state.gallery.pane(pane);

    let title = match gallery.directory() {
        Some(_) => format!(
            " {} [{}] {}/{} selected ",
            gallery.filter(),
            match gallery.mode() {
                crate::selection::SelectionMode::Single => "single",
                crate::selection::SelectionMode::Multiple => "multi",
            },
            gallery.selection().len(),
            gallery.ids().len(),
        ),
        None => " no directory ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(focus_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Viewport follows the widget size before cells are laid out
    state.set_grid_area(pane, inner);

    let gallery = state.gallery.pane(pane);
    if gallery.ids().is_empty() {
        let hint = if gallery.directory().is_some() {
            "Empty"
        } else {
            "Pick a directory (Enter)"
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(HELP_TEXT)),
            inner,
        );
        return;
    }

    let grid = gallery.grid();
    let row_height = grid.row_height();
    let scroll = grid.scroll_offset();
    let show_dates = grid.show_dates();
    let cursor = state.view(pane).cursor;

    for cell in grid.visible_cells() {
        let Some(id) = &cell.id else {
            continue;
        };
        let Some(rect) = cell_rect(inner, &cell, row_height, scroll) else {
            continue;
        };

        let selected = gallery.is_selected(id);
        let is_cursor = cell.index == cursor;
        let detail = state.gallery.detail(pane, id);
        let thumbnail = state.gallery.thumbnail(pane, id);

        let label = detail
            .as_ref()
            .map(|d| d.label().to_string())
            .unwrap_or_else(|| id.to_string());
        let is_video = detail
            .as_ref()
            .map(|d| d.is_video())
            .unwrap_or_else(|| looks_like_video(id.as_str()));

        let thumb_span = match thumbnail.as_deref() {
            None => Span::styled("…", Style::default().fg(HELP_TEXT)),
            Some(url) if url == state.gallery.cache().placeholder_thumbnail() => {
                Span::styled("✕", Style::default().fg(PLACEHOLDER_COLOR))
            }
            Some(_) => Span::styled("▣", Style::default().fg(Color::White)),
        };

        let mut lines = vec![Line::from(vec![kind_marker(is_video), Span::raw(" "), thumb_span])];
        if show_dates {
            let date = detail
                .as_ref()
                .and_then(|d| d.created_at.clone())
                .unwrap_or_default();
            lines.push(Line::from(Span::styled(date, Style::default().fg(DATE_COLOR))));
        }

        let border = if is_cursor && focused {
            Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD)
        } else if is_cursor {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(UNFOCUS_COLOR)
        };
        let body = if selected {
            Style::default().bg(SELECTED_BG)
        } else {
            Style::default()
        };

        let widget = Paragraph::new(lines).style(body);
        if rect.height >= 3 && rect.width >= 3 {
            let cell_block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(label);
            frame.render_widget(widget.block(cell_block), rect);
        } else {
            frame.render_widget(widget, rect);
        }
    }
}
