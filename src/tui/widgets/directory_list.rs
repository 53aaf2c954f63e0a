use ratatui::{
    layout::Rect,
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::model::Pane;
use crate::tui::colors::{focus_style, FOCUS_COLOR, HEADER_COLOR};
use crate::tui::state::{AppState, Focus};

pub fn render_directory_list(frame: &mut Frame, area: Rect, state: &mut AppState, pane: Pane) {
    let focused = state.active == pane && state.view(pane).focus == Focus::Tree;
    let current = state.gallery.pane(pane).directory().map(str::to_string);
    let view = state.view_mut(pane);
    view.tree_area = area;

    let items: Vec<ListItem> = view
        .directories
        .iter()
        .map(|entry| {
            let open = current.as_deref() == Some(entry.id.as_str());
            let marker = if open { "▸ " } else { "  " };
            let style = if open {
                Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw("  ".repeat(entry.depth)),
                Span::raw(marker),
                Span::styled(entry.name.clone(), style),
            ]))
        })
        .collect();

    let title = match pane {
        Pane::Source => " Source ",
        Pane::Destination => " Destination ",
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(focused)),
        )
        .highlight_style(Style::default().bg(FOCUS_COLOR).fg(Color::Black));

    let mut list_state = ListState::default();
    if !view.directories.is_empty() {
        list_state.select(Some(view.tree_cursor));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Directory index under a screen position inside the list's borders
pub fn directory_at(area: Rect, row: u16, col: u16, count: usize, cursor: usize) -> Option<usize> {
    let inner_top = area.y + 1;
    let inner_bottom = area.y + area.height.saturating_sub(1);
    if col <= area.x || col >= area.x + area.width.saturating_sub(1) {
        return None;
    }
    if row < inner_top || row >= inner_bottom {
        return None;
    }
    // List scrolls to keep the cursor visible
    let visible = (inner_bottom - inner_top) as usize;
    let offset = (cursor + 1).saturating_sub(visible);
    let index = offset + (row - inner_top) as usize;
    (index < count).then_some(index)
}
