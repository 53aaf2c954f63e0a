use ratatui::{layout::Rect, prelude::*, widgets::Paragraph};

use crate::selection::SelectionMode;
use crate::tui::colors::{STATUS_BAR_BG, STATUS_BAR_FG};
use crate::tui::state::{AppState, Focus};

pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let pane = state.active;
    let gallery = state.gallery.pane(pane);
    let mut parts = Vec::new();

    let focus = match state.view(pane).focus {
        Focus::Tree => "tree",
        Focus::Grid => "grid",
    };
    parts.push(format!("[{} {}]", pane, focus));

    if let Some(message) = &state.status_message {
        parts.push(message.clone());
    } else {
        let mode = match gallery.mode() {
            SelectionMode::Single => "single",
            SelectionMode::Multiple => "multi",
        };
        let columns = state.gallery.columns(pane);
        parts.push(format!("{} | {} | {} cols", gallery.filter(), mode, columns));
        let stats = state.gallery.cache().stats();
        parts.push(format!(
            "cache {}t/{}d ({} pending)",
            stats.thumbnails,
            stats.details,
            stats.pending_thumbnails + stats.pending_details
        ));
    }

    let hints = "Tab:pane  Space:select  Enter:open  x:delete  ?:help  q:quit";

    let left_part = parts.join(" | ");
    let width = (area.width as usize).saturating_sub(hints.len());
    let status_text = format!("{:width$}{}", left_part, hints, width = width);

    let status = Paragraph::new(status_text)
        .style(Style::default().bg(STATUS_BAR_BG).fg(STATUS_BAR_FG));

    frame.render_widget(status, area);
}
