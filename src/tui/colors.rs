//! Semantic color constants for consistent TUI styling.

use ratatui::prelude::*;

pub const VIDEO_INDICATOR: Color = Color::Magenta;
pub const IMAGE_INDICATOR: Color = Color::Green;
pub const PLACEHOLDER_COLOR: Color = Color::Red;
pub const FOCUS_COLOR: Color = Color::Cyan;
pub const UNFOCUS_COLOR: Color = Color::DarkGray;
pub const SELECTED_BG: Color = Color::Blue;
pub const DATE_COLOR: Color = Color::Yellow;
pub const HEADER_COLOR: Color = Color::White;
pub const HELP_TEXT: Color = Color::DarkGray;
pub const WARNING_COLOR: Color = Color::Yellow;
pub const STATUS_BAR_BG: Color = Color::DarkGray;
pub const STATUS_BAR_FG: Color = Color::White;

/// Border style for a pane section depending on focus
pub fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(FOCUS_COLOR)
    } else {
        Style::default().fg(UNFOCUS_COLOR)
    }
}

/// Short media-kind marker: `[V]` for videos, `[I]` otherwise
pub fn kind_marker(is_video: bool) -> Span<'static> {
    if is_video {
        Span::styled("[V]", Style::default().fg(VIDEO_INDICATOR))
    } else {
        Span::styled("[I]", Style::default().fg(IMAGE_INDICATOR))
    }
}
