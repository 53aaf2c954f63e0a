use std::time::{Duration, Instant};

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use super::state::{AppState, Focus};
use super::widgets::{directory_at, point_to_units};
use crate::model::Pane;

const DOUBLE_CLICK: Duration = Duration::from_millis(500);

/// Tracks state for double-click detection
pub struct MouseState {
    last_click_time: Option<Instant>,
    last_click_col: u16,
    last_click_row: u16,
}

impl MouseState {
    pub fn new() -> Self {
        Self {
            last_click_time: None,
            last_click_col: 0,
            last_click_row: 0,
        }
    }

    /// Record a click and return true if it's a double-click (same position within 500ms)
    fn record_click(&mut self, col: u16, row: u16, now: Instant) -> bool {
        let is_double = self
            .last_click_time
            .is_some_and(|t| now.duration_since(t) < DOUBLE_CLICK)
            && self.last_click_col == col
            && self.last_click_row == row;

        self.last_click_time = if is_double { None } else { Some(now) };
        self.last_click_col = col;
        self.last_click_row = row;

        is_double
    }
}

fn contains(area: Rect, col: u16, row: u16) -> bool {
    area.contains(Position::new(col, row))
}

pub fn handle_mouse(event: MouseEvent, state: &mut AppState, mouse_state: &mut MouseState) {
    // Overlays own the screen
    if state.previewing().is_some() || state.confirm_delete.is_some() || state.show_help {
        return;
    }
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let shift = event.modifiers.contains(KeyModifiers::SHIFT);
            let is_double = mouse_state.record_click(event.column, event.row, Instant::now());
            handle_left_click(event.column, event.row, shift, is_double, state);
        }
        MouseEventKind::ScrollUp => handle_scroll(event.column, event.row, -1, state),
        MouseEventKind::ScrollDown => handle_scroll(event.column, event.row, 1, state),
        _ => {}
    }
}

fn handle_left_click(col: u16, row: u16, shift: bool, is_double: bool, state: &mut AppState) {
    for pane in Pane::ALL {
        let view = state.view(pane);
        let (tree_area, grid_area) = (view.tree_area, view.grid_area);

        if contains(tree_area, col, row) {
            state.active = pane;
            state.view_mut(pane).focus = Focus::Tree;
            let view = state.view(pane);
            if let Some(index) =
                directory_at(tree_area, row, col, view.directories.len(), view.tree_cursor)
            {
                state.view_mut(pane).tree_cursor = index;
                if is_double {
                    state.open_directory(pane);
                }
            }
            return;
        }

        if contains(grid_area, col, row) {
            state.active = pane;
            state.view_mut(pane).focus = Focus::Grid;
            let Some((x, y)) = point_to_units(grid_area, col, row) else {
                return;
            };
            let Some(index) = state.gallery.pane(pane).grid().index_at(x, y) else {
                return;
            };
            if is_double {
                state.view_mut(pane).cursor = index;
                state.open_preview_at_cursor(pane);
            } else {
                state.click_index(pane, index, shift);
            }
            return;
        }
    }
}

fn handle_scroll(col: u16, row: u16, direction: isize, state: &mut AppState) {
    for pane in Pane::ALL {
        let view = state.view(pane);
        if contains(view.tree_area, col, row) {
            state.move_tree_cursor(pane, direction);
            return;
        }
        if contains(view.grid_area, col, row) {
            let step = state.gallery.pane(pane).grid().row_stride() as i64;
            state.gallery.scroll_by(pane, step * direction as i64);
            return;
        }
    }
}
