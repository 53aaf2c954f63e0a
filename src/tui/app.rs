use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::mouse::{self, MouseState};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::cli::Session;
use crate::preview::PreviewKey;
use crate::settings::SettingsStore;

use super::state::{AppState, Focus};
use super::ui::render;

/// Run the TUI application
#[instrument(skip_all, fields(url = %session.backend.base_url()))]
pub fn run_tui(session: Session, store: SettingsStore) -> Result<()> {
    info!("starting TUI");

    debug!("loading directory trees");
    let mut state = AppState::new(session, store)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Main loop
    let result = run_app(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut mouse_state = MouseState::new();
    let mut dirty = true;

    loop {
        // Fetches land on runtime workers; redraw when any settles
        if state.poll_cache_events() {
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| render(frame, state))?;
            dirty = false;
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        // Drain all pending events to avoid lag during rapid navigation
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let KeyAction::Quit = handle_key(key, state) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse_event) => {
                    mouse::handle_mouse(mouse_event, state, &mut mouse_state);
                }
                _ => {}
            }
            dirty = true;
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }
    }
}

enum KeyAction {
    Quit,
    Continue,
}

/// Handle a key press. Returns KeyAction indicating what to do next.
fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    // Delete confirmation is modal
    if state.confirm_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => state.confirm_delete(),
            _ => state.confirm_delete = None,
        }
        return KeyAction::Continue;
    }

    if state.show_help {
        state.show_help = false;
        return KeyAction::Continue;
    }

    // Preview captures arrows and Esc while open
    if let Some(pane) = state.previewing() {
        let preview_key = match key.code {
            KeyCode::Left | KeyCode::Char('h') => Some(PreviewKey::ArrowLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(PreviewKey::ArrowRight),
            KeyCode::Esc | KeyCode::Enter => Some(PreviewKey::Escape),
            _ => None,
        };
        match (preview_key, key.code) {
            (Some(preview_key), _) => {
                state.gallery.preview_key(pane, preview_key);
            }
            (None, KeyCode::Char('q')) => return KeyAction::Quit,
            _ => {}
        }
        return KeyAction::Continue;
    }

    let pane = state.active;
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    state.status_message = None;

    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('?') => state.show_help = true,
        KeyCode::Tab | KeyCode::BackTab => state.active = pane.other(),
        KeyCode::Char('t') => {
            let view = state.view_mut(pane);
            view.focus = match view.focus {
                Focus::Tree => Focus::Grid,
                Focus::Grid => Focus::Tree,
            };
        }
        KeyCode::Char('r') => state.refresh(pane),
        KeyCode::Char('R') => state.reload_all(),
        KeyCode::Char('z') => state.toggle_split(),
        KeyCode::Char('f') => state.cycle_filter(pane),
        KeyCode::Char('x') | KeyCode::Delete => state.request_delete(),
        _ => match state.view(pane).focus {
            Focus::Tree => handle_tree_key(key.code, state),
            Focus::Grid => handle_grid_key(key.code, shift, state),
        },
    }
    KeyAction::Continue
}

fn handle_tree_key(code: KeyCode, state: &mut AppState) {
    let pane = state.active;
    match code {
        KeyCode::Up | KeyCode::Char('k') => state.move_tree_cursor(pane, -1),
        KeyCode::Down | KeyCode::Char('j') => state.move_tree_cursor(pane, 1),
        KeyCode::PageUp => state.move_tree_cursor(pane, -10),
        KeyCode::PageDown => state.move_tree_cursor(pane, 10),
        KeyCode::Enter | KeyCode::Right => state.open_directory(pane),
        _ => {}
    }
}

fn handle_grid_key(code: KeyCode, shift: bool, state: &mut AppState) {
    let pane = state.active;
    match code {
        KeyCode::Left | KeyCode::Char('h') => state.move_cursor(pane, -1, shift),
        KeyCode::Right | KeyCode::Char('l') => state.move_cursor(pane, 1, shift),
        KeyCode::Up | KeyCode::Char('k') => state.move_cursor_rows(pane, -1, shift),
        KeyCode::Down | KeyCode::Char('j') => state.move_cursor_rows(pane, 1, shift),
        KeyCode::PageUp => state.move_cursor_rows(pane, -5, shift),
        KeyCode::PageDown => state.move_cursor_rows(pane, 5, shift),
        KeyCode::Char(' ') => state.toggle_at_cursor(pane),
        KeyCode::Char('a') => state.gallery.select_all(pane),
        KeyCode::Char('A') => state.gallery.deselect_all(pane),
        KeyCode::Char('m') => {
            state.gallery.toggle_mode(pane);
        }
        KeyCode::Char('d') => {
            state.gallery.toggle_date_overlay(pane);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => state.adjust_columns(pane, 1),
        KeyCode::Char('-') => state.adjust_columns(pane, -1),
        KeyCode::Char('s') => state.download(pane),
        KeyCode::Enter => state.open_preview_at_cursor(pane),
        KeyCode::Esc => state.view_mut(pane).focus = Focus::Tree,
        _ => {}
    }
}
