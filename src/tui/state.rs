use std::sync::Arc;

use anyhow::{Context, Result};
use ratatui::layout::Rect;
use tokio::runtime::Runtime;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use crate::backend::HttpBackend;
use crate::cache::CacheEvent;
use crate::cli::{sanitize_file_name, Session};
use crate::columns::{ColumnSettings, ViewContext};
use crate::config::GridConfig;
use crate::gallery::{DownloadRequest, GalleryOrchestrator};
use crate::model::{DirectoryNode, MediaId, Pane};
use crate::settings::SettingsStore;

/// Terminal rows are roughly twice as tall as columns are wide
pub const UNITS_PER_LINE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Grid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub depth: usize,
    pub id: String,
    pub name: String,
}

/// View-only state of one pane; gallery state lives in the orchestrator.
#[derive(Debug, Clone)]
pub struct PaneView {
    pub directories: Vec<TreeEntry>,
    pub tree_cursor: usize,
    /// Index of the highlighted item in the pane's id list
    pub cursor: usize,
    pub focus: Focus,
    pub tree_area: Rect,
    pub grid_area: Rect,
}

impl PaneView {
    fn new() -> Self {
        Self {
            directories: Vec::new(),
            tree_cursor: 0,
            cursor: 0,
            focus: Focus::Tree,
            tree_area: Rect::default(),
            grid_area: Rect::default(),
        }
    }
}

/// Move `current` by `delta` within `0..len`, stopping at the ends
pub fn step_cursor(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = current as isize + delta;
    target.clamp(0, len as isize - 1) as usize
}

pub struct AppState {
    pub gallery: GalleryOrchestrator<HttpBackend>,
    runtime: Runtime,
    backend: Arc<HttpBackend>,
    events: broadcast::Receiver<CacheEvent>,
    pub active: Pane,
    pub source: PaneView,
    pub destination: PaneView,
    pub status_message: Option<String>,
    pub show_help: bool,
    /// Pane and item count awaiting delete confirmation
    pub confirm_delete: Option<(Pane, usize)>,
}

impl AppState {
    pub fn new(session: Session, store: SettingsStore) -> Result<Self> {
        let cache = session.cache();
        let Session {
            mut config,
            runtime,
            backend,
        } = session;

        // One grid unit per terminal column
        config.grid = GridConfig {
            gap: 1,
            overscan_rows: config.grid.overscan_rows,
            date_overlay_height: UNITS_PER_LINE,
        };

        let events = cache.subscribe();
        let columns = ColumnSettings::load(store).context("Failed to load column settings")?;
        let gallery = GalleryOrchestrator::new(&config, cache, columns);

        let mut state = Self {
            gallery,
            runtime,
            backend,
            events,
            active: Pane::Source,
            source: PaneView::new(),
            destination: PaneView::new(),
            status_message: None,
            show_help: false,
            confirm_delete: None,
        };
        for pane in Pane::ALL {
            state.load_tree(pane);
        }
        Ok(state)
    }

    pub fn view(&self, pane: Pane) -> &PaneView {
        match pane {
            Pane::Source => &self.source,
            Pane::Destination => &self.destination,
        }
    }

    pub fn view_mut(&mut self, pane: Pane) -> &mut PaneView {
        match pane {
            Pane::Source => &mut self.source,
            Pane::Destination => &mut self.destination,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Drain cache notifications. Returns true if anything landed.
    pub fn poll_cache_events(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return changed,
            }
        }
    }

    pub fn load_tree(&mut self, pane: Pane) {
        match self.runtime.block_on(self.gallery.list_directories(pane)) {
            Ok(tree) => {
                let entries = DirectoryNode::flatten(&tree)
                    .into_iter()
                    .map(|(depth, node)| TreeEntry {
                        depth,
                        id: node.id.clone(),
                        name: node.name.clone(),
                    })
                    .collect::<Vec<_>>();
                info!(%pane, dirs = entries.len(), "loaded directory tree");
                let view = self.view_mut(pane);
                view.directories = entries;
                view.tree_cursor = step_cursor(view.tree_cursor, 0, view.directories.len());
            }
            Err(e) => {
                warn!(%pane, error = %e, "directory tree unavailable");
                self.set_status(format!("{}: {}", pane, e));
            }
        }
    }

    pub fn selected_directory(&self, pane: Pane) -> Option<&TreeEntry> {
        let view = self.view(pane);
        view.directories.get(view.tree_cursor)
    }

    pub fn move_tree_cursor(&mut self, pane: Pane, delta: isize) {
        let view = self.view_mut(pane);
        view.tree_cursor = step_cursor(view.tree_cursor, delta, view.directories.len());
    }

    /// Open the directory under the tree cursor and focus the grid
    pub fn open_directory(&mut self, pane: Pane) {
        let Some(entry) = self.selected_directory(pane).cloned() else {
            return;
        };
        self.gallery.set_directory(pane, entry.id);
        let view = self.view_mut(pane);
        view.cursor = 0;
        view.focus = Focus::Grid;
        self.refresh(pane);
    }

    pub fn refresh(&mut self, pane: Pane) {
        match self.runtime.block_on(self.gallery.refresh(pane)) {
            Ok(count) => {
                let view = self.view_mut(pane);
                view.cursor = step_cursor(view.cursor, 0, count);
                self.set_status(format!("{}: {} items", pane, count));
            }
            Err(e) => self.set_status(format!("Refresh failed: {}", e)),
        }
    }

    /// Drop every cached item, then reload trees and listings of both panes
    pub fn reload_all(&mut self) {
        self.gallery.cache().clear();
        for pane in Pane::ALL {
            self.load_tree(pane);
            self.refresh(pane);
        }
        info!("reloaded both panes");
        self.set_status("Reloaded both panes");
    }

    /// Switch between both panes side by side and the active pane alone
    pub fn toggle_split(&mut self) {
        let current = self.gallery.view_context();
        let context = ViewContext::from_layout(current.is_mobile(), !current.is_split());
        self.gallery.set_view_context(context);
        for pane in Pane::ALL {
            let cursor = self.view(pane).cursor;
            self.gallery.scroll_into_view(pane, cursor);
        }
        self.set_status(format!("Layout: {}", context));
    }

    pub fn cycle_filter(&mut self, pane: Pane) {
        let next = self.gallery.pane(pane).filter().next();
        self.gallery.set_filter(pane, next);
        self.refresh(pane);
    }

    pub fn cursor_id(&self, pane: Pane) -> Option<MediaId> {
        self.gallery
            .pane(pane)
            .ids()
            .get(self.view(pane).cursor)
            .cloned()
    }

    /// Move the grid cursor; with `extend` the move also selects the range
    pub fn move_cursor(&mut self, pane: Pane, delta: isize, extend: bool) {
        if extend && self.gallery.pane(pane).anchor().is_none() {
            // Range starts at the item the cursor leaves
            if let Some(id) = self.cursor_id(pane) {
                self.gallery.click(pane, &id, false);
            }
        }
        let len = self.gallery.pane(pane).ids().len();
        let view = self.view_mut(pane);
        view.cursor = step_cursor(view.cursor, delta, len);
        let cursor = view.cursor;
        self.gallery.scroll_into_view(pane, cursor);
        if extend {
            if let Some(id) = self.cursor_id(pane) {
                self.gallery.click(pane, &id, true);
            }
        }
    }

    pub fn move_cursor_rows(&mut self, pane: Pane, rows: isize, extend: bool) {
        let columns = self.gallery.pane(pane).grid().columns_count() as isize;
        self.move_cursor(pane, rows * columns, extend);
    }

    pub fn click_index(&mut self, pane: Pane, index: usize, shift_held: bool) {
        let Some(id) = self.gallery.pane(pane).ids().get(index).cloned() else {
            return;
        };
        self.view_mut(pane).cursor = index;
        self.gallery.click(pane, &id, shift_held);
    }

    pub fn toggle_at_cursor(&mut self, pane: Pane) {
        let cursor = self.view(pane).cursor;
        self.click_index(pane, cursor, false);
    }

    pub fn adjust_columns(&mut self, pane: Pane, delta: i32) {
        match self.gallery.adjust_columns(pane, delta) {
            Ok(count) => {
                let cursor = self.view(pane).cursor;
                self.gallery.scroll_into_view(pane, cursor);
                self.set_status(format!("{}: {} columns", pane, count));
            }
            Err(e) => self.set_status(format!("Could not save columns: {}", e)),
        }
    }

    pub fn open_preview_at_cursor(&mut self, pane: Pane) {
        if let Some(id) = self.cursor_id(pane) {
            self.gallery.open_preview(pane, id);
        }
    }

    /// Pane whose preview is open, if any
    pub fn previewing(&self) -> Option<Pane> {
        Pane::ALL
            .into_iter()
            .find(|pane| self.gallery.pane(*pane).preview().is_open())
    }

    /// Pane a delete should apply to: the active one if it has a selection
    pub fn delete_target(&self) -> Option<Pane> {
        if !self.gallery.selected_ids(self.active).is_empty() {
            return Some(self.active);
        }
        self.gallery.pane_with_selection()
    }

    pub fn request_delete(&mut self) {
        match self.delete_target() {
            Some(pane) => {
                let count = self.gallery.selected_ids(pane).len();
                self.confirm_delete = Some((pane, count));
            }
            None => self.set_status("Nothing selected"),
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some((pane, _)) = self.confirm_delete.take() else {
            return;
        };
        match self.runtime.block_on(self.gallery.delete_selected(pane)) {
            Ok(report) => {
                let len = self.gallery.pane(pane).ids().len();
                let view = self.view_mut(pane);
                view.cursor = step_cursor(view.cursor, 0, len);
                self.set_status(format!("Deleted {} items from {}", report.deleted.len(), pane));
            }
            Err(e) => self.set_status(format!("Delete failed: {}", e)),
        }
    }

    pub fn download(&mut self, pane: Pane) {
        match self.gallery.download_selected(pane) {
            DownloadRequest::NothingSelected => self.set_status("Nothing selected"),
            DownloadRequest::BulkUnsupported { count } => self.set_status(format!(
                "Bulk download is not supported ({} selected)",
                count
            )),
            DownloadRequest::Single { url, file_name, .. } => {
                let file_name = sanitize_file_name(&file_name);
                let fetched = self.runtime.block_on(self.backend.fetch_bytes(&url));
                let message = match fetched {
                    Ok(bytes) => match std::fs::write(&file_name, &bytes) {
                        Ok(()) => format!("Saved {} ({} bytes)", file_name, bytes.len()),
                        Err(e) => format!("Could not write {}: {}", file_name, e),
                    },
                    Err(e) => format!("Download failed: {}", e),
                };
                self.set_status(message);
            }
        }
    }

    /// Record the grid's screen area and size the pane's viewport to it
    pub fn set_grid_area(&mut self, pane: Pane, area: Rect) {
        self.view_mut(pane).grid_area = area;
        self.gallery.set_viewport(
            pane,
            area.width as u32,
            area.height as u32 * UNITS_PER_LINE,
        );
    }
}
