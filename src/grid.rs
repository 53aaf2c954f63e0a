//! Virtualized grid over a flat, ordered id list.
//!
//! Items are square cells laid out row-major with a fixed gap. Only rows in
//! the viewport (plus an overscan margin) are materialized, and every id that
//! becomes visible is reported once so its detail and thumbnail can be
//! fetched.
//!
//! Units are abstract: pixels for a browser, or any consistent unit for a
//! terminal front end.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use tracing::trace;

use crate::config::GridConfig;
use crate::model::MediaId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMetrics {
    pub gap: u32,
    pub overscan_rows: usize,
    /// Extra row height while the date overlay is shown
    pub date_overlay_height: u32,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self::from(&GridConfig::default())
    }
}

impl From<&GridConfig> for GridMetrics {
    fn from(config: &GridConfig) -> Self {
        Self {
            gap: config.gap,
            overscan_rows: config.overscan_rows,
            date_overlay_height: config.date_overlay_height,
        }
    }
}

/// Rendered row range, overscan included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportWindow {
    pub columns_count: usize,
    pub row_height_px: u32,
    pub first_visible_row: usize,
    pub last_visible_row: usize,
}

impl ViewportWindow {
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.first_visible_row..=self.last_visible_row
    }
}

/// One materialized grid position. `id` is `None` past the end of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
    pub index: usize,
    pub id: Option<MediaId>,
    /// Offset of the cell inside the scrolled content
    pub x: u32,
    pub y: u64,
    pub size: u32,
}

#[derive(Debug, Clone)]
pub struct GridDriver {
    metrics: GridMetrics,
    columns: usize,
    ids: Vec<MediaId>,
    width: u32,
    height: u32,
    scroll_offset: u64,
    show_dates: bool,
    visible: HashSet<MediaId>,
}

impl GridDriver {
    pub fn new(metrics: GridMetrics, columns: usize) -> Self {
        Self {
            metrics,
            columns: columns.max(1),
            ids: Vec::new(),
            width: 0,
            height: 0,
            scroll_offset: 0,
            show_dates: false,
            visible: HashSet::new(),
        }
    }

    pub fn columns_count(&self) -> usize {
        self.columns
    }

    pub fn ids(&self) -> &[MediaId] {
        &self.ids
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn show_dates(&self) -> bool {
        self.show_dates
    }

    /// Ids inside the current window, in no particular order
    pub fn visible_ids(&self) -> impl Iterator<Item = &MediaId> {
        self.visible.iter()
    }

    pub fn row_count(&self) -> usize {
        self.ids.len().div_ceil(self.columns)
    }

    /// Square item edge length for the current width
    pub fn item_size(&self) -> u32 {
        let gaps = self.metrics.gap.saturating_mul(self.columns as u32 - 1);
        (self.width.saturating_sub(gaps) / self.columns as u32).max(1)
    }

    pub fn row_height(&self) -> u32 {
        let overlay = if self.show_dates {
            self.metrics.date_overlay_height
        } else {
            0
        };
        self.item_size() + overlay
    }

    /// Row height plus gap
    pub fn row_stride(&self) -> u64 {
        self.row_height() as u64 + self.metrics.gap as u64
    }

    pub fn content_height(&self) -> u64 {
        let rows = self.row_count() as u64;
        if rows == 0 {
            return 0;
        }
        rows * self.row_height() as u64 + (rows - 1) * self.metrics.gap as u64
    }

    pub fn max_scroll(&self) -> u64 {
        self.content_height().saturating_sub(self.height as u64)
    }

    /// Replace the id list. A different list scrolls back to the top.
    /// Returns ids that entered the viewport.
    pub fn set_ids(&mut self, ids: Vec<MediaId>) -> Vec<MediaId> {
        if ids != self.ids {
            self.ids = ids;
            self.scroll_offset = 0;
        }
        self.refresh_visibility()
    }

    /// Change the column count (min 1). A change scrolls back to the top.
    pub fn set_columns(&mut self, columns: usize) -> Vec<MediaId> {
        let columns = columns.max(1);
        if columns != self.columns {
            self.columns = columns;
            self.scroll_offset = 0;
        }
        self.refresh_visibility()
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) -> Vec<MediaId> {
        self.width = width;
        self.height = height;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        self.refresh_visibility()
    }

    pub fn set_show_dates(&mut self, show: bool) -> Vec<MediaId> {
        self.show_dates = show;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        self.refresh_visibility()
    }

    pub fn scroll_to(&mut self, offset: u64) -> Vec<MediaId> {
        self.scroll_offset = offset.min(self.max_scroll());
        self.refresh_visibility()
    }

    pub fn scroll_by(&mut self, delta: i64) -> Vec<MediaId> {
        let target = if delta < 0 {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta as u64)
        };
        self.scroll_to(target)
    }

    /// Scroll the minimum needed for `index`'s row to be on screen
    pub fn scroll_into_view(&mut self, index: usize) -> Vec<MediaId> {
        if index >= self.ids.len() {
            return Vec::new();
        }
        let row = (index / self.columns) as u64;
        let top = row * self.row_stride();
        let bottom = top + self.row_height() as u64;
        let viewport = self.height as u64;

        let target = if top < self.scroll_offset {
            top
        } else if bottom > self.scroll_offset + viewport {
            bottom.saturating_sub(viewport)
        } else {
            self.scroll_offset
        };
        self.scroll_to(target)
    }

    /// Rendered row range, or `None` for an empty list
    pub fn window(&self) -> Option<ViewportWindow> {
        let rows = self.row_count();
        if rows == 0 {
            return None;
        }
        let stride = self.row_stride();
        let first_on_screen = (self.scroll_offset / stride) as usize;
        let bottom = self.scroll_offset + (self.height as u64).max(1) - 1;
        let last_on_screen = (bottom / stride) as usize;

        let first = first_on_screen.min(rows - 1).saturating_sub(self.metrics.overscan_rows);
        let last = (last_on_screen + self.metrics.overscan_rows).min(rows - 1);

        Some(ViewportWindow {
            columns_count: self.columns,
            row_height_px: self.row_height(),
            first_visible_row: first,
            last_visible_row: last,
        })
    }

    /// Id at a grid position; `None` for positions past the end
    pub fn cell(&self, row: usize, column: usize) -> Option<&MediaId> {
        if column >= self.columns {
            return None;
        }
        self.ids.get(row * self.columns + column)
    }

    /// Every cell of the rendered rows, including empty trailing cells
    pub fn visible_cells(&self) -> Vec<GridCell> {
        let Some(window) = self.window() else {
            return Vec::new();
        };
        let size = self.item_size();
        let stride = self.row_stride();
        let rows = window.last_visible_row - window.first_visible_row + 1;
        let mut cells = Vec::with_capacity(rows * self.columns);
        for row in window.rows() {
            for column in 0..self.columns {
                let index = row * self.columns + column;
                cells.push(GridCell {
                    row,
                    column,
                    index,
                    id: self.ids.get(index).cloned(),
                    x: column as u32 * (size + self.metrics.gap),
                    y: row as u64 * stride,
                    size,
                });
            }
        }
        cells
    }

    /// Index of the item under a viewport-relative point
    pub fn index_at(&self, x: u32, y: u32) -> Option<usize> {
        let size = self.item_size();
        let column_stride = size + self.metrics.gap;
        let column = (x / column_stride) as usize;
        if column >= self.columns || x % column_stride >= size {
            return None;
        }
        let content_y = self.scroll_offset + y as u64;
        let stride = self.row_stride();
        if content_y % stride >= self.row_height() as u64 {
            return None;
        }
        let index = (content_y / stride) as usize * self.columns + column;
        (index < self.ids.len()).then_some(index)
    }

    fn refresh_visibility(&mut self) -> Vec<MediaId> {
        let now: Vec<MediaId> = match self.window() {
            Some(window) => {
                let start = window.first_visible_row * self.columns;
                let end = ((window.last_visible_row + 1) * self.columns).min(self.ids.len());
                self.ids[start..end].to_vec()
            }
            None => Vec::new(),
        };

        let entered: Vec<MediaId> = now
            .iter()
            .filter(|id| !self.visible.contains(*id))
            .cloned()
            .collect();
        self.visible = now.into_iter().collect();

        if !entered.is_empty() {
            trace!(entered = entered.len(), scroll = self.scroll_offset, "cells entered viewport");
        }
        entered
    }
}
