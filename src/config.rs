//! Recognized options for a gallery session.
//!
//! One [`GalleryConfig`] is built at startup (file + CLI overrides) and handed
//! to the orchestrator once; panes read what they need from it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::ViewContext;
use crate::error::{GalleryError, Result};
use crate::selection::SelectionMode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub base_url: String,
    pub selection_mode: SelectionMode,
    pub view_context: ViewContext,
    /// Items prefetched right after a directory listing arrives
    pub prefetch_count: usize,
    pub cache: CacheConfig,
    pub grid: GridConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            selection_mode: SelectionMode::Multiple,
            view_context: ViewContext::DesktopSplit,
            prefetch_count: 20,
            cache: CacheConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub high_water: usize,
    pub low_water: usize,
    pub fetch_timeout_secs: u64,
    pub placeholder_thumbnail: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            high_water: 500,
            low_water: 200,
            fetch_timeout_secs: 10,
            placeholder_thumbnail: "placeholder.svg".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub gap: u32,
    pub overscan_rows: usize,
    pub date_overlay_height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            gap: 8,
            overscan_rows: 6,
            date_overlay_height: 28,
        }
    }
}

impl GalleryConfig {
    /// Default location: `<config dir>/dualpane/config.json`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dualpane")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from an explicit file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GalleryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: GalleryConfig =
            serde_json::from_str(&text).map_err(|e| GalleryError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config.normalized())
    }

    /// Load from `path`, or the default location if it exists, or defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.exists() => Self::load(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Repair values that would break invariants instead of rejecting them
    pub fn normalized(mut self) -> Self {
        if self.cache.high_water == 0 {
            self.cache.high_water = CacheConfig::default().high_water;
        }
        if self.cache.low_water >= self.cache.high_water {
            self.cache.low_water = self.cache.high_water / 2;
        }
        // The entry just stored must survive its own eviction pass
        self.cache.low_water = self.cache.low_water.max(1);
        if self.cache.fetch_timeout_secs == 0 {
            self.cache.fetch_timeout_secs = CacheConfig::default().fetch_timeout_secs;
        }
        self
    }
}
