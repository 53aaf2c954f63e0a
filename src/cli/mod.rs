mod columns;
mod delete;
mod download;
mod list;
mod status;
mod tree;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tracing::warn;

use crate::backend::HttpBackend;
use crate::cache::{CacheOptions, MediaCache};
use crate::config::GalleryConfig;
use crate::settings::SettingsStore;

pub use columns::{run_columns, ColumnRow, ColumnsOptions};
pub use delete::run_delete;
pub(crate) use download::sanitize_file_name;
pub use download::{run_download, DownloadSummary};
pub use list::{run_list, ListOptions, ListedMedia};
pub use status::run_status;
pub use tree::run_tree;

/// What every networked command needs: config, runtime and a backend client.
pub struct Session {
    pub config: GalleryConfig,
    pub runtime: Runtime,
    pub backend: Arc<HttpBackend>,
}

impl Session {
    pub fn new(config: GalleryConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        let backend = HttpBackend::new(&config.base_url)
            .with_context(|| format!("Invalid backend URL: {}", config.base_url))?;
        Ok(Self {
            config,
            runtime,
            backend: Arc::new(backend),
        })
    }

    /// Fresh cache on this session's runtime
    pub fn cache(&self) -> Arc<MediaCache<HttpBackend>> {
        Arc::new(MediaCache::new(
            Arc::clone(&self.backend),
            CacheOptions::from(&self.config.cache),
            self.runtime.handle().clone(),
        ))
    }
}

/// Open the settings database at `path`, the platform default, or in memory
/// when no data directory can be determined.
pub fn open_settings(path: Option<&Path>) -> Result<SettingsStore> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match SettingsStore::default_path() {
            Some(path) => path,
            None => {
                warn!("no data directory, column settings will not persist");
                return Ok(SettingsStore::open_in_memory()?);
            }
        },
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create settings directory: {}", dir.display()))?;
    }
    SettingsStore::open(&path)
        .with_context(|| format!("Failed to open settings store: {}", path.display()))
}

fn spinner(message: &str) -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    let style = indicatif::ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}");
    if let Ok(style) = style {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
