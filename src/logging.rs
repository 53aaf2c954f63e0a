//! Logging setup for dualpane.
//!
//! Logs go to `~/.cache/dualpane/dualpane.log`. Verbosity comes from the
//! `DUALPANE_LOG` environment variable (default: `info`).
//!
//! ```bash
//! # Watch cache fetches and grid windows while browsing
//! DUALPANE_LOG=dualpane=debug dualpane browse
//!
//! # Follow the log from another terminal
//! tail -f ~/.cache/dualpane/dualpane.log
//! ```

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "DUALPANE_LOG";

/// Install the global subscriber.
///
/// The file layer is always on. A stderr layer is added only when
/// `DUALPANE_LOG` is set, since the TUI owns the terminal otherwise.
/// Hold the returned guard until exit so buffered lines are flushed.
pub fn init_logging() -> Result<WorkerGuard> {
    let log_file = log_file_path().context("Failed to determine cache directory")?;
    if let Some(dir) = log_file.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let log_env = std::env::var(LOG_ENV).ok();
    let verbose = log_env.is_some();
    let filter_str = log_env.unwrap_or_else(|| "info".to_string());

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(false)
    });

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(&filter_str))
        .with(file_layer)
        .with(stderr_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;

    Ok(guard)
}

pub fn log_file_path() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("", "", "dualpane")
        .map(|dirs| dirs.cache_dir().join("dualpane.log"))
}
