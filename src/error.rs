use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced by gallery operations that the user has to see.
///
/// Cache fetch failures never show up here: they are absorbed into
/// placeholder entries.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("settings store error: {0}")]
    Settings(#[from] rusqlite::Error),
    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T, E = GalleryError> = std::result::Result<T, E>;
