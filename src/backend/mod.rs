//! Contract for the media backend the gallery core talks to.
//!
//! The core only needs the operations on [`MediaBackend`]; [`HttpBackend`]
//! implements them against the REST server the browser was built for.

mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use thiserror::Error;

use crate::model::{DeleteOutcome, DirectoryNode, MediaDetail, MediaFilter, MediaId, Pane};

pub use http::{HttpBackend, ServerStatus};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),
    #[error("{0}")]
    Other(String),
}

/// Operations the gallery core consumes from the outside world.
///
/// Futures must be `Send` so the cache can drive fetches on a multi-threaded
/// runtime.
pub trait MediaBackend: Send + Sync + 'static {
    /// Directory tree for one pane (navigation only)
    fn list_directories(
        &self,
        pane: Pane,
    ) -> impl Future<Output = Result<Vec<DirectoryNode>, BackendError>> + Send;

    /// Ordered media ids of a directory under a filter
    fn list_media_ids(
        &self,
        directory: &str,
        pane: Pane,
        filter: MediaFilter,
    ) -> impl Future<Output = Result<Vec<MediaId>, BackendError>> + Send;

    fn fetch_detail(
        &self,
        id: &MediaId,
        pane: Pane,
    ) -> impl Future<Output = Result<MediaDetail, BackendError>> + Send;

    /// Resolve the thumbnail URL of an item
    fn fetch_thumbnail(
        &self,
        id: &MediaId,
        pane: Pane,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// URL of the full media resource (not awaited)
    fn media_url(&self, id: &MediaId, pane: Pane) -> String;

    fn delete_media(
        &self,
        ids: &[MediaId],
        pane: Pane,
    ) -> impl Future<Output = Result<DeleteOutcome, BackendError>> + Send;
}
