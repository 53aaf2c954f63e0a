//! In-process backend for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::Semaphore;

use super::{BackendError, MediaBackend};
use crate::model::{DeleteOutcome, DirectoryNode, MediaDetail, MediaFilter, MediaId, Pane};

#[derive(Clone, Copy, PartialEq, Eq)]
enum FetchBehavior {
    Succeed,
    Fail,
    Hang,
}

pub(crate) struct MockBackend {
    behavior: FetchBehavior,
    gate: Option<Semaphore>,
    detail_calls: AtomicUsize,
    thumbnail_calls: AtomicUsize,
    listings: Mutex<HashMap<(String, Pane), Vec<MediaId>>>,
    delete_result: Mutex<Result<DeleteOutcome, String>>,
    deleted: Mutex<Vec<(Pane, Vec<MediaId>)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            behavior: FetchBehavior::Succeed,
            gate: None,
            detail_calls: AtomicUsize::new(0),
            thumbnail_calls: AtomicUsize::new(0),
            listings: Mutex::new(HashMap::new()),
            delete_result: Mutex::new(Ok(DeleteOutcome {
                success: true,
                message: "deleted".to_string(),
            })),
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Fetches block until `release` hands out permits
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: FetchBehavior::Fail,
            ..Self::new()
        }
    }

    pub fn hanging() -> Self {
        Self {
            behavior: FetchBehavior::Hang,
            ..Self::new()
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn set_listing(&self, directory: &str, pane: Pane, ids: &[&str]) {
        self.listings.lock().unwrap().insert(
            (directory.to_string(), pane),
            ids.iter().map(|id| MediaId::from(*id)).collect(),
        );
    }

    pub fn set_delete_result(&self, result: Result<DeleteOutcome, String>) {
        *self.delete_result.lock().unwrap() = result;
    }

    pub fn deleted(&self) -> Vec<(Pane, Vec<MediaId>)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn thumbnail_calls(&self) -> usize {
        self.thumbnail_calls.load(Ordering::SeqCst)
    }

    async fn wait_turn(&self) -> Result<(), BackendError> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
            permit.forget();
        }
        match self.behavior {
            FetchBehavior::Succeed => Ok(()),
            FetchBehavior::Fail => Err(BackendError::Other("mock failure".to_string())),
            FetchBehavior::Hang => std::future::pending().await,
        }
    }
}

impl MediaBackend for MockBackend {
    async fn list_directories(&self, pane: Pane) -> Result<Vec<DirectoryNode>, BackendError> {
        Ok(vec![DirectoryNode {
            id: format!("root-{}", pane.side()),
            name: "Root".to_string(),
            children: Vec::new(),
        }])
    }

    async fn list_media_ids(
        &self,
        directory: &str,
        pane: Pane,
        _filter: MediaFilter,
    ) -> Result<Vec<MediaId>, BackendError> {
        self.listings
            .lock()
            .unwrap()
            .get(&(directory.to_string(), pane))
            .cloned()
            .ok_or_else(|| BackendError::Other(format!("no listing for {}", directory)))
    }

    async fn fetch_detail(&self, id: &MediaId, pane: Pane) -> Result<MediaDetail, BackendError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_turn().await?;
        let mut detail = MediaDetail::placeholder(id);
        detail.alt = format!("{}.jpg", id);
        detail.path = Some(format!("{}/{}", pane.position(), id));
        Ok(detail)
    }

    async fn fetch_thumbnail(&self, id: &MediaId, pane: Pane) -> Result<String, BackendError> {
        self.thumbnail_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_turn().await?;
        Ok(format!("thumb://{}/{}", pane.position(), id))
    }

    fn media_url(&self, id: &MediaId, pane: Pane) -> String {
        format!("media://{}/{}", pane.position(), id)
    }

    async fn delete_media(
        &self,
        ids: &[MediaId],
        pane: Pane,
    ) -> Result<DeleteOutcome, BackendError> {
        self.deleted.lock().unwrap().push((pane, ids.to_vec()));
        self.delete_result
            .lock()
            .unwrap()
            .clone()
            .map_err(BackendError::Other)
    }
}
