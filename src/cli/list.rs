use std::collections::HashMap;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;

use super::{spinner, Session};
use crate::backend::MediaBackend;
use crate::cache::CacheEvent;
use crate::model::{MediaDetail, MediaFilter, MediaId, Pane};

/// Details are requested in batches small enough that no cache event is
/// dropped from the broadcast buffer.
const DETAIL_BATCH: usize = 256;

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub pane: Pane,
    pub directory: String,
    pub filter: MediaFilter,
    pub details: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListedMedia {
    pub id: MediaId,
    pub detail: Option<MediaDetail>,
}

/// List a directory's media, optionally resolving details through the cache
pub fn run_list(session: &Session, options: ListOptions) -> Result<Vec<ListedMedia>> {
    let ListOptions {
        pane,
        directory,
        filter,
        details,
    } = options;

    let spinner = spinner(&format!("Listing {}...", directory));
    let ids = session
        .runtime
        .block_on(session.backend.list_media_ids(&directory, pane, filter))
        .with_context(|| format!("Failed to list media in {}", directory));
    let ids = match ids {
        Ok(ids) => ids,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    if !details {
        spinner.finish_and_clear();
        return Ok(ids
            .into_iter()
            .map(|id| ListedMedia { id, detail: None })
            .collect());
    }

    let cache = session.cache();
    let mut resolved: HashMap<MediaId, MediaDetail> = HashMap::with_capacity(ids.len());

    session.runtime.block_on(async {
        for batch in ids.chunks(DETAIL_BATCH) {
            let mut events = cache.subscribe();
            let mut waiting = 0usize;
            for id in batch {
                if cache.ensure_detail(id, pane) {
                    waiting += 1;
                } else if let Some(detail) = cache.get_detail(id, pane) {
                    resolved.insert(id.clone(), detail);
                }
            }

            while waiting > 0 {
                match events.recv().await {
                    Ok(CacheEvent::DetailReady { key, .. }) => {
                        waiting -= 1;
                        let detail = cache
                            .get_detail(&key.id, pane)
                            .unwrap_or_else(|| MediaDetail::placeholder(&key.id));
                        resolved.insert(key.id, detail);
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
            spinner.set_message(format!("Fetching details... {}/{}", resolved.len(), ids.len()));
        }
    });
    spinner.finish_and_clear();

    Ok(ids
        .into_iter()
        .map(|id| {
            let detail = resolved.get(&id).cloned();
            ListedMedia { id, detail }
        })
        .collect())
}
