//! Shared cache for thumbnail URLs and media details.
//!
//! One [`MediaCache`] is constructed per session and shared by both panes.
//! Entries are keyed by `(id, pane)` because the same raw id can name
//! different media in the source and destination namespaces.
//!
//! `ensure_*` calls are fire-and-forget: the pending set is checked and marked
//! under a single lock, so at most one fetch per key is ever in flight. A
//! failed or timed-out fetch installs a placeholder, which stops repeated
//! `ensure_*` calls from hammering the backend.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::backend::MediaBackend;
use crate::config::CacheConfig;
use crate::model::{MediaDetail, MediaId, Pane};

const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub id: MediaId,
    pub pane: Pane,
}

impl CacheKey {
    pub fn new(id: MediaId, pane: Pane) -> Self {
        Self { id, pane }
    }
}

/// Notification sent to subscribers when a fetch settles
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    ThumbnailReady { key: CacheKey, placeholder: bool },
    DetailReady { key: CacheKey, placeholder: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub thumbnails: usize,
    pub details: usize,
    pub pending_thumbnails: usize,
    pub pending_details: usize,
}

#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Entry count that triggers eviction (per kind)
    pub high_water: usize,
    /// Entry count eviction shrinks down to
    pub low_water: usize,
    pub fetch_timeout: Duration,
    pub placeholder_thumbnail: String,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CacheOptions {
    fn from(config: &CacheConfig) -> Self {
        Self {
            high_water: config.high_water,
            low_water: config.low_water.min(config.high_water).max(1),
            fetch_timeout: config.fetch_timeout(),
            placeholder_thumbnail: config.placeholder_thumbnail.clone(),
        }
    }
}

/// Stale order entries tolerated before the queue is rebuilt
const ORDER_SLACK: usize = 64;

/// Map that remembers insertion order for oldest-first eviction.
/// Reads do not refresh an entry's position.
///
/// Removal only drops the map entry. Its queue slot stays behind and is
/// recognized as stale by its generation when eviction reaches it.
struct InsertionOrdered<V> {
    entries: HashMap<CacheKey, (V, u64)>,
    order: VecDeque<(CacheKey, u64)>,
    generation: u64,
}

impl<V> InsertionOrdered<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            generation: 0,
        }
    }

    fn insert(&mut self, key: CacheKey, value: V) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.0 = value;
            return;
        }
        self.generation += 1;
        self.entries.insert(key.clone(), (value, self.generation));
        self.order.push_back((key, self.generation));
    }

    fn get(&self, key: &CacheKey) -> Option<&V> {
        self.entries.get(key).map(|(value, _)| value)
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &CacheKey) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        if self.order.len() > 2 * self.entries.len() + ORDER_SLACK {
            let entries = &self.entries;
            self.order.retain(|(key, generation)| {
                matches!(entries.get(key), Some((_, g)) if g == generation)
            });
        }
        true
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Once above `high`, drop oldest entries until `low` remain
    fn evict(&mut self, high: usize, low: usize) -> usize {
        if self.entries.len() <= high {
            return 0;
        }
        let mut evicted = 0;
        while self.entries.len() > low {
            let Some((oldest, generation)) = self.order.pop_front() else {
                break;
            };
            let live = matches!(self.entries.get(&oldest), Some((_, g)) if *g == generation);
            if live {
                self.entries.remove(&oldest);
                evicted += 1;
            }
        }
        evicted
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

struct CacheState {
    thumbnails: InsertionOrdered<String>,
    details: InsertionOrdered<MediaDetail>,
    pending_thumbnails: HashSet<CacheKey>,
    pending_details: HashSet<CacheKey>,
}

impl CacheState {
    fn stats(&self) -> CacheStats {
        CacheStats {
            thumbnails: self.thumbnails.len(),
            details: self.details.len(),
            pending_thumbnails: self.pending_thumbnails.len(),
            pending_details: self.pending_details.len(),
        }
    }

    fn store_thumbnail(&mut self, key: CacheKey, url: String, options: &CacheOptions) {
        self.thumbnails.insert(key, url);
        let evicted = self.thumbnails.evict(options.high_water, options.low_water);
        if evicted > 0 {
            debug!(evicted, stats = ?self.stats(), "evicted thumbnails");
        }
    }

    fn store_detail(&mut self, key: CacheKey, detail: MediaDetail, options: &CacheOptions) {
        self.details.insert(key, detail);
        let evicted = self.details.evict(options.high_water, options.low_water);
        if evicted > 0 {
            debug!(evicted, stats = ?self.stats(), "evicted details");
        }
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct MediaCache<B> {
    backend: Arc<B>,
    state: Arc<Mutex<CacheState>>,
    options: Arc<CacheOptions>,
    events: broadcast::Sender<CacheEvent>,
    runtime: Handle,
}

impl<B: MediaBackend> MediaCache<B> {
    /// Fetches are spawned on `runtime`.
    pub fn new(backend: Arc<B>, options: CacheOptions, runtime: Handle) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            state: Arc::new(Mutex::new(CacheState {
                thumbnails: InsertionOrdered::new(),
                details: InsertionOrdered::new(),
                pending_thumbnails: HashSet::new(),
                pending_details: HashSet::new(),
            })),
            options: Arc::new(options),
            events,
            runtime,
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Thumbnail URL installed when a fetch fails
    pub fn placeholder_thumbnail(&self) -> &str {
        &self.options.placeholder_thumbnail
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn get_thumbnail(&self, id: &MediaId, pane: Pane) -> Option<String> {
        let key = CacheKey::new(id.clone(), pane);
        lock(&self.state).thumbnails.get(&key).cloned()
    }

    pub fn get_detail(&self, id: &MediaId, pane: Pane) -> Option<MediaDetail> {
        let key = CacheKey::new(id.clone(), pane);
        lock(&self.state).details.get(&key).cloned()
    }

    pub fn is_detail_pending(&self, id: &MediaId, pane: Pane) -> bool {
        let key = CacheKey::new(id.clone(), pane);
        lock(&self.state).pending_details.contains(&key)
    }

    /// Start a thumbnail fetch unless cached or already in flight.
    /// Returns true if a fetch was issued.
    pub fn ensure_thumbnail(&self, id: &MediaId, pane: Pane) -> bool {
        let key = CacheKey::new(id.clone(), pane);
        {
            let mut state = lock(&self.state);
            if state.thumbnails.contains(&key) || !state.pending_thumbnails.insert(key.clone()) {
                return false;
            }
        }

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let options = Arc::clone(&self.options);
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let fetch = backend.fetch_thumbnail(&key.id, key.pane);
            let fetched = tokio::time::timeout(options.fetch_timeout, fetch).await;
            let (url, placeholder) = match fetched {
                Ok(Ok(url)) => (url, false),
                Ok(Err(e)) => {
                    warn!(id = %key.id, pane = %key.pane, error = %e, "thumbnail fetch failed");
                    (options.placeholder_thumbnail.clone(), true)
                }
                Err(_) => {
                    warn!(
                        id = %key.id,
                        pane = %key.pane,
                        timeout = ?options.fetch_timeout,
                        "thumbnail fetch timed out"
                    );
                    (options.placeholder_thumbnail.clone(), true)
                }
            };

            {
                let mut state = lock(&state);
                state.pending_thumbnails.remove(&key);
                state.store_thumbnail(key.clone(), url, &options);
            }
            let _ = events.send(CacheEvent::ThumbnailReady { key, placeholder });
        });
        true
    }

    /// Start a detail fetch unless cached or already in flight.
    /// Returns true if a fetch was issued.
    pub fn ensure_detail(&self, id: &MediaId, pane: Pane) -> bool {
        let key = CacheKey::new(id.clone(), pane);
        {
            let mut state = lock(&self.state);
            if state.details.contains(&key) || !state.pending_details.insert(key.clone()) {
                return false;
            }
        }

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let options = Arc::clone(&self.options);
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let fetch = backend.fetch_detail(&key.id, key.pane);
            let fetched = tokio::time::timeout(options.fetch_timeout, fetch).await;
            let (detail, placeholder) = match fetched {
                Ok(Ok(detail)) => (detail, false),
                Ok(Err(e)) => {
                    warn!(id = %key.id, pane = %key.pane, error = %e, "detail fetch failed");
                    (MediaDetail::placeholder(&key.id), true)
                }
                Err(_) => {
                    warn!(
                        id = %key.id,
                        pane = %key.pane,
                        timeout = ?options.fetch_timeout,
                        "detail fetch timed out"
                    );
                    (MediaDetail::placeholder(&key.id), true)
                }
            };

            {
                let mut state = lock(&state);
                state.pending_details.remove(&key);
                state.store_detail(key.clone(), detail, &options);
            }
            let _ = events.send(CacheEvent::DetailReady { key, placeholder });
        });
        true
    }

    /// Warm both kinds for an item about to be shown
    pub fn prefetch(&self, id: &MediaId, pane: Pane) {
        self.ensure_thumbnail(id, pane);
        self.ensure_detail(id, pane);
    }

    #[cfg(test)]
    pub(crate) fn insert_detail(&self, id: &MediaId, pane: Pane, detail: MediaDetail) {
        let key = CacheKey::new(id.clone(), pane);
        lock(&self.state).store_detail(key, detail, &self.options);
    }

    /// Drop cached entries for these items. In-flight fetches still land.
    pub fn invalidate_many<'a>(&self, ids: impl IntoIterator<Item = &'a MediaId>, pane: Pane) {
        let mut state = lock(&self.state);
        let mut removed = 0usize;
        for id in ids {
            let key = CacheKey::new(id.clone(), pane);
            let thumb = state.thumbnails.remove(&key);
            let detail = state.details.remove(&key);
            if thumb || detail {
                removed += 1;
            }
        }
        debug!(removed, %pane, "invalidated cache entries");
    }

    /// Drop every cached entry of both kinds
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.thumbnails.clear();
        state.details.clear();
    }

    pub fn stats(&self) -> CacheStats {
        lock(&self.state).stats()
    }
}
