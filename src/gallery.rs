//! Per-pane composition of selection, grid, preview and the shared cache.
//!
//! [`PaneGallery`] is the state of one side. [`GalleryOrchestrator`] owns both
//! sides, routes grid visibility changes into [`MediaCache`] fetches and
//! performs the pane-level actions (delete, download, column changes).

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::MediaBackend;
use crate::cache::MediaCache;
use crate::columns::{ColumnSettings, ViewContext};
use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use crate::grid::{GridDriver, GridMetrics};
use crate::model::{DirectoryNode, MediaDetail, MediaFilter, MediaId, Pane};
use crate::preview::{NavDirection, PreviewEvent, PreviewKey, PreviewNavigator};
use crate::selection::{SelectionController, SelectionMode, SelectionSet, SelectionSink};

/// What a download of the current selection amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadRequest {
    Single {
        id: MediaId,
        url: String,
        file_name: String,
    },
    /// More than one item selected; only single downloads are offered
    BulkUnsupported { count: usize },
    NothingSelected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub pane: Pane,
    pub deleted: Vec<MediaId>,
    pub message: String,
}

/// State of one side of the browser.
#[derive(Debug, Clone)]
pub struct PaneGallery {
    pane: Pane,
    directory: Option<String>,
    filter: MediaFilter,
    ids: Vec<MediaId>,
    selection: SelectionSet,
    controller: SelectionController,
    grid: GridDriver,
    preview: PreviewNavigator,
}

impl PaneGallery {
    fn new(pane: Pane, mode: SelectionMode, metrics: GridMetrics, columns: usize) -> Self {
        Self {
            pane,
            directory: None,
            filter: MediaFilter::All,
            ids: Vec::new(),
            selection: SelectionSet::new(),
            controller: SelectionController::new(mode),
            grid: GridDriver::new(metrics, columns),
            preview: PreviewNavigator::new(),
        }
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn filter(&self) -> MediaFilter {
        self.filter
    }

    pub fn ids(&self) -> &[MediaId] {
        &self.ids
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_selected(&self, id: &MediaId) -> bool {
        self.selection.contains(id)
    }

    pub fn mode(&self) -> SelectionMode {
        self.controller.mode()
    }

    pub fn anchor(&self) -> Option<&MediaId> {
        self.controller.last_selected()
    }

    pub fn grid(&self) -> &GridDriver {
        &self.grid
    }

    pub fn preview(&self) -> &PreviewNavigator {
        &self.preview
    }

    pub fn show_dates(&self) -> bool {
        self.grid.show_dates()
    }

    fn set_ids(&mut self, ids: Vec<MediaId>) -> Vec<MediaId> {
        let pruned = self.controller.prune(&ids, &mut self.selection);
        if pruned > 0 {
            debug!(pane = %self.pane, pruned, "dropped selection no longer listed");
        }
        if let Some(current) = self.preview.current() {
            if !ids.contains(current) {
                self.preview.close();
            }
        }
        self.ids = ids.clone();
        self.grid.set_ids(ids)
    }
}

pub struct GalleryOrchestrator<B> {
    cache: Arc<MediaCache<B>>,
    columns: ColumnSettings,
    context: ViewContext,
    prefetch_count: usize,
    source: PaneGallery,
    destination: PaneGallery,
}

impl<B: MediaBackend> GalleryOrchestrator<B> {
    pub fn new(config: &GalleryConfig, cache: Arc<MediaCache<B>>, columns: ColumnSettings) -> Self {
        let metrics = GridMetrics::from(&config.grid);
        let context = config.view_context;
        let pane = |pane: Pane| {
            PaneGallery::new(
                pane,
                config.selection_mode,
                metrics,
                columns.get(pane, context) as usize,
            )
        };
        let source = pane(Pane::Source);
        let destination = pane(Pane::Destination);
        Self {
            cache,
            columns,
            context,
            prefetch_count: config.prefetch_count,
            source,
            destination,
        }
    }

    pub fn cache(&self) -> &Arc<MediaCache<B>> {
        &self.cache
    }

    pub fn pane(&self, pane: Pane) -> &PaneGallery {
        match pane {
            Pane::Source => &self.source,
            Pane::Destination => &self.destination,
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> &mut PaneGallery {
        match pane {
            Pane::Source => &mut self.source,
            Pane::Destination => &mut self.destination,
        }
    }

    pub fn view_context(&self) -> ViewContext {
        self.context
    }

    /// Switch layout context; both grids take that context's column counts
    pub fn set_view_context(&mut self, context: ViewContext) {
        self.context = context;
        for pane in Pane::ALL {
            let count = self.columns.get(pane, context) as usize;
            let entered = self.pane_mut(pane).grid.set_columns(count);
            self.fetch_entered(pane, &entered);
        }
    }

    pub async fn list_directories(&self, pane: Pane) -> Result<Vec<DirectoryNode>> {
        Ok(self.cache.backend().list_directories(pane).await?)
    }

    /// Select a directory. The previous selection is cleared; call
    /// [`refresh`](Self::refresh) to load its listing.
    pub fn set_directory(&mut self, pane: Pane, directory: impl Into<String>) {
        let directory = directory.into();
        let gallery = self.pane_mut(pane);
        if gallery.directory.as_deref() == Some(directory.as_str()) {
            return;
        }
        gallery.controller.deselect_all(&mut gallery.selection);
        gallery.preview.close();
        info!(%pane, %directory, "directory selected");
        gallery.directory = Some(directory);
    }

    pub fn set_filter(&mut self, pane: Pane, filter: MediaFilter) {
        self.pane_mut(pane).filter = filter;
    }

    /// Re-fetch the id list for the pane's directory and filter.
    ///
    /// Cached entries of every listed id are dropped first, so items that
    /// ended up as placeholders get another fetch. Returns the number of ids.
    pub async fn refresh(&mut self, pane: Pane) -> Result<usize> {
        let filter = self.pane(pane).filter;
        let Some(directory) = self.pane(pane).directory.clone() else {
            self.apply_media_ids(pane, Vec::new());
            return Ok(0);
        };

        let ids = self
            .cache
            .backend()
            .list_media_ids(&directory, pane, filter)
            .await?;
        info!(%pane, %directory, %filter, count = ids.len(), "loaded media list");

        self.cache.invalidate_many(&ids, pane);
        let count = ids.len();
        self.apply_media_ids(pane, ids);

        // Items that stayed on screen did not re-enter the window
        let visible: Vec<MediaId> = self.pane(pane).grid.visible_ids().cloned().collect();
        self.fetch_entered(pane, &visible);
        Ok(count)
    }

    /// Install a new id list: prune selection, reset the grid and warm the
    /// cache for the first items.
    pub fn apply_media_ids(&mut self, pane: Pane, ids: Vec<MediaId>) {
        for id in ids.iter().take(self.prefetch_count) {
            self.cache.prefetch(id, pane);
        }
        let entered = self.pane_mut(pane).set_ids(ids);
        self.fetch_entered(pane, &entered);
    }

    fn fetch_entered(&self, pane: Pane, entered: &[MediaId]) {
        for id in entered {
            self.cache.prefetch(id, pane);
        }
    }

    pub fn click(&mut self, pane: Pane, id: &MediaId, shift_held: bool) {
        let gallery = self.pane_mut(pane);
        gallery
            .controller
            .click(id, shift_held, &gallery.ids, &mut gallery.selection);
    }

    pub fn select_all(&mut self, pane: Pane) {
        let gallery = self.pane_mut(pane);
        gallery.controller.select_all(&gallery.ids, &mut gallery.selection);
    }

    pub fn deselect_all(&mut self, pane: Pane) {
        let gallery = self.pane_mut(pane);
        gallery.controller.deselect_all(&mut gallery.selection);
    }

    pub fn set_mode(&mut self, pane: Pane, mode: SelectionMode) {
        let gallery = self.pane_mut(pane);
        gallery.controller.set_mode(mode, &mut gallery.selection);
    }

    pub fn toggle_mode(&mut self, pane: Pane) -> SelectionMode {
        let next = match self.pane(pane).mode() {
            SelectionMode::Single => SelectionMode::Multiple,
            SelectionMode::Multiple => SelectionMode::Single,
        };
        self.set_mode(pane, next);
        next
    }

    /// Selection snapshot in selection order
    pub fn selected_ids(&self, pane: Pane) -> Vec<MediaId> {
        self.pane(pane).selection.to_vec()
    }

    /// Pane a bulk action should target; source wins when both have a selection
    pub fn pane_with_selection(&self) -> Option<Pane> {
        Pane::ALL
            .into_iter()
            .find(|pane| !self.pane(*pane).selection.is_empty())
    }

    /// Delete the pane's selection on the backend.
    ///
    /// On success the selection is cleared, the deleted ids leave the list and
    /// their cache entries are dropped. On failure nothing changes locally.
    pub async fn delete_selected(&mut self, pane: Pane) -> Result<DeleteReport> {
        let ids = self.selected_ids(pane);
        if ids.is_empty() {
            return Ok(DeleteReport {
                pane,
                deleted: Vec::new(),
                message: "nothing selected".to_string(),
            });
        }

        let outcome = match self.cache.backend().delete_media(&ids, pane).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%pane, count = ids.len(), error = %e, "delete request failed");
                return Err(e.into());
            }
        };
        if !outcome.success {
            warn!(%pane, count = ids.len(), message = %outcome.message, "backend refused delete");
            return Err(GalleryError::DeleteFailed(outcome.message));
        }

        info!(%pane, count = ids.len(), "deleted media");
        self.deselect_all(pane);
        self.cache.invalidate_many(&ids, pane);

        let deleted: HashSet<&MediaId> = ids.iter().collect();
        let remaining: Vec<MediaId> = self
            .pane(pane)
            .ids
            .iter()
            .filter(|id| !deleted.contains(id))
            .cloned()
            .collect();
        self.apply_media_ids(pane, remaining);

        Ok(DeleteReport {
            pane,
            deleted: ids,
            message: outcome.message,
        })
    }

    pub fn download_selected(&self, pane: Pane) -> DownloadRequest {
        let selected = self.selected_ids(pane);
        match selected.as_slice() {
            [] => DownloadRequest::NothingSelected,
            [id] => {
                let file_name = self
                    .cache
                    .get_detail(id, pane)
                    .and_then(|detail| detail.name)
                    .unwrap_or_else(|| id.to_string());
                DownloadRequest::Single {
                    id: id.clone(),
                    url: self.cache.backend().media_url(id, pane),
                    file_name,
                }
            }
            many => DownloadRequest::BulkUnsupported { count: many.len() },
        }
    }

    /// Returns the new overlay state
    pub fn toggle_date_overlay(&mut self, pane: Pane) -> bool {
        let gallery = self.pane_mut(pane);
        let show = !gallery.grid.show_dates();
        let entered = gallery.grid.set_show_dates(show);
        self.fetch_entered(pane, &entered);
        show
    }

    pub fn columns(&self, pane: Pane) -> u32 {
        self.columns.get(pane, self.context)
    }

    /// Persist a column count for the current context. Returns the clamped value.
    pub fn set_columns(&mut self, pane: Pane, count: u32) -> Result<u32> {
        let count = self.columns.set(pane, self.context, count)?;
        let entered = self.pane_mut(pane).grid.set_columns(count as usize);
        self.fetch_entered(pane, &entered);
        Ok(count)
    }

    pub fn adjust_columns(&mut self, pane: Pane, delta: i32) -> Result<u32> {
        let count = self.columns.adjust(pane, self.context, delta)?;
        let entered = self.pane_mut(pane).grid.set_columns(count as usize);
        self.fetch_entered(pane, &entered);
        Ok(count)
    }

    pub fn set_viewport(&mut self, pane: Pane, width: u32, height: u32) {
        let entered = self.pane_mut(pane).grid.set_viewport(width, height);
        self.fetch_entered(pane, &entered);
    }

    pub fn scroll_by(&mut self, pane: Pane, delta: i64) {
        let entered = self.pane_mut(pane).grid.scroll_by(delta);
        self.fetch_entered(pane, &entered);
    }

    pub fn scroll_into_view(&mut self, pane: Pane, index: usize) {
        let entered = self.pane_mut(pane).grid.scroll_into_view(index);
        self.fetch_entered(pane, &entered);
    }

    pub fn detail(&self, pane: Pane, id: &MediaId) -> Option<MediaDetail> {
        self.cache.get_detail(id, pane)
    }

    pub fn thumbnail(&self, pane: Pane, id: &MediaId) -> Option<String> {
        self.cache.get_thumbnail(id, pane)
    }

    pub fn media_url(&self, pane: Pane, id: &MediaId) -> String {
        self.cache.backend().media_url(id, pane)
    }

    pub fn open_preview(&mut self, pane: Pane, id: MediaId) -> PreviewEvent {
        self.cache.ensure_detail(&id, pane);
        self.pane_mut(pane).preview.open(id)
    }

    pub fn close_preview(&mut self, pane: Pane) -> Option<PreviewEvent> {
        self.pane_mut(pane).preview.close()
    }

    pub fn navigate_preview(
        &mut self,
        pane: Pane,
        direction: NavDirection,
    ) -> Option<PreviewEvent> {
        let gallery = self.pane_mut(pane);
        let event = gallery.preview.navigate(direction, &gallery.ids);
        self.warm_preview(pane, &event);
        event
    }

    pub fn preview_key(&mut self, pane: Pane, key: PreviewKey) -> Option<PreviewEvent> {
        let gallery = self.pane_mut(pane);
        let event = gallery.preview.handle_key(key, &gallery.ids);
        self.warm_preview(pane, &event);
        event
    }

    fn warm_preview(&self, pane: Pane, event: &Option<PreviewEvent>) {
        if let Some(PreviewEvent::Moved(id)) = event {
            self.cache.ensure_detail(id, pane);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::MockBackend;
    use crate::cache::{CacheEvent, CacheOptions};
    use crate::model::DeleteOutcome;
    use crate::settings::SettingsStore;
    use tokio::runtime::Handle;
    use tokio::sync::broadcast;

    fn orchestrator(
        backend: MockBackend,
        prefetch_count: usize,
    ) -> (Arc<MockBackend>, GalleryOrchestrator<MockBackend>) {
        let config = GalleryConfig {
            prefetch_count,
            ..GalleryConfig::default()
        };
        orchestrator_with(backend, &config)
    }

    fn orchestrator_with(
        backend: MockBackend,
        config: &GalleryConfig,
    ) -> (Arc<MockBackend>, GalleryOrchestrator<MockBackend>) {
        let backend = Arc::new(backend);
        let cache = Arc::new(MediaCache::new(
            Arc::clone(&backend),
            CacheOptions::default(),
            Handle::current(),
        ));
        let columns = ColumnSettings::load(SettingsStore::open_in_memory().unwrap()).unwrap();
        (backend, GalleryOrchestrator::new(config, cache, columns))
    }

    async fn drain(events: &mut broadcast::Receiver<CacheEvent>, count: usize) {
        for _ in 0..count {
            events.recv().await.unwrap();
        }
    }

    fn names(ids: &[MediaId]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    async fn loaded(ids: &[&str]) -> (Arc<MockBackend>, GalleryOrchestrator<MockBackend>) {
        let backend = MockBackend::new();
        backend.set_listing("dir", Pane::Source, ids);
        let (backend, mut gallery) = orchestrator(backend, 20);
        gallery.set_directory(Pane::Source, "dir");
        gallery.refresh(Pane::Source).await.unwrap();
        (backend, gallery)
    }

    #[tokio::test]
    async fn test_refresh_loads_and_prefetches() {
        let backend = MockBackend::new();
        backend.set_listing("dir", Pane::Source, &["a", "b", "c"]);
        let (backend, mut gallery) = orchestrator(backend, 2);
        let mut events = gallery.cache().subscribe();

        gallery.set_directory(Pane::Source, "dir");
        assert_eq!(gallery.refresh(Pane::Source).await.unwrap(), 3);
        assert_eq!(names(gallery.pane(Pane::Source).ids()), vec!["a", "b", "c"]);

        // Two prefetched, the third requested once it entered the viewport
        drain(&mut events, 6).await;
        assert_eq!(backend.detail_calls(), 3);
        assert_eq!(backend.thumbnail_calls(), 3);
        assert!(gallery.detail(Pane::Source, &"c".into()).is_some());
        assert!(gallery.pane(Pane::Destination).ids().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_without_directory_is_empty() {
        let (_backend, mut gallery) = orchestrator(MockBackend::new(), 20);
        assert_eq!(gallery.refresh(Pane::Destination).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_listing_error_propagates() {
        let (_backend, mut gallery) = orchestrator(MockBackend::new(), 20);
        gallery.set_directory(Pane::Source, "missing");
        let err = gallery.refresh(Pane::Source).await.unwrap_err();
        assert!(matches!(err, GalleryError::Backend(_)));
    }

    #[tokio::test]
    async fn test_new_listing_prunes_selection() {
        let (backend, mut gallery) = loaded(&["a", "b", "c"]).await;
        gallery.click(Pane::Source, &"a".into(), false);
        gallery.click(Pane::Source, &"c".into(), false);

        backend.set_listing("dir", Pane::Source, &["a", "b"]);
        gallery.set_filter(Pane::Source, MediaFilter::Unique);
        gallery.refresh(Pane::Source).await.unwrap();

        assert_eq!(names(&gallery.selected_ids(Pane::Source)), vec!["a"]);
    }

    #[tokio::test]
    async fn test_directory_change_clears_selection() {
        let (_backend, mut gallery) = loaded(&["a", "b"]).await;
        gallery.select_all(Pane::Source);
        assert_eq!(gallery.selected_ids(Pane::Source).len(), 2);

        gallery.set_directory(Pane::Source, "dir");
        assert_eq!(gallery.selected_ids(Pane::Source).len(), 2, "same directory is a no-op");

        gallery.set_directory(Pane::Source, "other");
        assert!(gallery.selected_ids(Pane::Source).is_empty());
    }

    #[tokio::test]
    async fn test_delete_success_clears_and_invalidates() {
        let (backend, mut gallery) = loaded(&["a", "b", "c"]).await;
        let b = MediaId::from("b");
        gallery.cache().insert_detail(&b, Pane::Source, MediaDetail::placeholder(&b));
        gallery.click(Pane::Source, &"b".into(), false);

        let report = gallery.delete_selected(Pane::Source).await.unwrap();
        assert_eq!(names(&report.deleted), vec!["b"]);
        assert!(gallery.selected_ids(Pane::Source).is_empty());
        assert_eq!(names(gallery.pane(Pane::Source).ids()), vec!["a", "c"]);
        assert!(gallery.detail(Pane::Source, &"b".into()).is_none());
        assert_eq!(backend.deleted(), vec![(Pane::Source, vec![MediaId::from("b")])]);
    }

    #[tokio::test]
    async fn test_delete_refused_keeps_selection() {
        let (backend, mut gallery) = loaded(&["a", "b"]).await;
        backend.set_delete_result(Ok(DeleteOutcome {
            success: false,
            message: "read-only volume".to_string(),
        }));
        gallery.select_all(Pane::Source);

        let err = gallery.delete_selected(Pane::Source).await.unwrap_err();
        assert!(matches!(err, GalleryError::DeleteFailed(ref m) if m == "read-only volume"));
        assert_eq!(gallery.selected_ids(Pane::Source).len(), 2);
        assert_eq!(gallery.pane(Pane::Source).ids().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_transport_error_keeps_selection() {
        let (backend, mut gallery) = loaded(&["a"]).await;
        backend.set_delete_result(Err("connection reset".to_string()));
        gallery.select_all(Pane::Source);

        let err = gallery.delete_selected(Pane::Source).await.unwrap_err();
        assert!(matches!(err, GalleryError::Backend(_)));
        assert_eq!(names(&gallery.selected_ids(Pane::Source)), vec!["a"]);
    }

    #[tokio::test]
    async fn test_delete_with_empty_selection_skips_backend() {
        let (backend, mut gallery) = loaded(&["a"]).await;
        let report = gallery.delete_selected(Pane::Source).await.unwrap();
        assert!(report.deleted.is_empty());
        assert!(backend.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_download_variants() {
        let (_backend, mut gallery) = loaded(&["a", "b"]).await;
        assert_eq!(gallery.download_selected(Pane::Source), DownloadRequest::NothingSelected);

        gallery.click(Pane::Source, &"a".into(), false);
        assert_eq!(
            gallery.download_selected(Pane::Source),
            DownloadRequest::Single {
                id: "a".into(),
                url: "media://source/a".to_string(),
                file_name: "a".to_string(),
            }
        );

        gallery.click(Pane::Source, &"b".into(), false);
        assert_eq!(
            gallery.download_selected(Pane::Source),
            DownloadRequest::BulkUnsupported { count: 2 }
        );
    }

    #[tokio::test]
    async fn test_pane_with_selection_prefers_source() {
        let backend = MockBackend::new();
        backend.set_listing("l", Pane::Source, &["1"]);
        backend.set_listing("r", Pane::Destination, &["1"]);
        let (_backend, mut gallery) = orchestrator(backend, 0);
        gallery.set_directory(Pane::Source, "l");
        gallery.set_directory(Pane::Destination, "r");
        gallery.refresh(Pane::Source).await.unwrap();
        gallery.refresh(Pane::Destination).await.unwrap();

        assert_eq!(gallery.pane_with_selection(), None);
        gallery.select_all(Pane::Destination);
        assert_eq!(gallery.pane_with_selection(), Some(Pane::Destination));
        gallery.select_all(Pane::Source);
        assert_eq!(gallery.pane_with_selection(), Some(Pane::Source));
    }

    #[tokio::test]
    async fn test_columns_persist_and_reset_scroll() {
        let ids: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let (_backend, mut gallery) = loaded(&refs).await;

        gallery.set_viewport(Pane::Source, 800, 200);
        gallery.scroll_by(Pane::Source, 400);
        assert!(gallery.pane(Pane::Source).grid().scroll_offset() > 0);

        assert_eq!(gallery.set_columns(Pane::Source, 99).unwrap(), 10);
        assert_eq!(gallery.pane(Pane::Source).grid().columns_count(), 10);
        assert_eq!(gallery.pane(Pane::Source).grid().scroll_offset(), 0);
        assert_eq!(gallery.adjust_columns(Pane::Source, -1).unwrap(), 9);
        assert_eq!(gallery.columns(Pane::Destination), 5);

        gallery.set_view_context(ViewContext::MobileSplit);
        assert_eq!(gallery.pane(Pane::Source).grid().columns_count(), 2);
    }

    #[tokio::test]
    async fn test_date_overlay_toggle() {
        let (_backend, mut gallery) = loaded(&["a"]).await;
        gallery.set_viewport(Pane::Source, 1032, 400);
        let plain = gallery.pane(Pane::Source).grid().row_height();

        assert!(gallery.toggle_date_overlay(Pane::Source));
        assert_eq!(gallery.pane(Pane::Source).grid().row_height(), plain + 28);
        assert!(!gallery.toggle_date_overlay(Pane::Source));
    }

    #[tokio::test]
    async fn test_preview_follows_pane_list() {
        let (_backend, mut gallery) = loaded(&["a", "b", "c"]).await;
        gallery.open_preview(Pane::Source, "c".into());

        assert_eq!(
            gallery.preview_key(Pane::Source, PreviewKey::ArrowRight),
            Some(PreviewEvent::Moved("a".into()))
        );
        assert_eq!(
            gallery.navigate_preview(Pane::Source, NavDirection::Prev),
            Some(PreviewEvent::Moved("c".into()))
        );
        assert_eq!(gallery.close_preview(Pane::Source), Some(PreviewEvent::Closed));
        assert!(!gallery.pane(Pane::Destination).preview().is_open());
    }

    #[tokio::test]
    async fn test_single_mode_collapse_via_toggle() {
        let (_backend, mut gallery) = loaded(&["a", "b", "c"]).await;
        gallery.click(Pane::Source, &"a".into(), false);
        gallery.click(Pane::Source, &"c".into(), true);
        assert_eq!(gallery.selected_ids(Pane::Source).len(), 3);

        assert_eq!(gallery.toggle_mode(Pane::Source), SelectionMode::Single);
        assert_eq!(names(&gallery.selected_ids(Pane::Source)), vec!["c"]);
    }

    #[tokio::test]
    async fn test_refresh_retries_placeholders() {
        let backend = MockBackend::failing();
        backend.set_listing("dir", Pane::Source, &["a"]);
        let (backend, mut gallery) = orchestrator(backend, 0);
        let mut events = gallery.cache().subscribe();

        gallery.set_directory(Pane::Source, "dir");
        gallery.refresh(Pane::Source).await.unwrap();
        drain(&mut events, 2).await;
        assert_eq!(backend.detail_calls(), 1);
        assert_eq!(
            gallery.detail(Pane::Source, &"a".into()),
            Some(MediaDetail::placeholder(&"a".into()))
        );

        gallery.refresh(Pane::Source).await.unwrap();
        drain(&mut events, 2).await;
        assert_eq!(backend.detail_calls(), 2);
        assert_eq!(backend.thumbnail_calls(), 2);
    }

    #[tokio::test]
    async fn test_viewport_changes_fetch_each_entered_item_once() {
        let mut config = GalleryConfig::default();
        config.prefetch_count = 0;
        config.grid.gap = 0;
        config.grid.overscan_rows = 0;
        let backend = MockBackend::new();
        let ids: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        backend.set_listing("dir", Pane::Source, &refs);
        let (backend, mut gallery) = orchestrator_with(backend, &config);
        let mut events = gallery.cache().subscribe();

        // 5 columns of 100 units; two rows fit in 200
        gallery.set_viewport(Pane::Source, 500, 200);
        gallery.set_directory(Pane::Source, "dir");
        gallery.refresh(Pane::Source).await.unwrap();
        assert_eq!(gallery.cache().stats().pending_details, 10);
        drain(&mut events, 20).await;
        assert_eq!(backend.detail_calls(), 10);

        // One row down: only items 10..15 are new
        gallery.scroll_by(Pane::Source, 100);
        assert_eq!(gallery.cache().stats().pending_details, 5);
        drain(&mut events, 10).await;
        assert_eq!(backend.detail_calls(), 15);
        assert_eq!(backend.thumbnail_calls(), 15);

        // Back up and an unchanged resize: everything is already cached
        gallery.scroll_by(Pane::Source, -100);
        gallery.set_viewport(Pane::Source, 500, 200);
        let stats = gallery.cache().stats();
        assert_eq!((stats.pending_details, stats.pending_thumbnails), (0, 0));

        // Taller viewport reveals rows 2 and 3
        gallery.set_viewport(Pane::Source, 500, 400);
        assert_eq!(gallery.cache().stats().pending_details, 5);
        drain(&mut events, 10).await;
        assert_eq!(backend.detail_calls(), 20);
        assert!(gallery.detail(Pane::Source, &"19".into()).is_some());
        assert!(gallery.detail(Pane::Source, &"20".into()).is_none());
    }

    #[tokio::test]
    async fn test_bulk_selection_and_delete_on_large_listing() {
        let ids: Vec<String> = (0..60_000).map(|i| format!("m{}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let (backend, mut gallery) = loaded(&refs).await;

        let start = std::time::Instant::now();
        gallery.select_all(Pane::Source);
        gallery.deselect_all(Pane::Source);
        assert!(gallery.selected_ids(Pane::Source).is_empty());

        gallery.select_all(Pane::Source);
        let report = gallery.delete_selected(Pane::Source).await.unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(5));

        assert_eq!(report.deleted.len(), 60_000);
        assert!(gallery.pane(Pane::Source).ids().is_empty());
        assert_eq!(backend.deleted()[0].1.len(), 60_000);
    }
}
