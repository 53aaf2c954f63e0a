use tracing::debug;

use crate::model::MediaId;

/// Direction for stepping through the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Prev,
    Next,
}

/// Keys the full-screen viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKey {
    ArrowLeft,
    ArrowRight,
    Escape,
}

/// What changed, so callers can pause other UI or lock scrolling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    Opened(MediaId),
    Moved(MediaId),
    Closed,
}

/// Step an index around a list of `count` items, wrapping at both ends
fn wrap_index(current: usize, count: usize, direction: NavDirection) -> usize {
    match direction {
        NavDirection::Next => (current + 1) % count,
        NavDirection::Prev => (current + count - 1) % count,
    }
}

/// Tracks the single item open in the full-screen viewer.
#[derive(Debug, Clone, Default)]
pub struct PreviewNavigator {
    current: Option<MediaId>,
}

impl PreviewNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&MediaId> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn open(&mut self, id: MediaId) -> PreviewEvent {
        debug!(%id, "preview opened");
        self.current = Some(id.clone());
        PreviewEvent::Opened(id)
    }

    pub fn close(&mut self) -> Option<PreviewEvent> {
        self.current.take().map(|_| PreviewEvent::Closed)
    }

    /// Move to the neighbour in `ids`, wrapping cyclically.
    /// No-op when nothing is open, the list is empty, or the current id is
    /// not in the list.
    pub fn navigate(&mut self, direction: NavDirection, ids: &[MediaId]) -> Option<PreviewEvent> {
        let current = self.current.as_ref()?;
        if ids.is_empty() {
            return None;
        }
        let index = ids.iter().position(|id| id == current)?;
        let next = ids[wrap_index(index, ids.len(), direction)].clone();
        self.current = Some(next.clone());
        Some(PreviewEvent::Moved(next))
    }

    /// Keyboard binding, active only while a preview is open
    pub fn handle_key(&mut self, key: PreviewKey, ids: &[MediaId]) -> Option<PreviewEvent> {
        if !self.is_open() {
            return None;
        }
        match key {
            PreviewKey::ArrowLeft => self.navigate(NavDirection::Prev, ids),
            PreviewKey::ArrowRight => self.navigate(NavDirection::Next, ids),
            PreviewKey::Escape => self.close(),
        }
    }
}
