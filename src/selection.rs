//! Click, shift-click and toggle semantics for one gallery pane.
//!
//! [`SelectionController`] owns no selection storage. Every change is a
//! single `add`/`remove` call on a [`SelectionSink`], so the owner of the
//! actual set can react per id. [`SelectionSet`] is the sink the gallery uses.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::MediaId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one selected id
    Single,
    /// Arbitrary subset with shift-range support
    #[default]
    Multiple,
}

/// Receiver of individual selection changes.
pub trait SelectionSink {
    fn is_selected(&self, id: &MediaId) -> bool;
    /// Current selection, in the order ids were selected
    fn selected(&self) -> Vec<MediaId>;
    fn add(&mut self, id: &MediaId);
    fn remove(&mut self, id: &MediaId);
}

/// Holes left in the order vector before it is compacted
const COMPACT_SLACK: usize = 64;

/// Selected ids of one pane, remembering selection order.
///
/// Removal leaves a hole in `order` instead of shifting it; holes are
/// compacted away once they outnumber live entries.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<Option<MediaId>>,
    slots: HashMap<MediaId, usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &MediaId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaId> {
        self.order.iter().flatten()
    }

    pub fn to_vec(&self) -> Vec<MediaId> {
        self.iter().cloned().collect()
    }

    fn compact(&mut self) {
        self.order.retain(Option::is_some);
        for (slot, id) in self.order.iter().flatten().enumerate() {
            if let Some(entry) = self.slots.get_mut(id) {
                *entry = slot;
            }
        }
    }
}

impl SelectionSink for SelectionSet {
    fn is_selected(&self, id: &MediaId) -> bool {
        self.contains(id)
    }

    fn selected(&self) -> Vec<MediaId> {
        self.to_vec()
    }

    fn add(&mut self, id: &MediaId) {
        if self.slots.contains_key(id) {
            return;
        }
        self.slots.insert(id.clone(), self.order.len());
        self.order.push(Some(id.clone()));
    }

    fn remove(&mut self, id: &MediaId) {
        let Some(slot) = self.slots.remove(id) else {
            return;
        };
        self.order[slot] = None;
        if self.slots.is_empty() {
            self.order.clear();
        } else if self.order.len() > 2 * self.slots.len() + COMPACT_SLACK {
            self.compact();
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    mode: SelectionMode,
    /// Anchor for shift-range selection: the last click target
    last_selected: Option<MediaId>,
}

impl SelectionController {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            last_selected: None,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn last_selected(&self) -> Option<&MediaId> {
        self.last_selected.as_ref()
    }

    /// Primary entry point for a click on `id` within `ordered`.
    ///
    /// The anchor is updated on every call, whatever branch runs.
    pub fn click(
        &mut self,
        id: &MediaId,
        shift_held: bool,
        ordered: &[MediaId],
        sink: &mut impl SelectionSink,
    ) {
        let Some(current) = ordered.iter().position(|x| x == id) else {
            debug!(%id, "click outside current list, anchor only");
            self.last_selected = Some(id.clone());
            return;
        };

        match self.mode {
            SelectionMode::Multiple => {
                let anchor = if shift_held {
                    self.last_selected
                        .as_ref()
                        .and_then(|last| ordered.iter().position(|x| x == last))
                } else {
                    None
                };

                match anchor {
                    Some(anchor) => {
                        let (start, end) = (anchor.min(current), anchor.max(current));
                        for item in &ordered[start..=end] {
                            if !sink.is_selected(item) {
                                sink.add(item);
                            }
                        }
                    }
                    None => toggle(id, sink),
                }
            }
            SelectionMode::Single => {
                if sink.is_selected(id) {
                    sink.remove(id);
                } else {
                    for other in sink.selected() {
                        if &other != id {
                            sink.remove(&other);
                        }
                    }
                    sink.add(id);
                }
            }
        }

        self.last_selected = Some(id.clone());
    }

    pub fn select_all(&self, ordered: &[MediaId], sink: &mut impl SelectionSink) {
        if self.mode == SelectionMode::Single {
            // Select-all is meaningless with one slot; keep at most the first
            if let Some(first) = ordered.first() {
                if sink.selected().is_empty() {
                    sink.add(first);
                }
            }
            return;
        }
        for id in ordered {
            if !sink.is_selected(id) {
                sink.add(id);
            }
        }
    }

    pub fn deselect_all(&self, sink: &mut impl SelectionSink) {
        for id in sink.selected() {
            sink.remove(&id);
        }
    }

    /// Switching to single collapses a multi-selection to the anchor if it is
    /// selected, else to the earliest selected id.
    pub fn set_mode(&mut self, mode: SelectionMode, sink: &mut impl SelectionSink) {
        self.mode = mode;
        if mode != SelectionMode::Single {
            return;
        }

        let selected = sink.selected();
        if selected.len() <= 1 {
            return;
        }

        let keep = match &self.last_selected {
            Some(last) if sink.is_selected(last) => last.clone(),
            _ => selected[0].clone(),
        };
        for id in selected.iter().filter(|id| **id != keep) {
            sink.remove(id);
        }
    }

    /// Drop selected ids that are no longer in `ordered`. Returns how many.
    pub fn prune(&self, ordered: &[MediaId], sink: &mut impl SelectionSink) -> usize {
        let present: HashSet<&MediaId> = ordered.iter().collect();
        let stale: Vec<MediaId> = sink
            .selected()
            .into_iter()
            .filter(|id| !present.contains(id))
            .collect();
        for id in &stale {
            sink.remove(id);
        }
        stale.len()
    }
}

fn toggle(id: &MediaId, sink: &mut impl SelectionSink) {
    if sink.is_selected(id) {
        sink.remove(id);
    } else {
        sink.add(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Change {
        Added(String),
        Removed(String),
    }

    /// Sink that records every notification on top of a real set
    #[derive(Default)]
    struct RecordingSink {
        set: SelectionSet,
        changes: Vec<Change>,
    }

    impl SelectionSink for RecordingSink {
        fn is_selected(&self, id: &MediaId) -> bool {
            self.set.is_selected(id)
        }

        fn selected(&self) -> Vec<MediaId> {
            self.set.selected()
        }

        fn add(&mut self, id: &MediaId) {
            self.changes.push(Change::Added(id.to_string()));
            self.set.add(id);
        }

        fn remove(&mut self, id: &MediaId) {
            self.changes.push(Change::Removed(id.to_string()));
            self.set.remove(id);
        }
    }

    fn ids(names: &[&str]) -> Vec<MediaId> {
        names.iter().map(|n| MediaId::from(*n)).collect()
    }

    fn selected_names(set: &SelectionSet) -> Vec<String> {
        let mut names: Vec<String> = set.iter().map(|id| id.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_shift_click_selects_inclusive_range() {
        let list = ids(&["a", "b", "c", "d", "e"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();

        controller.click(&"b".into(), false, &list, &mut set);
        controller.click(&"d".into(), true, &list, &mut set);

        assert_eq!(selected_names(&set), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_range_is_additive_and_order_independent() {
        let list = ids(&["a", "b", "c", "d", "e"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();

        controller.click(&"e".into(), false, &list, &mut set);
        controller.click(&"d".into(), false, &list, &mut set);
        controller.click(&"b".into(), true, &list, &mut set);

        // Range b..=d added backwards, e kept
        assert_eq!(selected_names(&set), vec!["b", "c", "d", "e"]);
    }

    #[test]
    fn test_range_never_deselects_and_emits_only_additions() {
        let list = ids(&["a", "b", "c", "d"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut sink = RecordingSink::default();

        controller.click(&"a".into(), false, &list, &mut sink);
        controller.click(&"c".into(), false, &list, &mut sink);
        sink.changes.clear();

        controller.click(&"a".into(), true, &list, &mut sink);
        assert_eq!(sink.changes, vec![Change::Added("b".into())]);
    }

    #[test]
    fn test_anchor_is_set_even_when_click_deselects() {
        let list = ids(&["a", "b", "c"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();

        controller.click(&"a".into(), false, &list, &mut set);
        controller.click(&"a".into(), false, &list, &mut set);
        assert!(set.is_empty());
        assert_eq!(controller.last_selected(), Some(&MediaId::from("a")));

        controller.click(&"c".into(), true, &list, &mut set);
        assert_eq!(selected_names(&set), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_shift_without_anchor_toggles() {
        let list = ids(&["a", "b", "c"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();

        controller.click(&"b".into(), true, &list, &mut set);
        assert_eq!(selected_names(&set), vec!["b"]);
    }

    #[test]
    fn test_click_outside_list_only_moves_anchor() {
        let list = ids(&["a", "b", "c"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut sink = RecordingSink::default();

        controller.click(&"zz".into(), false, &list, &mut sink);
        assert!(sink.changes.is_empty());
        assert_eq!(controller.last_selected(), Some(&MediaId::from("zz")));

        // Anchor not in list: shift-click degrades to a toggle
        controller.click(&"c".into(), true, &list, &mut sink);
        assert_eq!(sink.changes, vec![Change::Added("c".into())]);
    }

    #[test]
    fn test_single_mode_is_exclusive() {
        let list = ids(&["a", "b", "c", "d"]);
        let mut controller = SelectionController::new(SelectionMode::Single);
        let mut set = SelectionSet::new();

        let clicks = [
            ("a", false),
            ("c", true),
            ("c", false),
            ("b", false),
            ("d", true),
            ("a", false),
        ];
        for (id, shift) in clicks {
            controller.click(&id.into(), shift, &list, &mut set);
            assert!(set.len() <= 1);
        }
        assert_eq!(selected_names(&set), vec!["a"]);
    }

    #[test]
    fn test_single_mode_click_on_selected_clears() {
        let list = ids(&["a", "b"]);
        let mut controller = SelectionController::new(SelectionMode::Single);
        let mut set = SelectionSet::new();

        controller.click(&"a".into(), false, &list, &mut set);
        controller.click(&"a".into(), false, &list, &mut set);
        assert!(set.is_empty());
    }

    #[test]
    fn test_switch_to_single_keeps_anchor() {
        let list = ids(&["a", "b", "c"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();

        controller.click(&"a".into(), false, &list, &mut set);
        controller.click(&"b".into(), false, &list, &mut set);
        controller.click(&"c".into(), false, &list, &mut set);
        controller.set_mode(SelectionMode::Single, &mut set);

        assert_eq!(selected_names(&set), vec!["c"]);
    }

    #[test]
    fn test_switch_to_single_falls_back_to_first_selected() {
        let list = ids(&["a", "b", "c"]);
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();

        controller.click(&"b".into(), false, &list, &mut set);
        controller.click(&"a".into(), false, &list, &mut set);
        controller.click(&"c".into(), false, &list, &mut set);
        // Deselect the anchor
        controller.click(&"c".into(), false, &list, &mut set);
        controller.set_mode(SelectionMode::Single, &mut set);

        assert_eq!(selected_names(&set), vec!["b"]);

        controller.set_mode(SelectionMode::Multiple, &mut set);
        assert_eq!(selected_names(&set), vec!["b"]);
    }

    #[test]
    fn test_select_all_and_deselect_all() {
        let list = ids(&["a", "b", "c"]);
        let controller = SelectionController::new(SelectionMode::Multiple);
        let mut sink = RecordingSink::default();

        sink.add(&"b".into());
        sink.changes.clear();

        controller.select_all(&list, &mut sink);
        assert_eq!(
            sink.changes,
            vec![Change::Added("a".into()), Change::Added("c".into())]
        );

        sink.changes.clear();
        controller.deselect_all(&mut sink);
        assert_eq!(sink.changes.len(), 3);
        assert!(sink.set.is_empty());
    }

    #[test]
    fn test_prune_removes_stale_ids() {
        let controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();
        set.add(&"a".into());
        set.add(&"c".into());

        let removed = controller.prune(&ids(&["a", "b"]), &mut set);
        assert_eq!(removed, 1);
        assert_eq!(selected_names(&set), vec!["a"]);
    }

    #[test]
    fn test_removal_keeps_selection_order() {
        let mut set = SelectionSet::new();
        for name in ["d", "a", "c", "b"] {
            set.add(&name.into());
        }
        set.remove(&"a".into());
        set.add(&"a".into());

        let order: Vec<String> = set.iter().map(|id| id.to_string()).collect();
        assert_eq!(order, vec!["d", "c", "b", "a"]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_holes_are_compacted() {
        let list: Vec<MediaId> = (0..10_000).map(|i| MediaId::new(i.to_string())).collect();
        let mut set = SelectionSet::new();
        for id in &list {
            set.add(id);
        }
        for id in list.iter().skip(10) {
            set.remove(id);
            assert!(set.order.len() <= 2 * set.len() + COMPACT_SLACK);
        }
        assert_eq!(set.to_vec(), list[..10].to_vec());

        // Survivors still remove cleanly after compaction moved them
        set.remove(&list[3]);
        assert!(!set.contains(&list[3]));
        assert_eq!(set.len(), 9);
    }

    #[test]
    fn test_bulk_operations_scale_linearly() {
        let list: Vec<MediaId> = (0..100_000).map(|i| MediaId::new(format!("m{}", i))).collect();
        let mut controller = SelectionController::new(SelectionMode::Multiple);
        let mut set = SelectionSet::new();

        let start = std::time::Instant::now();
        controller.select_all(&list, &mut set);
        controller.deselect_all(&mut set);
        assert!(set.is_empty());

        controller.select_all(&list, &mut set);
        controller.set_mode(SelectionMode::Single, &mut set);
        assert_eq!(set.len(), 1);

        controller.set_mode(SelectionMode::Multiple, &mut set);
        controller.select_all(&list, &mut set);
        let removed = controller.prune(&list[..50_000], &mut set);
        assert_eq!(removed, 50_000);
        assert!(start.elapsed() < std::time::Duration::from_secs(5));
    }
}
