//! Undo/redo history.
//!
//! A bounded, pointer-addressed list of scene snapshots. Every committed
//! mutation appends one entry; undo and redo move the pointer and hand back
//! the entry to restore.
//!
//! Continuous interactions (drags, slider scrubs) use **gesture batching**:
//! mutations inside `begin_batch()`/`end_batch()` are applied live and only
//! mark the batch dirty, and the outermost `end_batch()` tells the caller
//! whether one entry should be recorded for the whole gesture.

use tc_core::snapshot::Snapshot;

pub struct HistoryStore {
    entries: Vec<Snapshot>,
    /// Index of the entry matching the live scene. `None` while empty.
    pointer: Option<usize>,
    /// Maximum number of retained entries.
    cap: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Whether any mutation happened during the current batch.
    batch_dirty: bool,
}

impl HistoryStore {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: Vec::with_capacity(cap),
            pointer: None,
            cap,
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    /// Append an entry. Entries past the pointer are discarded first, and
    /// the oldest entry is evicted when the cap is exceeded.
    pub fn record(&mut self, snapshot: Snapshot) {
        if let Some(p) = self.pointer {
            self.entries.truncate(p + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.cap {
            self.entries.remove(0);
        }
        self.pointer = Some(self.entries.len() - 1);
        log::trace!("history: {} entries, pointer {:?}", self.entries.len(), self.pointer);
    }

    /// Step back. Returns the entry to restore, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        match self.pointer {
            Some(p) if p > 0 => {
                self.pointer = Some(p - 1);
                self.entries.get(p - 1)
            }
            _ => None,
        }
    }

    /// Step forward. Returns the entry to restore, or `None` at the newest.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        match self.pointer {
            Some(p) if p + 1 < self.entries.len() => {
                self.pointer = Some(p + 1);
                self.entries.get(p + 1)
            }
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.pointer.and_then(|p| self.entries.get(p))
    }

    pub fn can_undo(&self) -> bool {
        self.pointer.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.pointer.is_some_and(|p| p + 1 < self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    // ─── Gesture batching ────────────────────────────────────────────────

    /// Start a batch group. Nested calls only deepen the group.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Note a live mutation inside the current batch.
    pub fn mark_dirty(&mut self) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
        }
    }

    /// End a batch group. Returns true when the outermost group closed and
    /// something changed, i.e. the caller should record one entry.
    pub fn end_batch(&mut self) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            return std::mem::take(&mut self.batch_dirty);
        }
        false
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Drop any open batch without recording it. Used when the live scene
    /// is replaced wholesale, so the gesture's edits no longer exist.
    pub fn reset_batch(&mut self) {
        self.batch_depth = 0;
        self.batch_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tc_core::color::Color;
    use tc_core::id::NodeId;
    use tc_core::model::{NodeKind, RectProps, SceneNode};
    use tc_core::scene::SceneGraph;

    /// A distinct snapshot per `n`: a scene holding one rect at x = n.
    fn snap(n: usize) -> Snapshot {
        let mut sg = SceneGraph::new();
        sg.add(
            SceneNode::new(
                NodeId::intern("hist-rect"),
                NodeKind::Rect(RectProps::filled(Color::BLACK)),
            )
            .at(n as f32, 0.0),
        );
        Snapshot::encode(&sg).unwrap()
    }

    fn x_of(s: &Snapshot) -> f32 {
        s.decode().unwrap().nodes[0].node.x
    }

    #[test]
    fn cap_keeps_most_recent_entries() {
        let mut h = HistoryStore::new(50);
        for i in 0..75 {
            h.record(snap(i));
            assert!(h.pointer().is_some_and(|p| p < h.len()));
        }
        assert_eq!(h.len(), 50);
        assert_eq!(h.pointer(), Some(49));
        assert_eq!(x_of(&h.entries()[0]), 25.0);
        assert_eq!(x_of(h.current().unwrap()), 74.0);
    }

    #[test]
    fn undo_redo_move_pointer() {
        let mut h = HistoryStore::new(10);
        h.record(snap(0));
        h.record(snap(1));
        h.record(snap(2));

        assert_eq!(h.undo().map(x_of), Some(1.0));
        assert_eq!(h.undo().map(x_of), Some(0.0));
        assert_eq!(h.undo().map(x_of), None);
        assert_eq!(h.pointer(), Some(0));

        assert_eq!(h.redo().map(x_of), Some(1.0));
        assert_eq!(h.redo().map(x_of), Some(2.0));
        assert_eq!(h.redo().map(x_of), None);
    }

    #[test]
    fn record_after_undo_truncates() {
        let mut h = HistoryStore::new(10);
        for i in 0..4 {
            h.record(snap(i));
        }
        h.undo();
        h.undo();
        h.record(snap(9));
        assert_eq!(h.len(), 3);
        assert!(!h.can_redo());
        let xs: Vec<_> = h.entries().iter().map(x_of).collect();
        assert_eq!(xs, vec![0.0, 1.0, 9.0]);
    }

    #[test]
    fn empty_store_is_inert() {
        let mut h = HistoryStore::new(5);
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        assert!(!h.can_undo());
        assert_eq!(h.current(), None);
    }

    #[test]
    fn nested_batch_reports_once() {
        let mut h = HistoryStore::new(5);
        h.begin_batch();
        h.begin_batch();
        h.mark_dirty();
        assert!(!h.end_batch());
        assert!(h.in_batch());
        assert!(h.end_batch());
        assert!(!h.in_batch());
    }

    #[test]
    fn clean_batch_records_nothing() {
        let mut h = HistoryStore::new(5);
        h.begin_batch();
        assert!(!h.end_batch());
        assert!(!h.end_batch());
        h.mark_dirty();
        h.begin_batch();
        assert!(!h.end_batch());
    }

    #[test]
    fn reset_closes_open_batch() {
        let mut h = HistoryStore::new(5);
        h.begin_batch();
        h.begin_batch();
        h.mark_dirty();
        h.reset_batch();
        assert!(!h.in_batch());
        assert!(!h.end_batch());
    }
}
