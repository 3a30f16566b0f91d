//! Bounded undo/redo log of committed design snapshots.
//!
//! Entries form a stack with a cursor pointing at the current state.
//! Everything before the cursor is the past, everything after it the future.
//!
//! ```text
//! [ e0  e1  e2  e3 ]
//!           ^ cursor      undo -> e1, redo -> e3
//! ```
//!
//! Recording a snapshot equal to the current one only refreshes its label.
//! Recording anything else drops the future, pushes, and evicts the oldest
//! entry once the capacity is exceeded.

use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<S> {
    pub snapshot: S,
    pub label: String,
}

#[derive(Debug)]
pub struct History<S> {
    entries: VecDeque<HistoryEntry<S>>,
    /// Index of the current entry; meaningless while `entries` is empty.
    cursor: usize,
    capacity: usize,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<S> History<S> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&HistoryEntry<S>> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<S: Clone + PartialEq> History<S> {
    /// Record a committed snapshot. Returns whether a new entry was pushed.
    pub fn record(&mut self, snapshot: &S, label: impl Into<String>) -> bool {
        let label = label.into();

        if let Some(current) = self.entries.get_mut(self.cursor)
            && current.snapshot == *snapshot
        {
            current.label = label;
            return false;
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(HistoryEntry {
            snapshot: snapshot.clone(),
            label,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Step back. `None` when there is no past.
    pub fn undo(&mut self) -> Option<S> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(|e| e.snapshot.clone())
    }

    /// Step forward. `None` when there is no future.
    pub fn redo(&mut self) -> Option<S> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).map(|e| e.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Design;

    fn design(span: f64) -> Design {
        Design {
            wing_span: span,
            ..Design::default()
        }
    }

    #[test]
    fn test_duplicate_record_is_noop() {
        let mut h = History::default();
        assert!(h.record(&design(1.0), "first"));
        assert!(!h.record(&design(1.0), "again"));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current().unwrap().label, "again");

        assert!(h.record(&design(2.0), "second"));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut h = History::default();
        for span in [1.0, 2.0, 3.0] {
            h.record(&design(span), format!("span {span}"));
        }

        assert_eq!(h.undo(), Some(design(2.0)));
        assert_eq!(h.undo(), Some(design(1.0)));
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), Some(design(2.0)));
        assert_eq!(h.redo(), Some(design(3.0)));
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn test_empty_boundaries_are_noops() {
        let mut h: History<Design> = History::default();
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), None);

        h.record(&design(1.0), "only");
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), None);
        assert_eq!(h.current().unwrap().snapshot, design(1.0));
    }

    #[test]
    fn test_record_after_undo_drops_future() {
        let mut h = History::default();
        for span in [1.0, 2.0, 3.0] {
            h.record(&design(span), "edit");
        }
        h.undo();
        h.undo();
        assert!(h.record(&design(5.0), "branch"));

        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert_eq!(h.undo(), Some(design(1.0)));
    }

    #[test]
    fn test_record_equal_to_current_after_undo() {
        let mut h = History::default();
        h.record(&design(1.0), "a");
        h.record(&design(2.0), "b");
        h.undo();

        // Equal to the current entry: future survives
        assert!(!h.record(&design(1.0), "a again"));
        assert!(h.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::default();
        for i in 0..60 {
            h.record(&design(f64::from(i)), format!("edit {i}"));
        }
        assert_eq!(h.len(), DEFAULT_CAPACITY);
        assert_eq!(h.current().unwrap().snapshot, design(59.0));

        let mut oldest = None;
        while let Some(s) = h.undo() {
            oldest = Some(s);
        }
        assert_eq!(oldest, Some(design(10.0)));
    }

    #[test]
    fn test_clear() {
        let mut h = History::default();
        h.record(&design(1.0), "a");
        h.clear();
        assert!(h.is_empty());
        assert!(!h.can_undo());
        assert!(h.record(&design(1.0), "a"));
    }
}
