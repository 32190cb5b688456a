// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded undo/redo over scene content snapshots.

use crate::model::SceneContent;
use crate::store::SceneStore;

/// Undo/redo stacks of [`SceneContent`] snapshots (oldest first).
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<SceneContent>,
    redo: Vec<SceneContent>,
    max_entries: usize,
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self { undo: Vec::new(), redo: Vec::new(), max_entries: max_entries.max(1) }
    }

    pub fn has_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn has_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Records the state *before* a mutation. Clears the redo stack.
    pub fn record(&mut self, before: SceneContent) {
        self.redo.clear();
        push_bounded(&mut self.undo, before, self.max_entries);
    }

    /// Restores the most recent snapshot; the current content moves onto the redo stack.
    pub fn undo(&mut self, store: &mut SceneStore) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        push_bounded(&mut self.redo, store.content(), self.max_entries);
        store.restore_content(previous);
        true
    }

    pub fn redo(&mut self, store: &mut SceneStore) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        push_bounded(&mut self.undo, store.content(), self.max_entries);
        store.restore_content(next);
        true
    }

    /// Drops the most recent snapshot and restores it without touching the redo stack.
    ///
    /// Used to abandon a gesture that turned out not to change anything worth keeping.
    pub fn rollback(&mut self, store: &mut SceneStore) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        store.rollback_content(previous);
        true
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

fn push_bounded(stack: &mut Vec<SceneContent>, entry: SceneContent, max_entries: usize) {
    stack.push(entry);
    if stack.len() > max_entries {
        let excess = stack.len() - max_entries;
        stack.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::Element;

    fn create(store: &mut SceneStore, history: &mut History, x: f64) {
        history.record(store.content());
        store.append(Element::rectangle(x, 0.0, 10.0, 10.0));
    }

    #[test]
    fn undo_n_creations_returns_to_empty() {
        let mut store = SceneStore::new();
        let mut history = History::new(100);
        assert!(!history.has_undo());

        for i in 0..5 {
            create(&mut store, &mut history, f64::from(i));
            assert!(history.has_undo());
        }
        for remaining in (0..5).rev() {
            assert!(history.undo(&mut store));
            assert_eq!(store.scene().live_count(), remaining);
        }
        assert!(!history.has_undo());
        assert_eq!(store.scene().live_count(), 0);
        assert!(!history.undo(&mut store));
    }

    #[test]
    fn redo_restores_latest_mutation() {
        let mut store = SceneStore::new();
        let mut history = History::new(100);
        create(&mut store, &mut history, 1.0);
        create(&mut store, &mut history, 2.0);
        let after: Vec<f64> = store.scene().live_elements().map(|el| el.x).collect();

        assert!(history.undo(&mut store));
        assert!(history.has_redo());
        assert!(history.redo(&mut store));
        let restored: Vec<f64> = store.scene().live_elements().map(|el| el.x).collect();
        assert_eq!(restored, after);
        assert!(!history.has_redo());
    }

    #[test]
    fn undo_and_redo_only_move_versions_forward() {
        let mut store = SceneStore::new();
        let mut history = History::new(100);
        history.record(store.content());
        let id = store.append(Element::rectangle(0.0, 0.0, 10.0, 10.0));
        history.record(store.content());
        store.translate(&BTreeSet::from([id.clone()]), 5.0, 0.0);

        let stamp = |store: &SceneStore| {
            let el = store.element(&id).unwrap();
            (el.version(), el.version_nonce(), el.x, el.is_deleted())
        };
        let mut seen = vec![stamp(&store)];

        for step in [true, true, false, false] {
            let moved = if step { history.undo(&mut store) } else { history.redo(&mut store) };
            assert!(moved);
            let now = stamp(&store);
            let last = seen[seen.len() - 1];
            assert!(now.0 > last.0, "version went from {} to {}", last.0, now.0);
            assert!(seen.iter().all(|prev| prev.1 != now.1), "nonce reused");
            seen.push(now);
        }

        let xs: Vec<(f64, bool)> = seen.iter().map(|s| (s.2, s.3)).collect();
        assert_eq!(xs, vec![(5.0, false), (0.0, false), (0.0, true), (0.0, false), (5.0, false)]);
    }

    #[test]
    fn new_mutation_after_undo_clears_redo() {
        let mut store = SceneStore::new();
        let mut history = History::new(100);
        create(&mut store, &mut history, 1.0);
        history.undo(&mut store);
        assert!(history.has_redo());
        create(&mut store, &mut history, 2.0);
        assert!(!history.has_redo());
    }

    #[test]
    fn stacks_are_bounded() {
        let mut store = SceneStore::new();
        let mut history = History::new(3);
        for i in 0..10 {
            create(&mut store, &mut history, f64::from(i));
        }
        assert_eq!(history.undo_len(), 3);
        while history.undo(&mut store) {}
        assert_eq!(store.scene().live_count(), 7);
        assert_eq!(history.redo_len(), 3);
    }

    #[test]
    fn rollback_does_not_offer_redo() {
        let mut store = SceneStore::new();
        let mut history = History::new(10);
        create(&mut store, &mut history, 1.0);
        assert!(history.rollback(&mut store));
        assert!(store.elements().is_empty());
        assert!(!history.has_redo());
        assert!(!history.has_undo());
    }
}
