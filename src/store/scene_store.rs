// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeSet, HashMap};

use crate::model::{
    AppState, AppStatePatch, Element, ElementId, ElementPatch, Point, Scene, SceneContent,
};

/// Minimal delta describing which elements changed in one store operation.
///
/// Tombstoned elements are reported as `removed`; they stay in the element list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ElementId>,
    pub removed: Vec<ElementId>,
    pub updated: Vec<ElementId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<ElementId>,
    removed: BTreeSet<ElementId>,
    updated: BTreeSet<ElementId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, id: ElementId) {
        self.removed.remove(&id);
        self.updated.remove(&id);
        self.added.insert(id);
    }

    fn record_removed(&mut self, id: ElementId) {
        self.added.remove(&id);
        self.updated.remove(&id);
        self.removed.insert(id);
    }

    fn record_updated(&mut self, id: ElementId) {
        if self.added.contains(&id) || self.removed.contains(&id) {
            return;
        }
        self.updated.insert(id);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    /// The whole scene was swapped (load, reset).
    Replaced,
    /// Elements and files were restored from a history snapshot.
    Restored,
    Elements(Delta),
    Reordered(Vec<ElementId>),
    ViewState,
}

/// A change event emitted by [`SceneStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneChange {
    pub rev: u64,
    pub kind: ChangeKind,
}

impl SceneChange {
    /// Whether the change touched persisted content (elements/files) rather than view state.
    pub fn touches_content(&self) -> bool {
        !matches!(self.kind, ChangeKind::ViewState)
    }
}

/// The in-memory aggregate for one open scene.
///
/// Every mutation goes through this type: it keeps element ids unique, advances element
/// versions, bumps its own revision and queues a [`SceneChange`] for observers.
#[derive(Debug, Default)]
pub struct SceneStore {
    scene: Scene,
    index: HashMap<ElementId, usize>,
    rev: u64,
    changes: Vec<SceneChange>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(scene: Scene) -> Self {
        let mut store = Self::default();
        store.install(scene);
        store
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn elements(&self) -> &[Element] {
        &self.scene.elements
    }

    pub fn app_state(&self) -> &AppState {
        &self.scene.app_state
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.index.get(id).map(|&pos| &self.scene.elements[pos])
    }

    pub fn selection(&self) -> &BTreeSet<ElementId> {
        &self.scene.app_state.selected_element_ids
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// Scene version: the change-detection sum over all elements.
    pub fn current_version(&self) -> u64 {
        self.scene.version()
    }

    pub fn content(&self) -> SceneContent {
        self.scene.content()
    }

    /// Drains queued change events, oldest first.
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }

    /// Atomically swaps the whole scene.
    ///
    /// Duplicate element ids keep their first occurrence.
    pub fn replace(&mut self, scene: Scene) {
        self.install(scene);
        self.emit(ChangeKind::Replaced);
    }

    /// Swaps in an empty scene, keeping the active tool.
    pub fn reset(&mut self) {
        let tool = self.scene.app_state.active_tool;
        let mut scene = Scene::default();
        scene.app_state.active_tool = tool;
        self.replace(scene);
    }

    /// Restores elements and files from a history snapshot; view state is kept and the selection
    /// is pruned to elements that are still live.
    ///
    /// Element versions keep increasing: reverted elements are bumped past their current
    /// version and elements the snapshot does not know are tombstoned.
    pub fn restore_content(&mut self, content: SceneContent) {
        self.revert(content, true);
    }

    /// Like [`restore_content`](Self::restore_content), but drops elements the snapshot does not
    /// know instead of tombstoning them. For abandoning a gesture that was never committed.
    pub fn rollback_content(&mut self, content: SceneContent) {
        self.revert(content, false);
    }

    fn revert(&mut self, content: SceneContent, keep_tombstones: bool) {
        let SceneContent { elements, files } = content;
        let mut current: Vec<Option<Element>> =
            std::mem::take(&mut self.scene.elements).into_iter().map(Some).collect();

        let mut restored = Vec::with_capacity(elements.len());
        for snapshot in elements {
            let slot = self.index.get(&snapshot.id).and_then(|&pos| current[pos].take());
            match slot {
                Some(mut el) => {
                    el.revert_to(snapshot);
                    restored.push(el);
                }
                None => restored.push(snapshot),
            }
        }
        if keep_tombstones {
            for mut el in current.into_iter().flatten() {
                el.mark_deleted();
                restored.push(el);
            }
        }

        let app_state = std::mem::take(&mut self.scene.app_state);
        self.install(Scene { elements: restored, app_state, files });
        self.prune_selection();
        self.emit(ChangeKind::Restored);
    }

    /// Inserts unknown ids (appended in order) and merges known ones.
    pub fn upsert_elements(&mut self, elements: Vec<Element>) -> Delta {
        let mut delta = DeltaBuilder::default();
        for incoming in elements {
            let id = incoming.id.clone();
            match self.index.get(&id).copied() {
                Some(pos) => {
                    let existing = &mut self.scene.elements[pos];
                    let was_deleted = existing.is_deleted();
                    existing.merge_from(incoming);
                    if !was_deleted && existing.is_deleted() {
                        delta.record_removed(id);
                    } else {
                        delta.record_updated(id);
                    }
                }
                None => {
                    self.index.insert(id.clone(), self.scene.elements.len());
                    self.scene.elements.push(incoming);
                    delta.record_added(id);
                }
            }
        }
        let delta = delta.finish();
        if !delta.is_empty() {
            self.emit(ChangeKind::Elements(delta.clone()));
        }
        delta
    }

    /// Appends a new element on top of the paint order and returns its id.
    pub fn append(&mut self, element: Element) -> ElementId {
        let id = element.id.clone();
        self.upsert_elements(vec![element]);
        id
    }

    pub fn patch_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.update_live(id, |el| {
            el.apply(patch);
            true
        })
    }

    pub fn set_element_rect(
        &mut self,
        id: &ElementId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> bool {
        self.update_live(id, |el| {
            el.set_rect(x, y, width, height);
            true
        })
    }

    pub fn push_point(&mut self, id: &ElementId, at: Point, pressure: Option<f64>) -> bool {
        self.update_live(id, |el| el.push_point(at, pressure))
    }

    /// Moves every listed live element; returns how many moved.
    pub fn translate(&mut self, ids: &BTreeSet<ElementId>, dx: f64, dy: f64) -> usize {
        let mut delta = DeltaBuilder::default();
        for id in ids {
            if let Some(el) = self.live_mut(id) {
                el.translate(dx, dy);
                delta.record_updated(id.clone());
            }
        }
        let delta = delta.finish();
        let moved = delta.updated.len();
        if moved > 0 {
            self.emit(ChangeKind::Elements(delta));
        }
        moved
    }

    /// Tombstones the listed elements and drops them from the selection.
    ///
    /// Returns the ids that were actually deleted (unknown ids and tombstones are skipped).
    pub fn tombstone(&mut self, ids: &BTreeSet<ElementId>) -> Vec<ElementId> {
        let mut delta = DeltaBuilder::default();
        for id in ids {
            if let Some(el) = self.live_mut(id) {
                if el.mark_deleted() {
                    delta.record_removed(id.clone());
                }
            }
        }
        let delta = delta.finish();
        if delta.is_empty() {
            return Vec::new();
        }
        let removed = delta.removed.clone();
        self.scene.app_state.selected_element_ids.retain(|id| !removed.contains(id));
        self.emit(ChangeKind::Elements(delta));
        removed
    }

    /// Moves the listed elements to the top of the paint order, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &BTreeSet<ElementId>) -> bool {
        self.reorder(ids, true)
    }

    /// Moves the listed elements to the bottom of the paint order, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &BTreeSet<ElementId>) -> bool {
        self.reorder(ids, false)
    }

    pub fn set_view_state(&mut self, patch: AppStatePatch) -> bool {
        let changed = self.scene.app_state.apply(patch);
        if changed {
            self.emit(ChangeKind::ViewState);
        }
        changed
    }

    pub fn select(&mut self, ids: BTreeSet<ElementId>) -> bool {
        let live: BTreeSet<ElementId> = ids
            .into_iter()
            .filter(|id| self.element(id).is_some_and(|el| !el.is_deleted()))
            .collect();
        self.set_view_state(AppStatePatch::selection(live))
    }

    fn reorder(&mut self, ids: &BTreeSet<ElementId>, to_front: bool) -> bool {
        let elements = std::mem::take(&mut self.scene.elements);
        let (mut moved, rest): (Vec<Element>, Vec<Element>) =
            elements.into_iter().partition(|el| ids.contains(&el.id));
        if moved.is_empty() {
            self.scene.elements = rest;
            return false;
        }
        for el in &mut moved {
            el.bump();
        }
        let moved_ids = moved.iter().map(|el| el.id.clone()).collect();
        self.scene.elements = if to_front {
            rest.into_iter().chain(moved).collect()
        } else {
            moved.into_iter().chain(rest).collect()
        };
        self.rebuild_index();
        self.emit(ChangeKind::Reordered(moved_ids));
        true
    }

    fn update_live(&mut self, id: &ElementId, f: impl FnOnce(&mut Element) -> bool) -> bool {
        let Some(el) = self.live_mut(id) else {
            return false;
        };
        if !f(el) {
            return false;
        }
        self.emit(ChangeKind::Elements(Delta {
            updated: vec![id.clone()],
            ..Delta::default()
        }));
        true
    }

    fn live_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        let pos = *self.index.get(id)?;
        let el = &mut self.scene.elements[pos];
        (!el.is_deleted()).then_some(el)
    }

    fn install(&mut self, mut scene: Scene) {
        let mut seen = BTreeSet::new();
        scene.elements.retain(|el| seen.insert(el.id.clone()));
        self.scene = scene;
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .scene
            .elements
            .iter()
            .enumerate()
            .map(|(pos, el)| (el.id.clone(), pos))
            .collect();
    }

    fn prune_selection(&mut self) {
        let index = &self.index;
        let elements = &self.scene.elements;
        self.scene
            .app_state
            .selected_element_ids
            .retain(|id| index.get(id).is_some_and(|&pos| !elements[pos].is_deleted()));
    }

    fn emit(&mut self, kind: ChangeKind) {
        self.rev = self.rev.saturating_add(1);
        self.changes.push(SceneChange { rev: self.rev, kind });
    }
}
