// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas interaction engine.
//!
//! [`CanvasEditor`] is the tool state machine: it turns pointer and keyboard input into
//! [`SceneStore`] mutations, records undo history before each mutation and owns selection and
//! hit-testing. Hosts (the TUI, tests) translate their input into [`PointerEvent`]s and
//! [`Command`]s and render from [`CanvasEditor::store`].

mod input;

use std::collections::BTreeSet;

use crate::config::EditorConfig;
use crate::history::History;
use crate::model::{
    AppStatePatch, BoundElement, Element, ElementId, ElementKind, Point, Scene, ShapeKind, Tool,
};
use crate::store::{SceneChange, SceneStore};

pub use input::{
    command_for_key, tool_shortcut, Command, Key, KeyInput, Modifiers, PointerEvent, PAN_STEP,
};

/// Host window capability used by the double-click maximize toggle.
pub trait WindowControl {
    fn is_maximized(&self) -> bool;
    fn set_maximized(&mut self, maximized: bool);
}

/// A window without chrome that only remembers its flag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetachedWindow {
    maximized: bool,
}

impl WindowControl for DetachedWindow {
    fn is_maximized(&self) -> bool {
        self.maximized
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
    }
}

/// What an input did, for hosts that redraw or prompt selectively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasResponse {
    /// Element content changed (the scene version moved).
    pub scene_changed: bool,
    pub selection_changed: bool,
    /// The text tool wants a string for a new text element at this point.
    /// Answer with [`CanvasEditor::submit_text`].
    pub text_prompt: Option<Point>,
    pub window_toggled: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    /// Rectangle/ellipse being sized by a drag.
    Sizing { id: ElementId, origin: Point },
    /// Line/arrow/freehand accumulating samples.
    Stroking { id: ElementId, min_points: usize },
    /// Selected elements following the pointer. History is recorded on the first movement.
    Moving { ids: BTreeSet<ElementId>, last: Point, recorded: bool },
    AwaitingText { at: Point },
}

pub struct CanvasEditor {
    store: SceneStore,
    history: History,
    gesture: Gesture,
    window: Box<dyn WindowControl>,
    config: EditorConfig,
}

impl std::fmt::Debug for CanvasEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEditor")
            .field("store", &self.store)
            .field("history", &self.history)
            .field("gesture", &self.gesture)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CanvasEditor {
    pub fn new(config: EditorConfig, window: Box<dyn WindowControl>) -> Self {
        Self {
            store: SceneStore::new(),
            history: History::new(config.history_limit),
            gesture: Gesture::Idle,
            window,
            config,
        }
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn scene(&self) -> &Scene {
        self.store.scene()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tool(&self) -> Tool {
        self.store.app_state().active_tool
    }

    pub fn selection(&self) -> &BTreeSet<ElementId> {
        self.store.selection()
    }

    pub fn window(&self) -> &dyn WindowControl {
        self.window.as_ref()
    }

    /// Point where the text tool is waiting for input, if any.
    pub fn pending_text(&self) -> Option<Point> {
        match self.gesture {
            Gesture::AwaitingText { at } => Some(at),
            _ => None,
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        self.store.take_changes()
    }

    /// Installs a loaded scene. History starts over.
    pub fn load(&mut self, scene: Scene) {
        self.gesture = Gesture::Idle;
        self.store.replace(scene);
        self.history.clear();
    }

    /// Starts a new, empty scene. History starts over; the active tool is kept.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.store.reset();
        self.history.clear();
    }

    pub fn set_tool(&mut self, tool: Tool) -> CanvasResponse {
        self.observe(|editor| {
            editor.finish_gesture();
            editor.store.set_view_state(AppStatePatch::tool(tool));
            CanvasResponse::default()
        })
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let state = self.store.app_state();
        let patch = AppStatePatch::scroll(state.scroll_x + dx, state.scroll_y + dy);
        self.store.set_view_state(patch)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> CanvasResponse {
        self.observe(|editor| match event {
            PointerEvent::Down { at, modifiers } => editor.pointer_down(at, modifiers),
            PointerEvent::Move { at } => {
                editor.pointer_move(at);
                CanvasResponse::default()
            }
            PointerEvent::Up { at } => {
                editor.pointer_move(at);
                editor.finish_gesture();
                CanvasResponse::default()
            }
            PointerEvent::DoubleClick { at } => editor.double_click(at),
        })
    }

    /// Editor-level commands. `Save` and `NewScene` belong to the session and are ignored here.
    pub fn handle_command(&mut self, command: Command) -> CanvasResponse {
        self.observe(|editor| {
            match command {
                Command::Undo => {
                    editor.undo();
                }
                Command::Redo => {
                    editor.redo();
                }
                Command::DeleteSelection => {
                    editor.delete_selection();
                }
                Command::SetTool(tool) => {
                    editor.finish_gesture();
                    editor.store.set_view_state(AppStatePatch::tool(tool));
                }
                Command::BringToFront => {
                    editor.reorder(true);
                }
                Command::SendToBack => {
                    editor.reorder(false);
                }
                Command::Pan { dx, dy } => {
                    editor.pan(dx, dy);
                }
                Command::Cancel => {
                    editor.finish_gesture();
                    if !editor.store.selection().is_empty() {
                        editor.store.select(BTreeSet::new());
                    }
                }
                Command::Save | Command::NewScene => {}
            }
            CanvasResponse::default()
        })
    }

    /// Answers a text prompt. `None` or blank text cancels without mutating the scene.
    pub fn submit_text(&mut self, text: Option<String>) -> CanvasResponse {
        self.observe(|editor| {
            let Gesture::AwaitingText { at } = editor.gesture else {
                return CanvasResponse::default();
            };
            editor.gesture = Gesture::Idle;
            let Some(text) = text.filter(|text| !text.trim().is_empty()) else {
                return CanvasResponse::default();
            };
            editor.create_text(at, text);
            CanvasResponse::default()
        })
    }

    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        self.history.redo(&mut self.store)
    }

    /// Tombstones the selection (plus text bound into it) and clears the selection.
    pub fn delete_selection(&mut self) -> bool {
        let selection = self.store.selection().clone();
        if selection.is_empty() {
            return false;
        }
        let mut doomed = selection.clone();
        for id in &selection {
            doomed.extend(self.store.scene().bound_text(id).map(|el| el.id.clone()));
        }
        self.history.record(self.store.content());
        if self.store.tombstone(&doomed).is_empty() {
            self.history.rollback(&mut self.store);
            return false;
        }
        true
    }

    fn pointer_down(&mut self, at: Point, modifiers: Modifiers) -> CanvasResponse {
        if matches!(self.gesture, Gesture::AwaitingText { .. }) {
            self.gesture = Gesture::Idle;
        } else {
            self.finish_gesture();
        }

        match self.tool() {
            Tool::Selection => self.select_at(at, modifiers.shift),
            Tool::Rectangle => self.begin_shape(at, ShapeKind::Rectangle),
            Tool::Ellipse => self.begin_shape(at, ShapeKind::Ellipse),
            Tool::Line => self.begin_stroke(Element::linear(at.x, at.y, false), 2),
            Tool::Arrow => self.begin_stroke(Element::linear(at.x, at.y, true), 2),
            Tool::Freedraw => self.begin_stroke(Element::freedraw(at.x, at.y), 1),
            Tool::Text => {
                self.gesture = Gesture::AwaitingText { at };
                return CanvasResponse { text_prompt: Some(at), ..CanvasResponse::default() };
            }
            Tool::Eraser => self.erase_at(at),
        }
        CanvasResponse::default()
    }

    fn pointer_move(&mut self, at: Point) {
        match &mut self.gesture {
            Gesture::Idle | Gesture::AwaitingText { .. } => {}
            Gesture::Sizing { id, origin } => {
                let (dx, dy) = (at.x - origin.x, at.y - origin.y);
                if dx == 0.0 && dy == 0.0 {
                    return;
                }
                let (x, y) = (origin.x.min(at.x), origin.y.min(at.y));
                let id = id.clone();
                self.store.set_element_rect(&id, x, y, dx.abs(), dy.abs());
            }
            Gesture::Stroking { id, .. } => {
                let id = id.clone();
                let duplicate =
                    self.store.element(&id).is_some_and(|el| last_point(el) == Some(at));
                if !duplicate {
                    self.store.push_point(&id, at, None);
                }
            }
            Gesture::Moving { ids, last, recorded } => {
                let (dx, dy) = (at.x - last.x, at.y - last.y);
                if dx == 0.0 && dy == 0.0 {
                    return;
                }
                if !*recorded {
                    self.history.record(self.store.content());
                    *recorded = true;
                }
                *last = at;
                let ids = ids.clone();
                self.store.translate(&ids, dx, dy);
            }
        }
    }

    fn double_click(&mut self, at: Point) -> CanvasResponse {
        if self.tool() != Tool::Selection || self.store.scene().hit_test(at).is_some() {
            return CanvasResponse::default();
        }
        let maximized = self.window.is_maximized();
        self.window.set_maximized(!maximized);
        CanvasResponse { window_toggled: true, ..CanvasResponse::default() }
    }

    /// Ends the current gesture, dropping strokes that never got enough samples.
    fn finish_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Stroking { id, min_points } => {
                let too_short =
                    self.store.element(&id).map_or(true, |el| el.point_count() < min_points);
                if too_short {
                    self.history.rollback(&mut self.store);
                }
            }
            Gesture::Idle
            | Gesture::Sizing { .. }
            | Gesture::Moving { .. }
            | Gesture::AwaitingText { .. } => {}
        }
    }

    fn select_at(&mut self, at: Point, extend: bool) {
        let hit = self.store.scene().hit_test(at).map(|el| el.id.clone());
        let mut selection = self.store.selection().clone();
        match hit {
            Some(id) => {
                if extend {
                    if !selection.remove(&id) {
                        selection.insert(id.clone());
                    }
                } else if !selection.contains(&id) {
                    selection = BTreeSet::from([id.clone()]);
                }
                self.store.select(selection.clone());
                if selection.contains(&id) {
                    self.gesture = Gesture::Moving { ids: selection, last: at, recorded: false };
                }
            }
            None => {
                if !extend && !selection.is_empty() {
                    self.store.select(BTreeSet::new());
                }
            }
        }
    }

    fn begin_shape(&mut self, at: Point, kind: ShapeKind) {
        let (width, height) = self.config.default_shape_size;
        let element = Element::new(ElementKind::Shape(kind), at.x, at.y, width, height);
        let id = self.insert_styled(element);
        self.gesture = Gesture::Sizing { id, origin: at };
    }

    fn begin_stroke(&mut self, element: Element, min_points: usize) {
        let id = self.insert_styled(element);
        self.gesture = Gesture::Stroking { id, min_points };
    }

    /// Records history, applies the current item styling, appends and selects the element.
    fn insert_styled(&mut self, mut element: Element) -> ElementId {
        element.style = self.store.app_state().item_defaults.style.clone();
        self.history.record(self.store.content());
        let id = self.store.append(element);
        self.store.select(BTreeSet::from([id.clone()]));
        id
    }

    fn create_text(&mut self, at: Point, text: String) {
        let defaults = self.store.app_state().item_defaults.clone();
        let mut element = Element::text(at.x, at.y, text, defaults.font_size);
        element.style = defaults.style;

        let container = self
            .store
            .scene()
            .hit_test(at)
            .filter(|el| matches!(el.kind, ElementKind::Shape(_)))
            .cloned();

        self.history.record(self.store.content());
        let id = element.id.clone();
        match container {
            Some(mut container) => {
                if let ElementKind::Text(data) = &mut element.kind {
                    data.container_id = Some(container.id.clone());
                }
                let bounds = container.bounds();
                element.x = bounds.min_x + (bounds.width() - element.width) / 2.0;
                element.y = bounds.min_y + (bounds.height() - element.height) / 2.0;
                container.bound_elements.push(BoundElement { id: id.clone(), kind: "text".into() });
                self.store.upsert_elements(vec![container, element]);
            }
            None => {
                self.store.append(element);
            }
        }
        self.store.select(BTreeSet::from([id]));
    }

    fn erase_at(&mut self, at: Point) {
        let Some(hit) = self.store.scene().hit_test(at).map(|el| el.id.clone()) else {
            return;
        };
        let mut doomed = BTreeSet::from([hit.clone()]);
        doomed.extend(self.store.scene().bound_text(&hit).map(|el| el.id.clone()));
        self.history.record(self.store.content());
        self.store.tombstone(&doomed);
    }

    fn reorder(&mut self, to_front: bool) -> bool {
        let selection = self.store.selection().clone();
        if selection.is_empty() {
            return false;
        }
        self.history.record(self.store.content());
        let moved = if to_front {
            self.store.bring_to_front(&selection)
        } else {
            self.store.send_to_back(&selection)
        };
        if !moved {
            self.history.rollback(&mut self.store);
        }
        moved
    }

    fn observe(&mut self, f: impl FnOnce(&mut Self) -> CanvasResponse) -> CanvasResponse {
        let version = self.store.current_version();
        let selection = self.store.selection().clone();
        let mut response = f(self);
        response.scene_changed |= self.store.current_version() != version;
        response.selection_changed |= *self.store.selection() != selection;
        response
    }
}

fn last_point(element: &Element) -> Option<Point> {
    let points = match &element.kind {
        ElementKind::Linear(linear) => &linear.points,
        ElementKind::Freedraw(freedraw) => &freedraw.points,
        _ => return None,
    };
    points.last().map(|p| Point::new(element.x + p.x, element.y + p.y))
}
