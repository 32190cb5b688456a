// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor plus session on one thread.
//!
//! A [`Workbench`] forwards input to its [`CanvasEditor`], feeds content changes into the
//! session's autosave and runs persistence as local tasks whose completions are queued and
//! applied by [`Workbench::pump`]. Methods that start persistence work must be called inside a
//! [`tokio::task::LocalSet`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::canvas::{CanvasEditor, CanvasResponse, Command, PointerEvent};
use crate::gateway::{GatewayError, PersistenceGateway};
use crate::model::{SceneId, SceneInfo, ScenePayload};
use crate::session::{EditSession, SaveOutcome};

const MAX_NOTICES: usize = 8;

#[derive(Debug)]
enum Completion {
    Saved(Result<SaveOutcome, GatewayError>),
    Loaded(Option<ScenePayload>),
    Listed(Vec<SceneInfo>),
    Deleted(Result<bool, GatewayError>),
    Imported(Result<SceneId, GatewayError>),
}

/// One-line status for hosts to show. Failures arrive through the session's error handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved(SceneId),
    Imported(SceneId),
    Failed(String),
}

pub struct Workbench<G> {
    session: Rc<EditSession<G>>,
    editor: CanvasEditor,
    scenes: Vec<SceneInfo>,
    notices: Rc<RefCell<VecDeque<Notice>>>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    pending: usize,
}

impl<G> std::fmt::Debug for Workbench<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("session", &self.session)
            .field("editor", &self.editor)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<G: PersistenceGateway + 'static> Workbench<G> {
    pub fn new(session: EditSession<G>, editor: CanvasEditor) -> Self {
        let notices = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&notices);
        session.set_error_handler(move |err: &GatewayError| {
            push_notice(&sink, Notice::Failed(err.to_string()));
        });
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Rc::new(session),
            editor,
            scenes: Vec::new(),
            notices,
            tx,
            rx,
            pending: 0,
        }
    }

    pub fn editor(&self) -> &CanvasEditor {
        &self.editor
    }

    pub fn session(&self) -> &EditSession<G> {
        &self.session
    }

    /// Scene list from the last [`refresh_scenes`](Self::refresh_scenes).
    pub fn scenes(&self) -> &[SceneInfo] {
        &self.scenes
    }

    /// Number of persistence tasks whose completion has not been applied yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_dirty(&self) -> bool {
        let version = self.editor.store().current_version();
        match self.session.scene_id() {
            Some(_) => self.session.is_dirty(version),
            None => self.editor.scene().live_count() > 0,
        }
    }

    pub fn latest_notice(&self) -> Option<Notice> {
        self.notices.borrow().back().cloned()
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> CanvasResponse {
        let response = self.editor.handle_pointer(event);
        self.after_edit(&response, now);
        response
    }

    pub fn handle_command(&mut self, command: Command, now: Instant) -> CanvasResponse {
        match command {
            Command::Save => {
                self.request_save();
                CanvasResponse::default()
            }
            Command::NewScene => {
                self.new_scene();
                CanvasResponse { scene_changed: true, ..CanvasResponse::default() }
            }
            Command::Undo | Command::Redo if self.session.is_loading() => {
                tracing::debug!(?command, "history blocked while loading");
                CanvasResponse::default()
            }
            command => {
                let response = self.editor.handle_command(command);
                self.after_edit(&response, now);
                response
            }
        }
    }

    pub fn submit_text(&mut self, text: Option<String>, now: Instant) -> CanvasResponse {
        let response = self.editor.submit_text(text);
        self.after_edit(&response, now);
        response
    }

    /// Starts an empty, unsaved scene.
    pub fn new_scene(&mut self) {
        self.editor.reset();
        self.session.new_scene();
    }

    /// Saves the current scene in the background.
    pub fn request_save(&mut self) {
        let session = Rc::clone(&self.session);
        let scene = self.editor.scene().clone();
        self.spawn(async move { Completion::Saved(session.save_scene(&scene).await) });
    }

    /// Loads `scene_id` in the background; the editor switches once it arrives.
    pub fn open_scene(&mut self, scene_id: SceneId) {
        let session = Rc::clone(&self.session);
        self.spawn(async move { Completion::Loaded(session.load_scene(&scene_id).await) });
    }

    pub fn refresh_scenes(&mut self) {
        let session = Rc::clone(&self.session);
        self.spawn(async move { Completion::Listed(session.list_scenes().await) });
    }

    pub fn delete_scene(&mut self, scene_id: SceneId) {
        let session = Rc::clone(&self.session);
        self.spawn(async move { Completion::Deleted(session.delete_scene(&scene_id).await) });
    }

    pub fn import_scene(&mut self, json: String) {
        let session = Rc::clone(&self.session);
        self.spawn(async move { Completion::Imported(session.import_scene(&json).await) });
    }

    /// Applies finished persistence work and starts a due autosave. Returns whether anything
    /// visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let changed = self.pump();
        if self.session.autosave_due(now) {
            self.request_save();
        }
        changed
    }

    /// Applies every completion that is already queued.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            changed |= self.apply(completion);
        }
        changed
    }

    /// Waits for every outstanding task and applies its completion.
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            match self.rx.recv().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
    }

    /// Settles outstanding work, then saves unsaved content directly.
    pub async fn flush(&mut self) -> Result<(), GatewayError> {
        self.settle().await;
        if !self.is_dirty() {
            return Ok(());
        }
        let scene = self.editor.scene().clone();
        match self.session.save_scene(&scene).await? {
            SaveOutcome::Saved(scene_id) => {
                push_notice(&self.notices, Notice::Saved(scene_id));
            }
            SaveOutcome::Deferred(hazard) | SaveOutcome::Detached(_, hazard) => {
                tracing::debug!(%hazard, "final save not adopted");
            }
        }
        Ok(())
    }

    fn after_edit(&mut self, response: &CanvasResponse, now: Instant) {
        if response.scene_changed {
            self.session.note_change(self.editor.store().current_version(), now);
        }
    }

    fn spawn(&mut self, task: impl std::future::Future<Output = Completion> + 'static) {
        let tx = self.tx.clone();
        self.pending += 1;
        tokio::task::spawn_local(async move {
            let _ = tx.send(task.await);
        });
    }

    fn apply(&mut self, completion: Completion) -> bool {
        self.pending = self.pending.saturating_sub(1);
        match completion {
            Completion::Saved(Ok(SaveOutcome::Saved(scene_id))) => {
                push_notice(&self.notices, Notice::Saved(scene_id));
                true
            }
            Completion::Saved(Ok(SaveOutcome::Deferred(_) | SaveOutcome::Detached(..)))
            | Completion::Saved(Err(_)) => false,
            Completion::Loaded(Some(payload)) => {
                self.editor.load(payload.scene);
                true
            }
            Completion::Loaded(None) => false,
            Completion::Listed(scenes) => {
                self.scenes = scenes;
                true
            }
            Completion::Deleted(Ok(was_active)) => {
                self.scenes = self.session.cached_scenes();
                if was_active {
                    self.editor.reset();
                }
                true
            }
            Completion::Deleted(Err(_)) => false,
            Completion::Imported(Ok(scene_id)) => {
                push_notice(&self.notices, Notice::Imported(scene_id));
                self.refresh_scenes();
                true
            }
            Completion::Imported(Err(_)) => false,
        }
    }
}

fn push_notice(notices: &RefCell<VecDeque<Notice>>, notice: Notice) {
    let mut notices = notices.borrow_mut();
    if notices.len() == MAX_NOTICES {
        notices.pop_front();
    }
    notices.push_back(notice);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use tokio::sync::oneshot;
    use tokio::task::LocalSet;

    use super::{Notice, Workbench};
    use crate::canvas::{CanvasEditor, Command, DetachedWindow, Modifiers, PointerEvent};
    use crate::config::{EditorConfig, SessionConfig};
    use crate::gateway::{GatewayFuture, MemoryGateway, PersistenceGateway};
    use crate::model::{ContextId, Point, SceneId, SceneInfo, ScenePayload, Tool};
    use crate::session::EditSession;

    fn workbench<G: PersistenceGateway + 'static>(gateway: G, autosave: bool) -> Workbench<G> {
        let config = SessionConfig {
            autosave,
            autosave_quiet_period: Duration::from_secs(2),
            ..SessionConfig::default()
        };
        let session = EditSession::new(gateway, ContextId::new("conv-1").unwrap(), config);
        let editor =
            CanvasEditor::new(EditorConfig::default(), Box::new(DetachedWindow::default()));
        Workbench::new(session, editor)
    }

    fn draw_rectangle<G>(bench: &mut Workbench<G>, at: Point, now: Instant)
    where
        G: PersistenceGateway + 'static,
    {
        bench.handle_command(Command::SetTool(Tool::Rectangle), now);
        bench.handle_pointer(PointerEvent::Down { at, modifiers: Modifiers::NONE }, now);
        bench.handle_pointer(PointerEvent::Up { at }, now);
    }

    #[tokio::test]
    async fn explicit_save_persists_and_notices() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(MemoryGateway::new());
                let mut bench = workbench(Rc::clone(&gateway), false);
                let now = Instant::now();
                draw_rectangle(&mut bench, Point::new(0.0, 0.0), now);
                assert!(bench.is_dirty());

                bench.handle_command(Command::Save, now);
                assert_eq!(bench.pending(), 1);
                bench.settle().await;

                let scene_id = bench.session().scene_id().unwrap();
                assert!(gateway.contains(&scene_id));
                assert_eq!(bench.latest_notice(), Some(Notice::Saved(scene_id)));
                assert!(!bench.is_dirty());
            })
            .await;
    }

    #[tokio::test]
    async fn autosave_fires_after_the_quiet_period() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(MemoryGateway::new());
                let mut bench = workbench(Rc::clone(&gateway), true);
                let start = Instant::now();
                draw_rectangle(&mut bench, Point::new(10.0, 10.0), start);

                bench.tick(start + Duration::from_secs(1));
                assert_eq!(bench.pending(), 0);
                bench.tick(start + Duration::from_secs(2));
                assert_eq!(bench.pending(), 1);
                bench.settle().await;
                assert_eq!(gateway.len(), 1);
            })
            .await;
    }

    #[tokio::test]
    async fn opening_a_scene_replaces_the_editor_content() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(MemoryGateway::new());
                let mut bench = workbench(Rc::clone(&gateway), false);
                let now = Instant::now();
                draw_rectangle(&mut bench, Point::new(0.0, 0.0), now);
                bench.request_save();
                bench.settle().await;
                let saved = bench.session().scene_id().unwrap();

                bench.new_scene();
                assert_eq!(bench.editor().scene().live_count(), 0);
                assert_eq!(bench.session().scene_id(), None);

                bench.open_scene(saved.clone());
                bench.settle().await;
                assert_eq!(bench.editor().scene().live_count(), 1);
                assert_eq!(bench.session().scene_id(), Some(saved));
                assert!(!bench.editor().history().has_undo());
            })
            .await;
    }

    /// Memory gateway whose next load waits for a release signal.
    #[derive(Default)]
    struct HeldLoads {
        inner: MemoryGateway,
        hold: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl HeldLoads {
        fn hold_next_load(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.hold.borrow_mut() = Some(rx);
            tx
        }
    }

    impl PersistenceGateway for HeldLoads {
        fn save<'a>(
            &'a self,
            context_id: &'a ContextId,
            scene_id: Option<&'a SceneId>,
            payload: &'a ScenePayload,
        ) -> GatewayFuture<'a, SceneId> {
            self.inner.save(context_id, scene_id, payload)
        }

        fn load<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ScenePayload> {
            let hold = self.hold.borrow_mut().take();
            Box::pin(async move {
                if let Some(hold) = hold {
                    let _ = hold.await;
                }
                self.inner.load(scene_id).await
            })
        }

        fn list<'a>(&'a self, context_id: &'a ContextId) -> GatewayFuture<'a, Vec<SceneInfo>> {
            self.inner.list(context_id)
        }

        fn delete<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ()> {
            self.inner.delete(scene_id)
        }

        fn export<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, String> {
            self.inner.export(scene_id)
        }

        fn import<'a>(
            &'a self,
            context_id: &'a ContextId,
            json: &'a str,
        ) -> GatewayFuture<'a, SceneId> {
            self.inner.import(context_id, json)
        }
    }

    #[tokio::test]
    async fn history_is_blocked_while_loading() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(HeldLoads::default());
                let mut bench = workbench(Rc::clone(&gateway), false);
                let now = Instant::now();
                draw_rectangle(&mut bench, Point::new(0.0, 0.0), now);
                bench.request_save();
                bench.settle().await;
                let saved = bench.session().scene_id().unwrap();
                draw_rectangle(&mut bench, Point::new(300.0, 0.0), now);
                assert_eq!(bench.editor().scene().live_count(), 2);

                let release = gateway.hold_next_load();
                bench.open_scene(saved);
                tokio::task::yield_now().await;
                assert!(bench.session().is_loading());

                bench.handle_command(Command::Undo, now);
                assert_eq!(bench.editor().scene().live_count(), 2);
                assert!(bench.editor().history().has_undo());

                release.send(()).unwrap();
                bench.settle().await;
                assert!(!bench.session().is_loading());
                assert_eq!(bench.editor().scene().live_count(), 1);
                assert!(!bench.editor().history().has_undo());
            })
            .await;
    }

    #[tokio::test]
    async fn deleting_the_active_scene_clears_the_editor() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(MemoryGateway::new());
                let mut bench = workbench(Rc::clone(&gateway), false);
                let now = Instant::now();
                draw_rectangle(&mut bench, Point::new(0.0, 0.0), now);
                bench.request_save();
                bench.settle().await;
                bench.refresh_scenes();
                bench.settle().await;
                assert_eq!(bench.scenes().len(), 1);

                let saved = bench.session().scene_id().unwrap();
                bench.delete_scene(saved);
                bench.settle().await;
                assert!(bench.scenes().is_empty());
                assert_eq!(bench.editor().scene().live_count(), 0);
                assert_eq!(bench.session().scene_id(), None);
            })
            .await;
    }

    #[tokio::test]
    async fn failures_become_notices() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(MemoryGateway::new());
                let mut bench = workbench(Rc::clone(&gateway), false);
                bench.import_scene("{}".to_owned());
                bench.settle().await;
                let notices = bench.take_notices();
                assert_eq!(notices.len(), 1);
                assert!(matches!(&notices[0], Notice::Failed(message) if message.contains("type")));
                assert!(gateway.is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn import_refreshes_the_scene_list() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(MemoryGateway::new());
                let mut bench = workbench(Rc::clone(&gateway), false);
                let now = Instant::now();
                draw_rectangle(&mut bench, Point::new(0.0, 0.0), now);
                bench.request_save();
                bench.settle().await;
                let saved = bench.session().scene_id().unwrap();
                let json = gateway.export(&saved).await.unwrap();

                bench.import_scene(json);
                bench.settle().await;
                assert_eq!(bench.scenes().len(), 2);
                assert!(matches!(bench.latest_notice(), Some(Notice::Imported(_))));
            })
            .await;
    }

    #[tokio::test]
    async fn flush_saves_unsaved_content() {
        LocalSet::new()
            .run_until(async {
                let gateway = Rc::new(MemoryGateway::new());
                let mut bench = workbench(Rc::clone(&gateway), false);
                bench.flush().await.unwrap();
                assert!(gateway.is_empty());

                draw_rectangle(&mut bench, Point::new(0.0, 0.0), Instant::now());
                bench.flush().await.unwrap();
                assert_eq!(gateway.len(), 1);
                assert!(!bench.is_dirty());
            })
            .await;
    }
}
