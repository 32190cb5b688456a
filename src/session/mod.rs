// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Edit session controller.
//!
//! An [`EditSession`] binds one context to a [`PersistenceGateway`] and tracks the identity and
//! persistence state of the scene being edited: which scene id it is saved under, whether a
//! save or load is in flight, and when content last changed (for autosave).
//!
//! All methods take `&self`; state lives in a `RefCell` that is never borrowed across an
//! `.await`, so a session can be shared through `Rc` between tasks on one thread.
//!
//! Concurrent saves: a save requested while another is in flight is not started. It returns
//! [`SaveOutcome::Deferred`] and, once the running save finishes, the autosave debouncer is
//! armed to fire immediately so the latest content is written next.
//!
//! Scene switches: `new_scene`, a completed `load_scene` and deleting the active scene bump an
//! identity generation. A save that finishes under an older generation does not re-adopt its
//! scene id, and a scene deleted while the save ran is deleted again.

mod debounce;

use std::cell::RefCell;
use std::fmt;
use std::time::Instant;

use crate::config::SessionConfig;
use crate::gateway::{GatewayError, PersistenceGateway};
use crate::model::{unix_millis, ContextId, Scene, SceneId, SceneInfo, ScenePayload};

pub use debounce::Debouncer;

/// A request that could not run as asked. Advisory, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyHazard {
    /// A save was requested while another save was running.
    SaveInFlight,
    /// A load finished after a newer load had started; its result was dropped.
    LoadSuperseded,
    /// A save finished after the session switched to another scene.
    SceneSwitched,
}

impl fmt::Display for ConcurrencyHazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SaveInFlight => f.write_str("save already in flight"),
            Self::LoadSuperseded => f.write_str("load superseded by a newer load"),
            Self::SceneSwitched => f.write_str("session switched scenes during the save"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SceneId),
    Deferred(ConcurrencyHazard),
    /// The write landed under this id but the session had moved on and did not adopt it.
    Detached(SceneId, ConcurrencyHazard),
}

type ErrorHandler = Box<dyn Fn(&GatewayError)>;

#[derive(Debug)]
struct SessionState {
    scene_id: Option<SceneId>,
    last_saved_at: Option<u64>,
    /// Scene version of the content last saved or loaded.
    saved_version: Option<u64>,
    is_saving: bool,
    is_loading: bool,
    load_generation: u64,
    /// Bumped whenever the session switches to a different scene identity.
    identity_generation: u64,
    /// Scenes deleted while a save was in flight.
    deleted_during_save: Vec<SceneId>,
    resave_requested: bool,
    scenes: Vec<SceneInfo>,
    autosave: Debouncer,
}

pub struct EditSession<G> {
    gateway: G,
    context_id: ContextId,
    config: SessionConfig,
    state: RefCell<SessionState>,
    on_error: RefCell<Option<ErrorHandler>>,
}

impl<G> fmt::Debug for EditSession<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("context_id", &self.context_id)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<G: PersistenceGateway> EditSession<G> {
    pub fn new(gateway: G, context_id: ContextId, config: SessionConfig) -> Self {
        let autosave = Debouncer::new(config.autosave_quiet_period);
        Self {
            gateway,
            context_id,
            config,
            state: RefCell::new(SessionState {
                scene_id: None,
                last_saved_at: None,
                saved_version: None,
                is_saving: false,
                is_loading: false,
                load_generation: 0,
                identity_generation: 0,
                deleted_during_save: Vec::new(),
                resave_requested: false,
                scenes: Vec::new(),
                autosave,
            }),
            on_error: RefCell::new(None),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn context_id(&self) -> &ContextId {
        &self.context_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Installs the callback invoked once per failed gateway operation.
    pub fn set_error_handler(&self, handler: impl Fn(&GatewayError) + 'static) {
        *self.on_error.borrow_mut() = Some(Box::new(handler));
    }

    pub fn scene_id(&self) -> Option<SceneId> {
        self.state.borrow().scene_id.clone()
    }

    pub fn last_saved_at(&self) -> Option<u64> {
        self.state.borrow().last_saved_at
    }

    pub fn is_saving(&self) -> bool {
        self.state.borrow().is_saving
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Scene list as of the last successful [`list_scenes`](Self::list_scenes).
    pub fn cached_scenes(&self) -> Vec<SceneInfo> {
        self.state.borrow().scenes.clone()
    }

    /// Whether `version` differs from what was last saved or loaded.
    pub fn is_dirty(&self, version: u64) -> bool {
        self.state.borrow().saved_version != Some(version)
    }

    /// Saves `scene` under the current scene id (minting one on first save).
    ///
    /// Failures are reported to the error handler and returned; the in-memory scene is
    /// untouched either way.
    pub async fn save_scene(&self, scene: &Scene) -> Result<SaveOutcome, GatewayError> {
        let (scene_id, identity) = {
            let mut state = self.state.borrow_mut();
            if state.is_saving {
                state.resave_requested = true;
                let hazard = ConcurrencyHazard::SaveInFlight;
                tracing::debug!(%hazard, "save deferred");
                return Ok(SaveOutcome::Deferred(hazard));
            }
            state.is_saving = true;
            state.autosave.cancel();
            (state.scene_id.clone(), state.identity_generation)
        };
        let _guard = SaveGuard { state: &self.state };

        let version = scene.version();
        let payload = ScenePayload::new(scene.clone(), self.config.source.clone());
        let result = self.gateway.save(&self.context_id, scene_id.as_ref(), &payload).await;

        let mut state = self.state.borrow_mut();
        state.is_saving = false;
        let deleted = std::mem::take(&mut state.deleted_during_save);
        if std::mem::take(&mut state.resave_requested) {
            state.autosave.arm_immediately(Instant::now());
        }
        match result {
            Ok(saved_id) if state.identity_generation != identity => {
                drop(state);
                let hazard = ConcurrencyHazard::SceneSwitched;
                tracing::warn!(scene_id = %saved_id, %hazard, "late save not adopted");
                if deleted.contains(&saved_id) {
                    if let Err(err) = self.gateway.delete(&saved_id).await {
                        self.report("delete", &err);
                    }
                }
                Ok(SaveOutcome::Detached(saved_id, hazard))
            }
            Ok(saved_id) => {
                tracing::info!(
                    scene_id = %saved_id,
                    elements = scene.live_count(),
                    "scene saved"
                );
                state.scene_id = Some(saved_id.clone());
                state.last_saved_at = Some(unix_millis());
                state.saved_version = Some(version);
                Ok(SaveOutcome::Saved(saved_id))
            }
            Err(err) => {
                drop(state);
                self.report("save", &err);
                Err(err)
            }
        }
    }

    /// Loads `scene_id` and makes it the session's scene.
    ///
    /// Returns `None` when the load fails (reported) or when a newer load started meanwhile.
    pub async fn load_scene(&self, scene_id: &SceneId) -> Option<ScenePayload> {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.load_generation += 1;
            state.is_loading = true;
            state.load_generation
        };
        let _guard = LoadGuard { state: &self.state, generation };

        let result = self.gateway.load(scene_id).await;

        let mut state = self.state.borrow_mut();
        if state.load_generation != generation {
            let hazard = ConcurrencyHazard::LoadSuperseded;
            tracing::debug!(scene_id = %scene_id, %hazard, "load discarded");
            return None;
        }
        state.is_loading = false;
        match result {
            Ok(payload) => {
                state.identity_generation += 1;
                state.scene_id = Some(scene_id.clone());
                state.saved_version = Some(payload.scene.version());
                state.autosave.cancel();
                state.resave_requested = false;
                Some(payload)
            }
            Err(err) => {
                drop(state);
                self.report("load", &err);
                None
            }
        }
    }

    /// Scenes of this session's context, most recent first. Failures are reported and yield
    /// an empty list.
    pub async fn list_scenes(&self) -> Vec<SceneInfo> {
        match self.gateway.list(&self.context_id).await {
            Ok(scenes) => {
                self.state.borrow_mut().scenes = scenes.clone();
                scenes
            }
            Err(err) => {
                self.report("list", &err);
                Vec::new()
            }
        }
    }

    /// Deletes `scene_id`. Returns whether it was the active scene; the session then detaches
    /// from it and the caller is expected to clear the editor.
    pub async fn delete_scene(&self, scene_id: &SceneId) -> Result<bool, GatewayError> {
        if let Err(err) = self.gateway.delete(scene_id).await {
            self.report("delete", &err);
            return Err(err);
        }
        let mut state = self.state.borrow_mut();
        state.scenes.retain(|info| &info.scene_id != scene_id);
        if state.is_saving {
            state.deleted_during_save.push(scene_id.clone());
        }
        let was_active = state.scene_id.as_ref() == Some(scene_id);
        if was_active {
            state.identity_generation += 1;
            state.scene_id = None;
            state.saved_version = None;
            state.autosave.cancel();
        }
        Ok(was_active)
    }

    pub async fn export_scene(&self, scene_id: &SceneId) -> Result<String, GatewayError> {
        self.gateway.export(scene_id).await.map_err(|err| {
            self.report("export", &err);
            err
        })
    }

    /// Validates and stores `json` as a new scene of this context. Does not switch to it.
    pub async fn import_scene(&self, json: &str) -> Result<SceneId, GatewayError> {
        match self.gateway.import(&self.context_id, json).await {
            Ok(scene_id) => {
                tracing::info!(scene_id = %scene_id, "scene imported");
                Ok(scene_id)
            }
            Err(err) => {
                self.report("import", &err);
                Err(err)
            }
        }
    }

    /// Detaches from the current scene; the next save mints a new id.
    pub fn new_scene(&self) {
        let mut state = self.state.borrow_mut();
        state.identity_generation += 1;
        state.scene_id = None;
        state.saved_version = None;
        state.last_saved_at = None;
        state.resave_requested = false;
        state.autosave.cancel();
    }

    /// Notes a content change at `now`. Arms autosave unless the content is back to what was
    /// last saved.
    pub fn note_change(&self, version: u64, now: Instant) {
        if !self.config.autosave {
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.saved_version == Some(version) {
            state.autosave.cancel();
        } else {
            state.autosave.arm(now);
        }
    }

    /// Whether an autosave (or a deferred save) should run now. Fires once per arming.
    pub fn autosave_due(&self, now: Instant) -> bool {
        let mut state = self.state.borrow_mut();
        !state.is_saving && state.autosave.poll(now)
    }

    pub fn next_autosave_at(&self) -> Option<Instant> {
        self.state.borrow().autosave.deadline()
    }

    fn report(&self, operation: &'static str, err: &GatewayError) {
        tracing::warn!(operation, error = %err, "gateway operation failed");
        if let Some(handler) = self.on_error.borrow().as_ref() {
            handler(err);
        }
    }
}

/// Clears `is_saving` when the save future completes or is dropped.
struct SaveGuard<'a> {
    state: &'a RefCell<SessionState>,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.is_saving = false;
        }
    }
}

/// Clears `is_loading` unless a newer load owns the flag.
struct LoadGuard<'a> {
    state: &'a RefCell<SessionState>,
    generation: u64,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if state.load_generation == self.generation {
                state.is_loading = false;
            }
        }
    }
}
