// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{GatewayError, GatewayFuture, PersistenceGateway};
use crate::format::{parse_payload, to_json_string};
use crate::model::{unix_millis, ContextId, SceneId, SceneInfo, ScenePayload};

#[derive(Debug, Clone)]
struct StoredScene {
    context_id: ContextId,
    payload: ScenePayload,
    created_at: u64,
    updated_at: u64,
}

/// In-process gateway used by `--demo` and tests. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    scenes: RefCell<BTreeMap<SceneId, StoredScene>>,
    clock: Cell<u64>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scenes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.borrow().is_empty()
    }

    pub fn contains(&self, scene_id: &SceneId) -> bool {
        self.scenes.borrow().contains_key(scene_id)
    }

    /// Wall-clock millis, forced strictly increasing so list order is stable.
    fn tick(&self) -> u64 {
        let now = unix_millis().max(self.clock.get().saturating_add(1));
        self.clock.set(now);
        now
    }

    fn save_now(
        &self,
        context_id: &ContextId,
        scene_id: Option<&SceneId>,
        payload: &ScenePayload,
    ) -> SceneId {
        let scene_id =
            scene_id.cloned().unwrap_or_else(|| SceneId::random_with_prefix("excalidraw_"));
        let now = self.tick();
        let mut scenes = self.scenes.borrow_mut();
        let created_at = scenes.get(&scene_id).map_or(now, |stored| stored.created_at);
        scenes.insert(
            scene_id.clone(),
            StoredScene {
                context_id: context_id.clone(),
                payload: payload.clone(),
                created_at,
                updated_at: now,
            },
        );
        scene_id
    }

    fn with_scene<T>(
        &self,
        scene_id: &SceneId,
        f: impl FnOnce(&StoredScene) -> T,
    ) -> Result<T, GatewayError> {
        self.scenes
            .borrow()
            .get(scene_id)
            .map(f)
            .ok_or_else(|| GatewayError::NotFound { scene_id: scene_id.clone() })
    }
}

impl PersistenceGateway for MemoryGateway {
    fn save<'a>(
        &'a self,
        context_id: &'a ContextId,
        scene_id: Option<&'a SceneId>,
        payload: &'a ScenePayload,
    ) -> GatewayFuture<'a, SceneId> {
        Box::pin(async move { Ok(self.save_now(context_id, scene_id, payload)) })
    }

    fn load<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ScenePayload> {
        Box::pin(async move { self.with_scene(scene_id, |stored| stored.payload.clone()) })
    }

    fn list<'a>(&'a self, context_id: &'a ContextId) -> GatewayFuture<'a, Vec<SceneInfo>> {
        Box::pin(async move {
            let mut infos: Vec<SceneInfo> = self
                .scenes
                .borrow()
                .iter()
                .filter(|(_, stored)| &stored.context_id == context_id)
                .map(|(scene_id, stored)| SceneInfo {
                    scene_id: scene_id.clone(),
                    context_id: Some(stored.context_id.clone()),
                    created_at: stored.created_at,
                    updated_at: stored.updated_at,
                    element_count: stored.payload.scene.live_count(),
                    name: stored.payload.scene.app_state.name.clone(),
                })
                .collect();
            infos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(infos)
        })
    }

    fn delete<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            match self.scenes.borrow_mut().remove(scene_id) {
                Some(_) => Ok(()),
                None => Err(GatewayError::NotFound { scene_id: scene_id.clone() }),
            }
        })
    }

    fn export<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, String> {
        Box::pin(async move {
            self.with_scene(scene_id, |stored| to_json_string(&stored.payload))?
                .map_err(|err| GatewayError::persistence(err.to_string()))
        })
    }

    fn import<'a>(
        &'a self,
        context_id: &'a ContextId,
        json: &'a str,
    ) -> GatewayFuture<'a, SceneId> {
        Box::pin(async move {
            let payload = parse_payload(json)?.into_imported();
            Ok(self.save_now(context_id, None, &payload))
        })
    }
}
