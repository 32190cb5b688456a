// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{GatewayError, GatewayFuture, PersistenceGateway};
use crate::model::{ContextId, SceneId, SceneInfo, ScenePayload};
use crate::store::SceneFolder;

/// [`PersistenceGateway`] over a [`SceneFolder`]. File I/O completes inside the returned future.
#[derive(Debug, Clone)]
pub struct FolderGateway {
    folder: SceneFolder,
}

impl FolderGateway {
    pub fn new(folder: SceneFolder) -> Self {
        Self { folder }
    }

    pub fn folder(&self) -> &SceneFolder {
        &self.folder
    }
}

impl PersistenceGateway for FolderGateway {
    fn save<'a>(
        &'a self,
        context_id: &'a ContextId,
        scene_id: Option<&'a SceneId>,
        payload: &'a ScenePayload,
    ) -> GatewayFuture<'a, SceneId> {
        Box::pin(async move {
            self.folder.save_scene(context_id, scene_id, payload).map_err(GatewayError::from)
        })
    }

    fn load<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ScenePayload> {
        Box::pin(async move { self.folder.load_scene(scene_id).map_err(GatewayError::from) })
    }

    fn list<'a>(&'a self, context_id: &'a ContextId) -> GatewayFuture<'a, Vec<SceneInfo>> {
        Box::pin(async move { self.folder.list_scenes(context_id).map_err(GatewayError::from) })
    }

    fn delete<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ()> {
        Box::pin(async move { self.folder.delete_scene(scene_id).map_err(GatewayError::from) })
    }

    fn export<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, String> {
        Box::pin(async move { self.folder.export_scene(scene_id).map_err(GatewayError::from) })
    }

    fn import<'a>(
        &'a self,
        context_id: &'a ContextId,
        json: &'a str,
    ) -> GatewayFuture<'a, SceneId> {
        Box::pin(async move {
            self.folder.import_scene(context_id, json).map_err(GatewayError::from)
        })
    }
}
