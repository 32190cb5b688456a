// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence gateway: the asynchronous boundary between an edit session and scene storage.
//!
//! Everything runs on one thread, so futures are boxed without a `Send` bound.

mod folder;
mod memory;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::format::ValidationError;
use crate::model::{ContextId, SceneId, SceneInfo, ScenePayload};
use crate::store::StoreError;

pub use folder::FolderGateway;
pub use memory::MemoryGateway;

pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    NotFound { scene_id: SceneId },
    Persistence { message: String },
    Validation(ValidationError),
}

impl GatewayError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence { message: message.into() }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { scene_id } => write!(f, "scene not found: {scene_id}"),
            Self::Persistence { message } => write!(f, "persistence failed: {message}"),
            Self::Validation(err) => write!(f, "invalid scene document: {err}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } | Self::Persistence { .. } => None,
        }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { scene_id } => Self::NotFound { scene_id },
            StoreError::Wire { source, .. } => Self::Validation(source),
            other => Self::Persistence { message: other.to_string() },
        }
    }
}

/// Scene storage as seen by an edit session.
///
/// `save` with `scene_id: None` mints a new id; with `Some` it overwrites that scene.
/// `list` returns the context's scenes, most recently updated first.
pub trait PersistenceGateway {
    fn save<'a>(
        &'a self,
        context_id: &'a ContextId,
        scene_id: Option<&'a SceneId>,
        payload: &'a ScenePayload,
    ) -> GatewayFuture<'a, SceneId>;

    fn load<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ScenePayload>;

    fn list<'a>(&'a self, context_id: &'a ContextId) -> GatewayFuture<'a, Vec<SceneInfo>>;

    fn delete<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ()>;

    /// The stored wire document for `scene_id`.
    fn export<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, String>;

    /// Validates `json` and stores it as a new scene.
    fn import<'a>(&'a self, context_id: &'a ContextId, json: &'a str)
        -> GatewayFuture<'a, SceneId>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for std::rc::Rc<G> {
    fn save<'a>(
        &'a self,
        context_id: &'a ContextId,
        scene_id: Option<&'a SceneId>,
        payload: &'a ScenePayload,
    ) -> GatewayFuture<'a, SceneId> {
        (**self).save(context_id, scene_id, payload)
    }

    fn load<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ScenePayload> {
        (**self).load(scene_id)
    }

    fn list<'a>(&'a self, context_id: &'a ContextId) -> GatewayFuture<'a, Vec<SceneInfo>> {
        (**self).list(context_id)
    }

    fn delete<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, ()> {
        (**self).delete(scene_id)
    }

    fn export<'a>(&'a self, scene_id: &'a SceneId) -> GatewayFuture<'a, String> {
        (**self).export(scene_id)
    }

    fn import<'a>(
        &'a self,
        context_id: &'a ContextId,
        json: &'a str,
    ) -> GatewayFuture<'a, SceneId> {
        (**self).import(context_id, json)
    }
}

#[cfg(test)]
mod tests;
