// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::app_state::AppState;
use super::element::{Element, ElementKind, Point};
use super::ids::{ContextId, ElementId, FileId, SceneId};

/// Current wire schema version written by exports.
pub const WIRE_VERSION: u32 = 2;
/// Wire `type` tag written by exports.
pub const WIRE_TYPE: &str = "excalidraw_scene";

/// `source` written into documents created by import.
pub const IMPORT_SOURCE: &str = "scenepad";

/// Metadata for a binary asset referenced by image elements.
#[derive(Debug, Clone, PartialEq)]
pub struct FileData {
    pub id: FileId,
    pub mime_type: String,
    pub data_url: String,
    pub created: u64,
    pub last_retrieved: Option<u64>,
    pub extra: Map<String, Value>,
}

/// The undoable part of a scene: paint-ordered elements plus attached assets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneContent {
    pub elements: Vec<Element>,
    pub files: BTreeMap<FileId, FileData>,
}

/// One diagram: ordered elements, view/tool state and assets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub elements: Vec<Element>,
    pub app_state: AppState,
    pub files: BTreeMap<FileId, FileData>,
}

impl Scene {
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| &el.id == id)
    }

    /// Elements that are not tombstoned, in paint order.
    pub fn live_elements(&self) -> impl DoubleEndedIterator<Item = &Element> + '_ {
        self.elements.iter().filter(|el| !el.is_deleted())
    }

    pub fn live_count(&self) -> usize {
        self.live_elements().count()
    }

    /// Topmost live, unlocked element whose bounds contain `at`.
    pub fn hit_test(&self, at: Point) -> Option<&Element> {
        self.live_elements().rev().find(|el| !el.locked && el.hit_test(at))
    }

    /// Live elements that name `frame_id` as their frame, in paint order.
    pub fn frame_children<'a>(
        &'a self,
        frame_id: &'a ElementId,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.live_elements().filter(move |el| el.frame_id.as_ref() == Some(frame_id))
    }

    /// Live text elements bound into `container_id`.
    pub fn bound_text<'a>(
        &'a self,
        container_id: &'a ElementId,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.live_elements().filter(move |el| match &el.kind {
            ElementKind::Text(text) => text.container_id.as_ref() == Some(container_id),
            _ => false,
        })
    }

    pub fn version(&self) -> u64 {
        scene_version(&self.elements)
    }

    pub fn content(&self) -> SceneContent {
        SceneContent { elements: self.elements.clone(), files: self.files.clone() }
    }
}

/// Sum of `version + version_nonce` over all elements (tombstones included).
///
/// A cheap change detector: equal sums do not prove equal scenes.
pub fn scene_version(elements: &[Element]) -> u64 {
    elements.iter().fold(0u64, |acc, el| {
        acc.wrapping_add(el.version()).wrapping_add(u64::from(el.version_nonce()))
    })
}

/// A scene as exchanged with persistence: the wire envelope around [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePayload {
    pub version: u32,
    pub source: String,
    pub scene: Scene,
    /// Envelope keys this model does not interpret; preserved on export.
    pub extra: Map<String, Value>,
}

impl ScenePayload {
    pub fn new(scene: Scene, source: impl Into<String>) -> Self {
        Self { version: WIRE_VERSION, source: source.into(), scene, extra: Map::new() }
    }

    /// Stamps an imported document with the current wire version and our own `source`.
    pub fn into_imported(mut self) -> Self {
        self.version = WIRE_VERSION;
        self.source = IMPORT_SOURCE.to_owned();
        self
    }
}

/// List-view projection of a stored scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInfo {
    pub scene_id: SceneId,
    pub context_id: Option<ContextId>,
    pub created_at: u64,
    pub updated_at: u64,
    pub element_count: usize,
    pub name: Option<String>,
}

impl SceneInfo {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or("Untitled scene")
    }
}
