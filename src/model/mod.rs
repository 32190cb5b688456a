// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A scene is an ordered list of elements (paint order) plus view/tool state and asset metadata.
//! Elements carry version bookkeeping so scenes can be compared cheaply.

pub mod app_state;
pub mod element;
pub mod fixtures;
pub mod ids;
pub mod scene;

use std::time::{SystemTime, UNIX_EPOCH};

pub use app_state::{AppState, AppStatePatch, ItemDefaults, Tool};
pub use element::{
    BoundElement, Bounds, Element, ElementKind, ElementPatch, ElementStyle, FillStyle,
    FrameData, FreedrawData, ImageData, ImageStatus, LinearData, Point, PointBinding, Roundness,
    ShapeKind, StrokeStyle, TextAlign, TextData, VerticalAlign, VersionStamp,
};
pub use fixtures::demo_scene;
pub use ids::{ContextId, ElementId, FileId, GroupId, Id, IdError, SceneId};
pub use scene::{
    scene_version, FileData, Scene, SceneContent, SceneInfo, ScenePayload, IMPORT_SOURCE,
    WIRE_TYPE, WIRE_VERSION,
};

/// Milliseconds since the Unix epoch (0 if the clock is before it).
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
