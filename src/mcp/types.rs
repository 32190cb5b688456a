// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneSummary {
    pub scene_id: String,
    pub name: String,
    pub element_count: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SceneListParams {
    /// Optional fuzzy filter over scene names and ids.
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneListResponse {
    pub context_id: String,
    pub scenes: Vec<SceneSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneGetParams {
    pub scene_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneGetResponse {
    pub scene_id: String,
    pub version: u64,
    /// The stored wire document (`{ type, version, source, elements, appState, files }`).
    pub document: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneSaveParams {
    /// Existing scene to overwrite; a new id is minted when omitted.
    pub scene_id: Option<String>,
    pub document: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneSaveResponse {
    pub scene_id: String,
    pub version: u64,
    pub element_count: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneSaveImageParams {
    pub scene_id: String,
    /// PNG or JPEG bytes as raw base64 or a `data:image/png;base64,...` URL.
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportSummary {
    pub filename: String,
    pub path: String,
    pub size: u64,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneSaveImageResponse {
    pub scene_id: String,
    pub export: ExportSummary,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SceneListExportsParams {
    /// Limit the listing to one scene's images.
    pub scene_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneListExportsResponse {
    pub exports: Vec<ExportSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneImportParams {
    /// A scene document as JSON text.
    pub json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneImportResponse {
    pub scene_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneDeleteParams {
    pub scene_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneDeleteResponse {
    pub deleted_scene_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneRenderTextParams {
    pub scene_id: String,
    pub max_cols: Option<u64>,
    pub max_rows: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneRenderTextResponse {
    pub scene_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneSearchTextParams {
    pub scene_id: String,
    pub needle: String,
    /// `substring` (default) or `regex`.
    pub mode: Option<String>,
    pub case_insensitive: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextMatch {
    pub element_id: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneSearchTextResponse {
    pub scene_id: String,
    pub matches: Vec<TextMatch>,
}
