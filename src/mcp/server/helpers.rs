// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// MCP server helper functions: listing projection, store error mapping, and parameter parsing.
fn scene_summary(info: &SceneInfo) -> SceneSummary {
    SceneSummary {
        scene_id: info.scene_id.to_string(),
        name: info.display_name().to_owned(),
        element_count: info.element_count as u64,
        created_at: info.created_at,
        updated_at: info.updated_at,
    }
}

fn export_summary(info: &ExportInfo) -> ExportSummary {
    ExportSummary {
        filename: info.filename.clone(),
        path: info.path.display().to_string(),
        size: info.size,
        created_at: info.created_at,
    }
}

fn map_store_error(err: StoreError) -> ErrorData {
    match err {
        StoreError::NotFound { scene_id } => ErrorData::resource_not_found(
            "scene not found",
            Some(serde_json::json!({ "scene_id": scene_id.as_str() })),
        ),
        StoreError::Wire { source, .. } => ErrorData::invalid_params(
            format!("invalid scene document: {source}"),
            Some(serde_json::json!({ "path": source.path() })),
        ),
        err @ (StoreError::InvalidImage { .. } | StoreError::Base64 { .. }) => {
            ErrorData::invalid_params(err.to_string(), None)
        }
        other => {
            tracing::warn!(error = %other, "scene folder operation failed");
            ErrorData::internal_error(other.to_string(), None)
        }
    }
}

fn parse_scene_id(value: &str) -> Result<SceneId, ErrorData> {
    SceneId::new(value.to_owned()).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid scene_id: {err}"),
            Some(serde_json::json!({ "scene_id": value })),
        )
    })
}

fn parse_search_mode(value: Option<&str>) -> Result<TextSearchMode, ErrorData> {
    match value.map(str::trim) {
        None | Some("") | Some("substring") => Ok(TextSearchMode::Substring),
        Some("regex") => Ok(TextSearchMode::Regex),
        Some(other) => Err(ErrorData::invalid_params(
            "mode must be 'substring' or 'regex'",
            Some(serde_json::json!({ "mode": other })),
        )),
    }
}

fn render_limit(requested: Option<u64>, default: usize) -> usize {
    requested
        .map(|value| usize::try_from(value).unwrap_or(MAX_RENDER_CELLS))
        .unwrap_or(default)
        .clamp(1, MAX_RENDER_CELLS)
}
