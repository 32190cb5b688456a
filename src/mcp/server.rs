// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};

use crate::format::{decode_payload, encode_payload};
use crate::model::{ContextId, SceneId, SceneInfo};
use crate::query::{rank_scenes, text_search, TextSearchMode};
use crate::render::render_scene_fitted;
use crate::store::{ExportInfo, SceneFolder, StoreError};

use super::types::*;

const DEFAULT_RENDER_COLS: usize = 100;
const DEFAULT_RENDER_ROWS: usize = 40;
const MAX_RENDER_CELLS: usize = 400;

/// MCP tool surface over the scenes of one context in a [`SceneFolder`].
#[derive(Clone)]
pub struct ScenepadMcp {
    folder: Arc<SceneFolder>,
    context_id: ContextId,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ScenepadMcp {
    pub fn new(folder: SceneFolder, context_id: ContextId) -> Self {
        Self { folder: Arc::new(folder), context_id, tool_router: Self::tool_router() }
    }

    pub fn folder(&self) -> &SceneFolder {
        &self.folder
    }

    pub fn context_id(&self) -> &ContextId {
        &self.context_id
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// List scenes of the current context, most recently updated first; pass `query` to
    /// fuzzy-filter by name or id. Continue with `scene.get` or `scene.render_text`.
    #[tool(name = "scene.list")]
    async fn scene_list(
        &self,
        params: Parameters<SceneListParams>,
    ) -> Result<Json<SceneListResponse>, ErrorData> {
        let scenes = self.folder.list_scenes(&self.context_id).map_err(map_store_error)?;
        let query = params.0.query.unwrap_or_default();
        let scenes = rank_scenes(&scenes, &query).into_iter().map(scene_summary).collect();

        Ok(Json(SceneListResponse { context_id: self.context_id.to_string(), scenes }))
    }

    /// Read a stored scene as its wire document.
    #[tool(name = "scene.get")]
    async fn scene_get(
        &self,
        params: Parameters<SceneGetParams>,
    ) -> Result<Json<SceneGetResponse>, ErrorData> {
        let scene_id = parse_scene_id(&params.0.scene_id)?;
        let payload = self.folder.load_scene(&scene_id).map_err(map_store_error)?;

        let document = encode_payload(&payload).map_err(|err| {
            ErrorData::internal_error(
                format!("failed to encode scene: {err}"),
                Some(serde_json::json!({ "scene_id": scene_id.as_str() })),
            )
        })?;

        Ok(Json(SceneGetResponse {
            scene_id: scene_id.to_string(),
            version: payload.scene.version(),
            document,
        }))
    }

    /// Store a wire document; overwrites `scene_id` when given, otherwise mints a new scene.
    #[tool(name = "scene.save")]
    async fn scene_save(
        &self,
        params: Parameters<SceneSaveParams>,
    ) -> Result<Json<SceneSaveResponse>, ErrorData> {
        let SceneSaveParams { scene_id, document } = params.0;
        let scene_id = scene_id.as_deref().map(parse_scene_id).transpose()?;
        let payload = decode_payload(&document).map_err(|err| {
            ErrorData::invalid_params(
                format!("invalid scene document: {err}"),
                Some(serde_json::json!({ "path": err.path() })),
            )
        })?;

        let saved = self
            .folder
            .save_scene(&self.context_id, scene_id.as_ref(), &payload)
            .map_err(map_store_error)?;
        tracing::info!(scene_id = %saved, tool = "scene.save", "scene written over mcp");

        Ok(Json(SceneSaveResponse {
            scene_id: saved.to_string(),
            version: payload.scene.version(),
            element_count: payload.scene.live_count() as u64,
        }))
    }

    /// Store a rendered PNG/JPEG of a scene in the exports folder.
    #[tool(name = "scene.save_image")]
    async fn scene_save_image(
        &self,
        params: Parameters<SceneSaveImageParams>,
    ) -> Result<Json<SceneSaveImageResponse>, ErrorData> {
        let SceneSaveImageParams { scene_id, data } = params.0;
        let scene_id = parse_scene_id(&scene_id)?;
        self.folder.load_scene(&scene_id).map_err(map_store_error)?;

        let export = self.folder.save_export_image(&scene_id, &data).map_err(map_store_error)?;
        tracing::info!(
            scene_id = %scene_id,
            filename = %export.filename,
            tool = "scene.save_image",
            "image exported over mcp"
        );

        Ok(Json(SceneSaveImageResponse {
            scene_id: scene_id.to_string(),
            export: export_summary(&export),
        }))
    }

    /// List exported images, newest first; pass `scene_id` to keep one scene's images.
    #[tool(name = "scene.list_exports")]
    async fn scene_list_exports(
        &self,
        params: Parameters<SceneListExportsParams>,
    ) -> Result<Json<SceneListExportsResponse>, ErrorData> {
        let scene_id = params.0.scene_id.as_deref().map(parse_scene_id).transpose()?;
        let exports = self.folder.list_exports(scene_id.as_ref()).map_err(map_store_error)?;

        Ok(Json(SceneListExportsResponse { exports: exports.iter().map(export_summary).collect() }))
    }

    /// Import scene JSON text (Excalidraw documents are accepted) under a fresh id.
    #[tool(name = "scene.import")]
    async fn scene_import(
        &self,
        params: Parameters<SceneImportParams>,
    ) -> Result<Json<SceneImportResponse>, ErrorData> {
        let scene_id =
            self.folder.import_scene(&self.context_id, &params.0.json).map_err(map_store_error)?;
        Ok(Json(SceneImportResponse { scene_id: scene_id.to_string() }))
    }

    /// Remove a stored scene.
    #[tool(name = "scene.delete")]
    async fn scene_delete(
        &self,
        params: Parameters<SceneDeleteParams>,
    ) -> Result<Json<SceneDeleteResponse>, ErrorData> {
        let scene_id = parse_scene_id(&params.0.scene_id)?;
        self.folder.delete_scene(&scene_id).map_err(map_store_error)?;
        tracing::info!(scene_id = %scene_id, tool = "scene.delete", "scene deleted over mcp");

        Ok(Json(SceneDeleteResponse { deleted_scene_id: scene_id.to_string() }))
    }

    /// Draw a scene as box-drawing text, cropped to its content.
    #[tool(name = "scene.render_text")]
    async fn scene_render_text(
        &self,
        params: Parameters<SceneRenderTextParams>,
    ) -> Result<Json<SceneRenderTextResponse>, ErrorData> {
        let SceneRenderTextParams { scene_id, max_cols, max_rows } = params.0;
        let scene_id = parse_scene_id(&scene_id)?;
        let payload = self.folder.load_scene(&scene_id).map_err(map_store_error)?;

        let cols = render_limit(max_cols, DEFAULT_RENDER_COLS);
        let rows = render_limit(max_rows, DEFAULT_RENDER_ROWS);
        let text = render_scene_fitted(&payload.scene, cols, rows).map_err(|err| {
            ErrorData::internal_error(
                format!("failed to render scene: {err}"),
                Some(serde_json::json!({ "scene_id": scene_id.as_str() })),
            )
        })?;

        Ok(Json(SceneRenderTextResponse { scene_id: scene_id.to_string(), text }))
    }

    /// Find text elements whose content matches `needle` (substring or regex), in paint order.
    #[tool(name = "scene.search_text")]
    async fn scene_search_text(
        &self,
        params: Parameters<SceneSearchTextParams>,
    ) -> Result<Json<SceneSearchTextResponse>, ErrorData> {
        let SceneSearchTextParams { scene_id, needle, mode, case_insensitive } = params.0;
        let scene_id = parse_scene_id(&scene_id)?;
        let mode = parse_search_mode(mode.as_deref())?;
        let payload = self.folder.load_scene(&scene_id).map_err(map_store_error)?;

        let found = text_search(&payload.scene, &needle, mode, case_insensitive.unwrap_or(false))
            .map_err(|err| {
                ErrorData::invalid_params(
                    format!("invalid regex: {err}"),
                    Some(serde_json::json!({ "needle": needle })),
                )
            })?;
        let matches = found
            .into_iter()
            .filter_map(|el| {
                el.text_data().map(|data| TextMatch {
                    element_id: el.id.to_string(),
                    text: data.text.clone(),
                    x: el.x,
                    y: el.y,
                })
            })
            .collect();

        Ok(Json(SceneSearchTextResponse { scene_id: scene_id.to_string(), matches }))
    }
}

#[tool_handler]
impl ServerHandler for ScenepadMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Scenepad scene server (tools: scene.list, scene.get, scene.save, scene.save_image, scene.list_exports, scene.import, scene.delete, scene.render_text, scene.search_text)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Mapping and parsing helpers for the tool handlers.
include!("server/helpers.rs");
