// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::format::{parse_payload, to_json_string, ValidationError};
use crate::model::{unix_millis, ContextId, SceneId, SceneInfo, ScenePayload};

const SCENES_DIR: &str = "scenes";
const EXPORTS_DIR: &str = "exports";
const SCENE_ID_PREFIX: &str = "excalidraw_";
const META_SUFFIX: &str = ".meta.json";

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Wire { path: Option<PathBuf>, source: ValidationError },
    NotFound { scene_id: SceneId },
    InvalidImage { reason: &'static str },
    Base64 { source: base64::DecodeError },
    InvalidRelativePath { field: &'static str, value: PathBuf },
    PathOutsideRoot { root: PathBuf, path: PathBuf },
    SymlinkRefused { path: PathBuf },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Wire { path: Some(path), source } => {
                write!(f, "invalid scene document at {path:?}: {source}")
            }
            Self::Wire { path: None, source } => write!(f, "invalid scene document: {source}"),
            Self::NotFound { scene_id } => write!(f, "scene not found: {scene_id}"),
            Self::InvalidImage { reason } => write!(f, "invalid image data: {reason}"),
            Self::Base64 { source } => write!(f, "invalid base64 image data: {source}"),
            Self::InvalidRelativePath { field, value } => {
                write!(f, "invalid relative path for {field}: {value:?}")
            }
            Self::PathOutsideRoot { root, path } => {
                write!(f, "path is outside scene folder: root={root:?} path={path:?}")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Wire { source, .. } => Some(source),
            Self::Base64 { source } => Some(source),
            Self::NotFound { .. }
            | Self::InvalidImage { .. }
            | Self::InvalidRelativePath { .. }
            | Self::PathOutsideRoot { .. }
            | Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Listing entry for a rendered image written next to the scenes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInfo {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    pub created_at: u64,
}

/// Scene persistence on disk.
///
/// Layout under `root`:
/// - `scenes/<id>.json`: the wire document
/// - `scenes/<id>.meta.json`: listing metadata (context, timestamps, name, element count)
/// - `exports/excalidraw_<id>_<millis>.<ext>`: rendered images
#[derive(Debug, Clone)]
pub struct SceneFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl SceneFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scenes_dir(&self) -> PathBuf {
        self.root.join(SCENES_DIR)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }

    pub fn scene_path(&self, scene_id: &SceneId) -> PathBuf {
        let file_stem = encode_persisted_id_segment(scene_id.as_str());
        self.scenes_dir().join(format!("{file_stem}.json"))
    }

    pub fn scene_meta_path(&self, scene_id: &SceneId) -> PathBuf {
        let file_stem = encode_persisted_id_segment(scene_id.as_str());
        self.scenes_dir().join(format!("{file_stem}{META_SUFFIX}"))
    }

    /// Mints the id used for a scene's first save.
    pub fn mint_scene_id() -> SceneId {
        SceneId::random_with_prefix(SCENE_ID_PREFIX)
    }

    /// Writes `payload` under `scene_id` (or a freshly minted id) and returns the id.
    ///
    /// The creation timestamp of an existing scene is kept.
    pub fn save_scene(
        &self,
        context_id: &ContextId,
        scene_id: Option<&SceneId>,
        payload: &ScenePayload,
    ) -> Result<SceneId, StoreError> {
        let scene_id = scene_id.cloned().unwrap_or_else(Self::mint_scene_id);
        let now = unix_millis();
        let created_at = match self.read_meta(&scene_id) {
            Ok(meta) => meta.created_at,
            Err(_) => now,
        };

        let scene_path = self.scene_path(&scene_id);
        let document = to_json_string(payload)
            .map_err(|source| StoreError::Json { path: scene_path.clone(), source })?;
        write_atomic_in_root(
            self.root(),
            &scene_path,
            format!("{document}\n").as_bytes(),
            self.durability,
        )?;

        let meta = SceneMetaJson {
            scene_id: scene_id.to_string(),
            conversation_id: Some(context_id.to_string()),
            created_at,
            updated_at: now,
            name: payload.scene.app_state.name.clone(),
            element_count: payload.scene.live_count(),
        };
        self.write_meta(&scene_id, &meta)?;

        tracing::debug!(
            scene_id = %scene_id,
            context_id = %context_id,
            elements = meta.element_count,
            "scene saved"
        );
        Ok(scene_id)
    }

    pub fn load_scene(&self, scene_id: &SceneId) -> Result<ScenePayload, StoreError> {
        let path = self.scene_path(scene_id);
        let raw = read_scene_file(&path, scene_id)?;
        parse_payload(&raw).map_err(|source| StoreError::Wire { path: Some(path), source })
    }

    /// Scenes belonging to `context_id`, most recently updated first.
    ///
    /// Scenes stored without a context match every context. Unreadable entries are skipped.
    pub fn list_scenes(&self, context_id: &ContextId) -> Result<Vec<SceneInfo>, StoreError> {
        let dir = self.scenes_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut scenes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io { path: dir.clone(), source })?;
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') || file_name.ends_with(META_SUFFIX) {
                continue;
            }
            let Some(stem) = file_name.strip_suffix(".json") else {
                continue;
            };

            match self.scene_info_for_stem(stem, &path) {
                Ok(info) => {
                    let matches = match &info.context_id {
                        Some(owner) => owner == context_id,
                        None => true,
                    };
                    if matches {
                        scenes.push(info);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping unreadable scene"
                    );
                }
            }
        }

        scenes.sort_by(|a, b| {
            b.updated_at.cmp(&a.updated_at).then_with(|| a.scene_id.cmp(&b.scene_id))
        });
        Ok(scenes)
    }

    pub fn delete_scene(&self, scene_id: &SceneId) -> Result<(), StoreError> {
        let scene_path = self.scene_path(scene_id);
        let meta_path = self.scene_meta_path(scene_id);
        let removed_scene = remove_if_exists(&scene_path)?;
        let removed_meta = remove_if_exists(&meta_path)?;
        if !removed_scene && !removed_meta {
            return Err(StoreError::NotFound { scene_id: scene_id.clone() });
        }
        tracing::debug!(scene_id = %scene_id, "scene deleted");
        Ok(())
    }

    /// The stored wire document, verbatim.
    pub fn export_scene(&self, scene_id: &SceneId) -> Result<String, StoreError> {
        read_scene_file(&self.scene_path(scene_id), scene_id)
    }

    /// Validates `json`, normalizes the envelope and stores it under a fresh id.
    pub fn import_scene(&self, context_id: &ContextId, json: &str) -> Result<SceneId, StoreError> {
        let payload = parse_payload(json)
            .map_err(|source| StoreError::Wire { path: None, source })?
            .into_imported();
        let scene_id = self.save_scene(context_id, None, &payload)?;
        tracing::info!(scene_id = %scene_id, context_id = %context_id, "scene imported");
        Ok(scene_id)
    }

    /// Writes a rendered image for `scene_id`.
    ///
    /// `data` is raw base64 or a `data:image/png;base64,` / `data:image/jpeg;base64,` URL.
    pub fn save_export_image(
        &self,
        scene_id: &SceneId,
        data: &str,
    ) -> Result<ExportInfo, StoreError> {
        let (extension, encoded) = split_image_data(data)?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|source| StoreError::Base64 { source })?;
        if bytes.is_empty() {
            return Err(StoreError::InvalidImage { reason: "image is empty" });
        }

        let created_at = unix_millis();
        let filename = format!(
            "{}{}_{created_at}.{extension}",
            SCENE_ID_PREFIX,
            encode_persisted_id_segment(scene_id.as_str())
        );
        let path = self.exports_dir().join(&filename);
        write_atomic_in_root(self.root(), &path, &bytes, self.durability)?;

        tracing::debug!(scene_id = %scene_id, path = %path.display(), "image exported");
        Ok(ExportInfo { filename, path, size: bytes.len() as u64, created_at })
    }

    /// Exported images, newest first; limited to one scene when `scene_id` is given.
    pub fn list_exports(&self, scene_id: Option<&SceneId>) -> Result<Vec<ExportInfo>, StoreError> {
        let dir = self.exports_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };
        let prefix = scene_id.map(|id| {
            format!("{SCENE_ID_PREFIX}{}_", encode_persisted_id_segment(id.as_str()))
        });

        let mut exports = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io { path: dir.clone(), source })?;
            let path = entry.path();
            let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !filename.starts_with(SCENE_ID_PREFIX) {
                continue;
            }
            if prefix.as_deref().is_some_and(|prefix| !filename.starts_with(prefix)) {
                continue;
            }
            let metadata =
                entry.metadata().map_err(|source| StoreError::Io { path: path.clone(), source })?;
            if !metadata.is_file() {
                continue;
            }
            let created_at = export_timestamp(filename).unwrap_or_else(|| {
                metadata.modified().ok().map_or(0, system_time_millis)
            });
            exports.push(ExportInfo {
                filename: filename.to_owned(),
                path: path.clone(),
                size: metadata.len(),
                created_at,
            });
        }

        exports.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(exports)
    }

    fn scene_info_for_stem(&self, stem: &str, path: &Path) -> Result<SceneInfo, StoreError> {
        let meta_path = path.with_file_name(format!("{stem}{META_SUFFIX}"));
        match fs::read_to_string(&meta_path) {
            Ok(raw) => {
                let meta: SceneMetaJson = serde_json::from_str(&raw)
                    .map_err(|source| StoreError::Json { path: meta_path.clone(), source })?;
                meta.into_info(&meta_path)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                // Documents dropped into the folder by hand have no sidecar yet.
                let scene_id = SceneId::new(decode_persisted_id_segment(stem)).map_err(|_| {
                    StoreError::InvalidRelativePath { field: "scene", value: path.to_path_buf() }
                })?;
                let payload = self.load_scene(&scene_id)?;
                let modified = fs::metadata(path)
                    .and_then(|md| md.modified())
                    .map_or(0, system_time_millis);
                Ok(SceneInfo {
                    scene_id,
                    context_id: None,
                    created_at: modified,
                    updated_at: modified,
                    element_count: payload.scene.live_count(),
                    name: payload.scene.app_state.name,
                })
            }
            Err(source) => Err(StoreError::Io { path: meta_path, source }),
        }
    }

    fn read_meta(&self, scene_id: &SceneId) -> Result<SceneMetaJson, StoreError> {
        let path = self.scene_meta_path(scene_id);
        let raw = fs::read_to_string(&path)
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Json { path, source })
    }

    fn write_meta(&self, scene_id: &SceneId, meta: &SceneMetaJson) -> Result<(), StoreError> {
        let path = self.scene_meta_path(scene_id);
        let raw = serde_json::to_string_pretty(meta)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        write_atomic_in_root(self.root(), &path, format!("{raw}\n").as_bytes(), self.durability)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneMetaJson {
    scene_id: String,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    created_at: u64,
    #[serde(default)]
    updated_at: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    element_count: usize,
}

impl SceneMetaJson {
    fn into_info(self, meta_path: &Path) -> Result<SceneInfo, StoreError> {
        let scene_id = SceneId::new(self.scene_id).map_err(|_| StoreError::InvalidRelativePath {
            field: "sceneId",
            value: meta_path.to_path_buf(),
        })?;
        let context_id = self
            .conversation_id
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| ContextId::new(raw).ok());
        Ok(SceneInfo {
            scene_id,
            context_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            element_count: self.element_count,
            name: self.name,
        })
    }
}

fn read_scene_file(path: &Path, scene_id: &SceneId) -> Result<String, StoreError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(raw),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(StoreError::NotFound { scene_id: scene_id.clone() })
        }
        Err(source) => Err(StoreError::Io { path: path.to_path_buf(), source }),
    }
}

fn remove_if_exists(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StoreError::Io { path: path.to_path_buf(), source }),
    }
}

fn split_image_data(data: &str) -> Result<(&'static str, &str), StoreError> {
    let data = data.trim();
    if data.is_empty() {
        return Err(StoreError::InvalidImage { reason: "image is empty" });
    }
    let Some(rest) = data.strip_prefix("data:") else {
        return Ok(("png", data));
    };
    let Some((header, encoded)) = rest.split_once(',') else {
        return Err(StoreError::InvalidImage { reason: "data URL has no payload" });
    };
    let extension = match header {
        "image/png;base64" => "png",
        "image/jpeg;base64" | "image/jpg;base64" => "jpg",
        _ => return Err(StoreError::InvalidImage { reason: "expected a base64 png or jpeg" }),
    };
    Ok((extension, encoded))
}

fn export_timestamp(filename: &str) -> Option<u64> {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    stem.rsplit_once('_').and_then(|(_, millis)| millis.parse().ok())
}

fn system_time_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

// Extracted path/write helpers for `SceneFolder`.
include!("scene_folder/helpers.rs");

#[cfg(test)]
mod tests;
