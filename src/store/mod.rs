// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scene storage.
//!
//! [`SceneStore`] is the in-memory aggregate of the open scene; [`SceneFolder`] persists scenes,
//! their listing metadata and rendered image exports on disk.

pub mod scene_folder;
pub mod scene_store;

pub use scene_folder::{ExportInfo, SceneFolder, StoreError, WriteDurability};
pub use scene_store::{ChangeKind, Delta, SceneChange, SceneStore};
