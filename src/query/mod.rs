// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over scenes and scene lists.
//!
//! Used by the scene picker in the TUI and by the MCP search tools.

pub mod scenes;
pub mod text;

pub use scenes::rank_scenes;
pub use text::{text_search, TextSearchMode};
