// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scenepad: a terminal scene editor (elements + undo + autosave + MCP).
//!
//! Layering, bottom up: `model` and `format` describe scenes, `store` and `history` hold them,
//! `canvas` turns input into edits, `session` persists through a `gateway`, and `workbench`
//! ties the editor and session together for the `tui` and `mcp` front ends.

pub mod canvas;
pub mod config;
pub mod format;
pub mod gateway;
pub mod history;
pub mod mcp;
pub mod model;
pub mod query;
pub mod render;
pub mod session;
pub mod store;
pub mod tui;
pub mod workbench;
