// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration for the editor and the edit session.

use std::time::Duration;

/// Canvas editing defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Size of a rectangle/ellipse created by a click without dragging.
    pub default_shape_size: (f64, f64),
    /// Maximum number of undo (and redo) entries.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { default_shape_size: (100.0, 100.0), history_limit: 100 }
    }
}

/// Persistence and autosave behaviour of an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub autosave: bool,
    /// Quiet period after the last content change before an autosave fires.
    pub autosave_quiet_period: Duration,
    /// `source` written into saved wire documents.
    pub source: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave: true,
            autosave_quiet_period: Duration::from_secs(2),
            source: "scenepad".to_owned(),
        }
    }
}
