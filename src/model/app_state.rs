// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};

use super::element::{ElementStyle, TextAlign};
use super::ids::ElementId;

/// The active canvas tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Selection,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
    Freedraw,
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Selection,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Line,
        Tool::Arrow,
        Tool::Text,
        Tool::Freedraw,
        Tool::Eraser,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Text => "text",
            Self::Freedraw => "freedraw",
            Self::Eraser => "eraser",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == raw)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Styling applied to newly created elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefaults {
    pub style: ElementStyle,
    pub font_size: f64,
    pub font_family: u32,
    pub text_align: TextAlign,
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self {
            style: ElementStyle::default(),
            font_size: 20.0,
            font_family: 1,
            text_align: TextAlign::Left,
        }
    }
}

/// View and tool state of a scene (the wire `appState`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub name: Option<String>,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub zoom: f64,
    pub grid_size: Option<f64>,
    pub view_background_color: String,
    pub theme: String,
    pub active_tool: Tool,
    pub selected_element_ids: BTreeSet<ElementId>,
    pub open_dialog: Option<String>,
    pub item_defaults: ItemDefaults,
    /// Wire keys this model does not interpret; preserved on export.
    pub extra: Map<String, Value>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            name: None,
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: 1.0,
            grid_size: None,
            view_background_color: "#ffffff".to_owned(),
            theme: "dark".to_owned(),
            active_tool: Tool::Selection,
            selected_element_ids: BTreeSet::new(),
            open_dialog: None,
            item_defaults: ItemDefaults::default(),
            extra: Map::new(),
        }
    }
}

/// Partial view-state update for [`AppState::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppStatePatch {
    pub name: Option<Option<String>>,
    pub scroll_x: Option<f64>,
    pub scroll_y: Option<f64>,
    pub zoom: Option<f64>,
    pub grid_size: Option<Option<f64>>,
    pub view_background_color: Option<String>,
    pub theme: Option<String>,
    pub active_tool: Option<Tool>,
    pub selected_element_ids: Option<BTreeSet<ElementId>>,
    pub open_dialog: Option<Option<String>>,
    pub item_defaults: Option<ItemDefaults>,
}

impl AppStatePatch {
    pub fn tool(tool: Tool) -> Self {
        Self { active_tool: Some(tool), ..Self::default() }
    }

    pub fn selection(ids: BTreeSet<ElementId>) -> Self {
        Self { selected_element_ids: Some(ids), ..Self::default() }
    }

    pub fn scroll(scroll_x: f64, scroll_y: f64) -> Self {
        Self { scroll_x: Some(scroll_x), scroll_y: Some(scroll_y), ..Self::default() }
    }
}

impl AppState {
    /// Writes every `Some` field of `patch`. Returns whether anything actually changed.
    pub fn apply(&mut self, patch: AppStatePatch) -> bool {
        let before = self.clone();
        let AppStatePatch {
            name,
            scroll_x,
            scroll_y,
            zoom,
            grid_size,
            view_background_color,
            theme,
            active_tool,
            selected_element_ids,
            open_dialog,
            item_defaults,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(scroll_x) = scroll_x {
            self.scroll_x = scroll_x;
        }
        if let Some(scroll_y) = scroll_y {
            self.scroll_y = scroll_y;
        }
        if let Some(zoom) = zoom {
            self.zoom = zoom.max(0.1);
        }
        if let Some(grid_size) = grid_size {
            self.grid_size = grid_size;
        }
        if let Some(color) = view_background_color {
            self.view_background_color = color;
        }
        if let Some(theme) = theme {
            self.theme = theme;
        }
        if let Some(tool) = active_tool {
            self.active_tool = tool;
        }
        if let Some(ids) = selected_element_ids {
            self.selected_element_ids = ids;
        }
        if let Some(dialog) = open_dialog {
            self.open_dialog = dialog;
        }
        if let Some(defaults) = item_defaults {
            self.item_defaults = defaults;
        }

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new_scene_state() {
        let state = AppState::default();
        assert_eq!(state.zoom, 1.0);
        assert_eq!(state.view_background_color, "#ffffff");
        assert_eq!(state.theme, "dark");
        assert_eq!(state.active_tool, Tool::Selection);
        assert!(state.selected_element_ids.is_empty());
        assert!(state.grid_size.is_none());
    }

    #[test]
    fn apply_reports_changes_only() {
        let mut state = AppState::default();
        assert!(!state.apply(AppStatePatch::tool(Tool::Selection)));
        assert!(state.apply(AppStatePatch::tool(Tool::Arrow)));
        assert_eq!(state.active_tool, Tool::Arrow);
        assert!(!state.apply(AppStatePatch::default()));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut state = AppState::default();
        state.apply(AppStatePatch { zoom: Some(0.0), ..AppStatePatch::default() });
        assert_eq!(state.zoom, 0.1);
    }

    #[test]
    fn tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::parse(tool.as_str()), Some(tool));
        }
        assert_eq!(Tool::parse("laser"), None);
    }
}
