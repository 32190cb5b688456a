// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ratatui::style::{Color, Modifier, Style};

/// Styles the editor draws with. Everything sits on the terminal's own colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TuiTheme {
    focus: Color,
    selection: Color,
    muted: Color,
    key: Color,
    error: Color,
    ok: Color,
}

impl Default for TuiTheme {
    fn default() -> Self {
        Self {
            focus: Color::LightGreen,
            selection: Color::LightCyan,
            muted: Color::DarkGray,
            key: Color::Cyan,
            error: Color::Red,
            ok: Color::Green,
        }
    }
}

impl TuiTheme {
    pub(crate) fn base_style(&self) -> Style {
        Style::default()
    }

    /// Canvas and popup borders; the focused panel is highlighted.
    pub(crate) fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus)
        } else {
            Style::default()
        }
    }

    /// Cells covered by a selected element.
    pub(crate) fn selection_style(&self) -> Style {
        Style::default().fg(self.selection).add_modifier(Modifier::BOLD)
    }

    /// The active entry of the tool bar and of the scene picker.
    pub(crate) fn active_tool_style(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub(crate) fn key_style(&self) -> Style {
        Style::default().fg(self.key)
    }

    pub(crate) fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    fn ok_style(&self) -> Style {
        Style::default().fg(self.ok)
    }

    /// Toast line in the footer.
    pub(crate) fn toast_style(&self, error: bool) -> Style {
        if error {
            self.error_style()
        } else {
            self.ok_style()
        }
    }
}
