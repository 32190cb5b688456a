// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Point, Tool};

/// Scroll step for the arrow keys, in scene units. Arrows move the view, so the scene scrolls
/// the opposite way.
pub const PAN_STEP: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on most terminals, Cmd where the host reports it.
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, command: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true, command: false };
    pub const COMMAND: Modifiers = Modifiers { shift: false, command: true };
}

/// Pointer input in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { at: Point, modifiers: Modifiers },
    Move { at: Point },
    Up { at: Point },
    DoubleClick { at: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Escape,
    Enter,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self { key, modifiers: Modifiers::NONE }
    }

    pub fn command(ch: char) -> Self {
        Self { key: Key::Char(ch), modifiers: Modifiers::COMMAND }
    }
}

/// What a keyboard shortcut asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Save,
    Undo,
    Redo,
    NewScene,
    DeleteSelection,
    SetTool(Tool),
    BringToFront,
    SendToBack,
    Pan { dx: f64, dy: f64 },
    /// Abandon the current gesture and clear the selection.
    Cancel,
}

/// Maps a key press to its editor command.
///
/// Command-chords: `s` save, `z` undo, `y` or shift+`z` redo, `n` new scene.
/// Plain keys pick tools (`v r o l a t p x`), reorder (`]`, `[`), delete and pan.
pub fn command_for_key(input: KeyInput) -> Option<Command> {
    let KeyInput { key, modifiers } = input;
    if modifiers.command {
        let Key::Char(ch) = key else {
            return None;
        };
        return match ch.to_ascii_lowercase() {
            's' => Some(Command::Save),
            'z' if modifiers.shift || ch.is_ascii_uppercase() => Some(Command::Redo),
            'z' => Some(Command::Undo),
            'y' => Some(Command::Redo),
            'n' => Some(Command::NewScene),
            _ => None,
        };
    }

    match key {
        Key::Delete | Key::Backspace => Some(Command::DeleteSelection),
        Key::Escape => Some(Command::Cancel),
        Key::Left => Some(Command::Pan { dx: PAN_STEP, dy: 0.0 }),
        Key::Right => Some(Command::Pan { dx: -PAN_STEP, dy: 0.0 }),
        Key::Up => Some(Command::Pan { dx: 0.0, dy: PAN_STEP }),
        Key::Down => Some(Command::Pan { dx: 0.0, dy: -PAN_STEP }),
        Key::Enter => None,
        Key::Char(']') => Some(Command::BringToFront),
        Key::Char('[') => Some(Command::SendToBack),
        Key::Char(ch) => tool_for_char(ch).map(Command::SetTool),
    }
}

fn tool_for_char(ch: char) -> Option<Tool> {
    let tool = match ch {
        'v' | '1' => Tool::Selection,
        'r' | '2' => Tool::Rectangle,
        'o' | '3' => Tool::Ellipse,
        'l' | '4' => Tool::Line,
        'a' | '5' => Tool::Arrow,
        't' | '6' => Tool::Text,
        'p' | '7' => Tool::Freedraw,
        'x' | '8' => Tool::Eraser,
        _ => return None,
    };
    Some(tool)
}

/// Shortcut label shown next to a tool in the toolbar.
pub fn tool_shortcut(tool: Tool) -> char {
    match tool {
        Tool::Selection => 'v',
        Tool::Rectangle => 'r',
        Tool::Ellipse => 'o',
        Tool::Line => 'l',
        Tool::Arrow => 'a',
        Tool::Text => 't',
        Tool::Freedraw => 'p',
        Tool::Eraser => 'x',
    }
}
