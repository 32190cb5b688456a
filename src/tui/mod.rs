// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Draws the scene into a ratatui pane and feeds mouse and keyboard input to a [`Workbench`].
//! [`run`] must be driven inside a [`tokio::task::LocalSet`]; persistence tasks make progress
//! between input polls.

use std::{
    cell::Cell,
    error::Error,
    io,
    rc::Rc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::canvas::{
    command_for_key, tool_shortcut, CanvasResponse, Command, Key, KeyInput, Modifiers,
    PointerEvent, WindowControl, PAN_STEP,
};
use crate::gateway::PersistenceGateway;
use crate::model::{Point, SceneId, SceneInfo, Tool};
use crate::query::rank_scenes;
use crate::render::{render_scene, RenderedScene, Viewport};
use crate::workbench::{Notice, Workbench};

mod theme;

use theme::TuiTheme;

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TOAST_TTL: Duration = Duration::from_secs(3);
const SIDEBAR_WIDTH: u16 = 26;

/// The TUI's window capability: "maximized" hides the sidebar and status line.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    hidden: Rc<Cell<bool>>,
}

impl Chrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

impl WindowControl for Chrome {
    fn is_maximized(&self) -> bool {
        self.hidden.get()
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.hidden.set(maximized);
    }
}

/// Runs the interactive terminal UI until the user quits, then flushes unsaved content.
///
/// `chrome` must be the window handed to the workbench's editor.
pub async fn run<G>(bench: Workbench<G>, chrome: Chrome) -> Result<(), Box<dyn Error>>
where
    G: PersistenceGateway + 'static,
{
    let mut app = App::new(bench, chrome, TuiTheme::default());
    app.resume_latest().await;

    let mut terminal = TerminalSession::new()?;
    while !app.should_quit {
        app.tick(Instant::now());
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(POLL_INTERVAL)? {
            app.handle_event(event::read()?, Instant::now());
        }
        tokio::task::yield_now().await;
    }
    drop(terminal);

    app.bench.flush().await?;
    Ok(())
}

fn draw<G: PersistenceGateway + 'static>(frame: &mut Frame<'_>, app: &mut App<G>) {
    let layout = chrome_layout(frame.size(), app.chrome.is_hidden());

    let canvas_area = if layout.status.is_some() {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(canvas_title(&app.bench))
            .border_style(app.theme.panel_border_style(app.mode == Mode::Canvas));
        let inner = block.inner(layout.canvas);
        frame.render_widget(block, layout.canvas);
        inner
    } else {
        layout.canvas
    };
    app.canvas_area = canvas_area;

    let scene = app.bench.editor().scene();
    let lines = match render_scene(scene, canvas_area.width.into(), canvas_area.height.into()) {
        Ok(rendered) => {
            styled_lines(&rendered, app.theme.base_style(), app.theme.selection_style())
        }
        Err(err) => vec![Line::from(Span::styled(err.to_string(), app.theme.error_style()))],
    };
    frame.render_widget(Paragraph::new(lines).style(app.theme.base_style()), canvas_area);

    if let Some(sidebar) = layout.sidebar {
        let panel = Paragraph::new(sidebar_lines(&app.bench, &app.theme)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(view_title("Tools", None))
                .border_style(app.theme.panel_border_style(false)),
        );
        frame.render_widget(panel, sidebar);
    }

    if let Some(status) = layout.status {
        frame.render_widget(Paragraph::new(footer_line(app.toast.as_ref(), &app.theme)), status);
    }

    match &app.mode {
        Mode::Canvas => {}
        Mode::TextPrompt { buffer } => {
            let area = centered_rect(48, 3, frame.size());
            let prompt = Paragraph::new(buffer.as_str()).style(app.theme.base_style()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(view_title("Text", Some("Enter place · Esc cancel")))
                    .border_style(app.theme.panel_border_style(true)),
            );
            frame.render_widget(Clear, area);
            frame.render_widget(prompt, area);
            let cursor_x = (area.x + 1)
                .saturating_add(buffer.chars().count() as u16)
                .min(area.right().saturating_sub(2));
            frame.set_cursor(cursor_x, area.y + 1);
        }
        Mode::Picker { query, cursor } => {
            let area = centered_rect(64, 18, frame.size());
            let block = Block::default()
                .borders(Borders::ALL)
                .title(view_title("Scenes", Some("Enter open · ^D delete · Esc close")))
                .border_style(app.theme.panel_border_style(true));
            let inner = block.inner(area);
            frame.render_widget(Clear, area);
            frame.render_widget(block, area);

            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(inner);
            let filter = Line::from(vec![
                Span::styled("/ ", app.theme.key_style()),
                Span::styled(query.clone(), app.theme.base_style()),
            ]);
            frame.render_widget(Paragraph::new(filter), rows[0]);

            let entries = rank_scenes(app.bench.scenes(), query);
            let items = entries
                .iter()
                .map(|info| {
                    ListItem::new(Line::from(vec![
                        Span::styled(info.display_name().to_owned(), app.theme.base_style()),
                        Span::styled(
                            format!("  {} el · {}", info.element_count, info.scene_id),
                            app.theme.muted_style(),
                        ),
                    ]))
                })
                .collect::<Vec<_>>();
            let mut state = ListState::default();
            if !entries.is_empty() {
                state.select(Some((*cursor).min(entries.len() - 1)));
            }
            let list = List::new(items).highlight_style(app.theme.active_tool_style());
            frame.render_stateful_widget(list, rows[1], &mut state);
            frame.set_cursor(
                (rows[0].x + 2).saturating_add(query.chars().count() as u16),
                rows[0].y,
            );
        }
    }
}

// Extracted layout/title/footer/sidebar rendering helpers.
include!("chrome.rs");

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Canvas,
    /// Collecting the string for a text element.
    TextPrompt { buffer: String },
    Picker { query: String, cursor: usize },
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    error: bool,
    expires_at: Instant,
}

struct App<G> {
    bench: Workbench<G>,
    chrome: Chrome,
    theme: TuiTheme,
    mode: Mode,
    /// Screen area of the scene pane as last drawn.
    canvas_area: Rect,
    last_press: Option<(u16, u16, Instant)>,
    toast: Option<Toast>,
    should_quit: bool,
}

impl<G: PersistenceGateway + 'static> App<G> {
    fn new(bench: Workbench<G>, chrome: Chrome, theme: TuiTheme) -> Self {
        Self {
            bench,
            chrome,
            theme,
            mode: Mode::Canvas,
            canvas_area: Rect::default(),
            last_press: None,
            toast: None,
            should_quit: false,
        }
    }

    /// Opens the most recently updated scene of the context, if there is one.
    async fn resume_latest(&mut self) {
        self.bench.refresh_scenes();
        self.bench.settle().await;
        let Some(latest) = self.bench.scenes().first().map(|info| info.scene_id.clone()) else {
            return;
        };
        self.bench.open_scene(latest);
        self.bench.settle().await;
    }

    fn tick(&mut self, now: Instant) {
        self.bench.tick(now);
        for notice in self.bench.take_notices() {
            let (message, error) = match notice {
                Notice::Saved(scene_id) => (format!("Saved {scene_id}"), false),
                Notice::Imported(scene_id) => (format!("Imported {scene_id}"), false),
                Notice::Failed(message) => (message, true),
            };
            self.toast = Some(Toast { message, error, expires_at: now + TOAST_TTL });
        }
        if self.toast.as_ref().is_some_and(|toast| toast.expires_at <= now) {
            self.toast = None;
        }
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match self.mode {
            Mode::TextPrompt { .. } => self.handle_prompt_key(key, now),
            Mode::Picker { .. } => self.handle_picker_key(key),
            Mode::Canvas => self.handle_canvas_key(key, now),
        }
    }

    fn handle_canvas_key(&mut self, key: KeyEvent, now: Instant) {
        let Some(input) = key_input(key) else {
            return;
        };
        match input {
            KeyInput { key: Key::Char('q'), modifiers } if !modifiers.shift => {
                self.should_quit = true;
            }
            KeyInput { key: Key::Char('o'), modifiers: Modifiers::COMMAND } => self.open_picker(),
            input => {
                if let Some(command) = command_for_key(input) {
                    let response = self.bench.handle_command(command, now);
                    self.after(response);
                }
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent, now: Instant) {
        let Mode::TextPrompt { buffer } = &mut self.mode else {
            return;
        };
        let text = match key.code {
            KeyCode::Char(ch) if !is_command(key.modifiers) => {
                buffer.push(ch);
                return;
            }
            KeyCode::Backspace => {
                buffer.pop();
                return;
            }
            KeyCode::Enter => Some(std::mem::take(buffer)),
            KeyCode::Esc => None,
            _ => return,
        };
        self.mode = Mode::Canvas;
        self.bench.submit_text(text, now);
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let count = self.picker_entries().len();
        let Mode::Picker { query, cursor } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.mode = Mode::Canvas,
            KeyCode::Up => *cursor = cursor.saturating_sub(1),
            KeyCode::Down => *cursor = (*cursor + 1).min(count.saturating_sub(1)),
            KeyCode::Char('d') if is_command(key.modifiers) => {
                if let Some(scene_id) = self.picked_scene() {
                    self.bench.delete_scene(scene_id);
                }
            }
            KeyCode::Char(ch) if !is_command(key.modifiers) => {
                query.push(ch);
                *cursor = 0;
            }
            KeyCode::Backspace => {
                query.pop();
                *cursor = 0;
            }
            KeyCode::Enter => {
                if let Some(scene_id) = self.picked_scene() {
                    self.bench.open_scene(scene_id);
                }
                self.mode = Mode::Canvas;
            }
            _ => {}
        }
    }

    fn open_picker(&mut self) {
        self.bench.refresh_scenes();
        self.mode = Mode::Picker { query: String::new(), cursor: 0 };
    }

    fn picker_entries(&self) -> Vec<&SceneInfo> {
        match &self.mode {
            Mode::Picker { query, .. } => rank_scenes(self.bench.scenes(), query),
            Mode::Canvas | Mode::TextPrompt { .. } => Vec::new(),
        }
    }

    fn picked_scene(&self) -> Option<SceneId> {
        let Mode::Picker { cursor, .. } = &self.mode else {
            return None;
        };
        self.picker_entries().get(*cursor).map(|info| info.scene_id.clone())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.mode != Mode::Canvas {
            return;
        }
        let event = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(at) = self.scene_point(mouse.column, mouse.row, false) else {
                    return;
                };
                if self.bench.editor().tool() == Tool::Selection
                    && self.is_double_click(mouse.column, mouse.row, now)
                {
                    self.last_press = None;
                    PointerEvent::DoubleClick { at }
                } else {
                    self.last_press = Some((mouse.column, mouse.row, now));
                    let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
                    PointerEvent::Down { at, modifiers: Modifiers { shift, command: false } }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(at) = self.scene_point(mouse.column, mouse.row, true) else {
                    return;
                };
                PointerEvent::Move { at }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(at) = self.scene_point(mouse.column, mouse.row, true) else {
                    return;
                };
                PointerEvent::Up { at }
            }
            MouseEventKind::ScrollUp => {
                self.bench.handle_command(Command::Pan { dx: 0.0, dy: PAN_STEP }, now);
                return;
            }
            MouseEventKind::ScrollDown => {
                self.bench.handle_command(Command::Pan { dx: 0.0, dy: -PAN_STEP }, now);
                return;
            }
            _ => return,
        };
        let response = self.bench.handle_pointer(event, now);
        self.after(response);
    }

    fn is_double_click(&self, column: u16, row: u16, now: Instant) -> bool {
        self.last_press.is_some_and(|(col, r, at)| {
            col == column && r == row && now.saturating_duration_since(at) <= DOUBLE_CLICK_WINDOW
        })
    }

    /// Scene point under a screen cell. With `clamp`, cells outside the pane snap to its edge
    /// so drags that leave the pane still end their gesture.
    fn scene_point(&self, column: u16, row: u16, clamp: bool) -> Option<Point> {
        let area = self.canvas_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let inside = column >= area.x
            && column < area.right()
            && row >= area.y
            && row < area.bottom();
        if !inside && !clamp {
            return None;
        }
        let col = column.clamp(area.x, area.right() - 1) - area.x;
        let row = row.clamp(area.y, area.bottom() - 1) - area.y;
        let viewport = Viewport::of(&self.bench.editor().scene().app_state);
        Some(viewport.scene_point(col, row))
    }

    fn after(&mut self, response: CanvasResponse) {
        if response.text_prompt.is_some() {
            self.mode = Mode::TextPrompt { buffer: String::new() };
        }
    }
}

fn is_command(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
}

/// Translates a crossterm key into editor input. Keys the editor has no use for map to `None`.
fn key_input(key: KeyEvent) -> Option<KeyInput> {
    let code = match key.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Delete => Key::Delete,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        _ => return None,
    };
    let modifiers = Modifiers {
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        command: is_command(key.modifiers),
    };
    Some(KeyInput { key: code, modifiers })
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}

#[cfg(test)]
mod tests;
