// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{backend::TestBackend, layout::Rect, style::Style, Terminal};
use rstest::{fixture, rstest};
use tokio::task::LocalSet;

use super::{
    centered_rect, chrome_layout, draw, footer_line, key_input, styled_lines, App, Chrome, Mode,
    Toast, SIDEBAR_WIDTH,
};
use super::theme::TuiTheme;
use crate::canvas::{CanvasEditor, Command, Key, KeyInput, Modifiers, WindowControl};
use crate::config::{EditorConfig, SessionConfig};
use crate::gateway::MemoryGateway;
use crate::model::{ContextId, Element, ElementKind, Point, Scene, Tool};
use crate::render::render_scene;
use crate::session::EditSession;
use crate::workbench::Workbench;

type TestApp = App<Rc<MemoryGateway>>;

fn app_with(gateway: Rc<MemoryGateway>) -> TestApp {
    let chrome = Chrome::new();
    let editor = CanvasEditor::new(EditorConfig::default(), Box::new(chrome.clone()));
    let config = SessionConfig { autosave: false, ..SessionConfig::default() };
    let session = EditSession::new(gateway, ContextId::new("tui").unwrap(), config);
    let mut app = App::new(Workbench::new(session, editor), chrome, TuiTheme::default());
    app.canvas_area = Rect::new(1, 1, 80, 24);
    app
}

#[fixture]
fn app() -> TestApp {
    app_with(Rc::new(MemoryGateway::new()))
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(ch: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
}

fn click(app: &mut TestApp, column: u16, row: u16, now: Instant) {
    app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), column, row), now);
    app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), column, row), now);
}

fn type_text(app: &mut TestApp, text: &str, now: Instant) {
    for ch in text.chars() {
        app.handle_event(key(KeyCode::Char(ch)), now);
    }
}

#[rstest]
#[case(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), KeyInput::command('s'))]
#[case(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::SUPER), KeyInput::command('s'))]
#[case(KeyEvent::new(KeyCode::Delete, KeyModifiers::NONE), KeyInput::plain(Key::Delete))]
#[case(
    KeyEvent::new(KeyCode::Char('Z'), KeyModifiers::CONTROL | KeyModifiers::SHIFT),
    KeyInput { key: Key::Char('Z'), modifiers: Modifiers { shift: true, command: true } }
)]
fn translates_terminal_keys(#[case] event: KeyEvent, #[case] expected: KeyInput) {
    assert_eq!(key_input(event), Some(expected));
}

#[test]
fn ignores_keys_without_an_editor_meaning() {
    assert_eq!(key_input(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE)), None);
}

#[rstest]
fn click_with_the_rectangle_tool_creates_at_the_cell(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('r')), now);
    assert_eq!(app.bench.editor().tool(), Tool::Rectangle);

    // Cell (10, 2) inside the pane at (1, 1) is scene point (100, 40).
    click(&mut app, 11, 3, now);
    let scene = app.bench.editor().scene();
    assert_eq!(scene.live_count(), 1);
    let rect = &scene.elements[0];
    assert_eq!((rect.x, rect.y), (100.0, 40.0));
}

#[rstest]
fn clicks_outside_the_pane_are_ignored(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('r')), now);
    click(&mut app, 0, 0, now);
    assert_eq!(app.bench.editor().scene().live_count(), 0);
}

#[rstest]
fn drags_leaving_the_pane_still_finish(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('r')), now);
    app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 1, 1), now);
    app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 200, 200), now);
    app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 200, 200), now);
    assert!(!app.bench.editor().is_gesture_active());
    let rect = &app.bench.editor().scene().elements[0];
    assert_eq!((rect.width, rect.height), (790.0, 460.0));
}

#[rstest]
fn double_click_on_background_toggles_chrome(mut app: TestApp) {
    let now = Instant::now();
    click(&mut app, 5, 5, now);
    click(&mut app, 5, 5, now + Duration::from_millis(200));
    assert!(app.chrome.is_hidden());
    assert!(app.bench.editor().window().is_maximized());

    click(&mut app, 5, 5, now + Duration::from_secs(2));
    click(&mut app, 5, 5, now + Duration::from_millis(2300));
    assert!(!app.chrome.is_hidden());
}

#[rstest]
fn quick_clicks_with_a_drawing_tool_each_create(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('r')), now);
    click(&mut app, 11, 3, now);
    click(&mut app, 11, 3, now + Duration::from_millis(100));

    assert_eq!(app.bench.editor().scene().live_count(), 2);
    assert!(!app.chrome.is_hidden());
    assert!(!app.bench.editor().window().is_maximized());
}

#[rstest]
#[case::too_slow(5, Duration::from_millis(401))]
#[case::other_cell(6, Duration::from_millis(100))]
fn separate_clicks_do_not_toggle(
    mut app: TestApp,
    #[case] second_column: u16,
    #[case] gap: Duration,
) {
    let now = Instant::now();
    click(&mut app, 5, 5, now);
    click(&mut app, second_column, 5, now + gap);
    assert!(!app.chrome.is_hidden());
}

#[rstest]
fn text_prompt_collects_and_places_text(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('t')), now);
    click(&mut app, 3, 3, now);
    assert_eq!(app.mode, Mode::TextPrompt { buffer: String::new() });

    // Tool and quit keys are plain text inside the prompt.
    type_text(&mut app, "quirk", now);
    app.handle_event(key(KeyCode::Backspace), now);
    app.handle_event(key(KeyCode::Enter), now);

    assert_eq!(app.mode, Mode::Canvas);
    assert!(!app.should_quit);
    let scene = app.bench.editor().scene();
    assert_eq!(scene.live_count(), 1);
    let ElementKind::Text(text) = &scene.elements[0].kind else {
        panic!("expected a text element");
    };
    assert_eq!(text.text, "quir");
}

#[rstest]
fn escape_cancels_the_prompt(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('t')), now);
    click(&mut app, 3, 3, now);
    type_text(&mut app, "draft", now);
    app.handle_event(key(KeyCode::Esc), now);
    assert_eq!(app.mode, Mode::Canvas);
    assert_eq!(app.bench.editor().scene().live_count(), 0);
    assert!(!app.bench.editor().history().has_undo());
}

#[rstest]
fn q_quits_from_the_canvas(mut app: TestApp) {
    app.handle_event(key(KeyCode::Char('q')), Instant::now());
    assert!(app.should_quit);
}

#[rstest]
fn shortcuts_reach_the_editor(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('r')), now);
    click(&mut app, 11, 3, now);
    app.handle_event(ctrl('z'), now);
    assert_eq!(app.bench.editor().scene().live_count(), 0);
    app.handle_event(ctrl('y'), now);
    assert_eq!(app.bench.editor().scene().live_count(), 1);

    app.handle_event(key(KeyCode::Char('v')), now);
    click(&mut app, 12, 4, now);
    assert_eq!(app.bench.editor().selection().len(), 1);
    app.handle_event(key(KeyCode::Delete), now);
    assert_eq!(app.bench.editor().scene().live_count(), 0);
}

#[tokio::test]
async fn picker_filters_and_opens_scenes() {
    LocalSet::new()
        .run_until(async {
            let gateway = Rc::new(MemoryGateway::new());
            let mut app = app_with(Rc::clone(&gateway));
            let now = Instant::now();

            app.handle_event(key(KeyCode::Char('r')), now);
            click(&mut app, 11, 3, now);
            app.handle_event(ctrl('s'), now);
            app.bench.settle().await;
            let first = app.bench.session().scene_id().unwrap();

            app.handle_event(ctrl('n'), now);
            assert_eq!(app.bench.editor().scene().live_count(), 0);
            app.handle_event(ctrl('s'), now);
            app.bench.settle().await;

            app.handle_event(ctrl('o'), now);
            app.bench.settle().await;
            assert_eq!(app.picker_entries().len(), 2);

            type_text(&mut app, first.as_str(), now);
            assert_eq!(app.picked_scene(), Some(first.clone()));
            app.handle_event(key(KeyCode::Enter), now);
            assert_eq!(app.mode, Mode::Canvas);
            app.bench.settle().await;

            assert_eq!(app.bench.session().scene_id(), Some(first));
            assert_eq!(app.bench.editor().scene().live_count(), 1);
        })
        .await;
}

#[tokio::test]
async fn picker_deletes_the_highlighted_scene() {
    LocalSet::new()
        .run_until(async {
            let gateway = Rc::new(MemoryGateway::new());
            let mut app = app_with(Rc::clone(&gateway));
            let now = Instant::now();
            app.handle_event(key(KeyCode::Char('r')), now);
            click(&mut app, 11, 3, now);
            app.handle_event(ctrl('s'), now);
            app.bench.settle().await;

            app.handle_event(ctrl('o'), now);
            app.bench.settle().await;
            app.handle_event(ctrl('d'), now);
            app.bench.settle().await;

            assert!(gateway.is_empty());
            assert!(app.picker_entries().is_empty());
            assert_eq!(app.bench.editor().scene().live_count(), 0);
        })
        .await;
}

#[tokio::test]
async fn resume_opens_the_latest_scene() {
    LocalSet::new()
        .run_until(async {
            let gateway = Rc::new(MemoryGateway::new());
            let mut app = app_with(Rc::clone(&gateway));
            app.resume_latest().await;
            assert_eq!(app.bench.session().scene_id(), None);

            let now = Instant::now();
            app.handle_event(key(KeyCode::Char('o')), now);
            click(&mut app, 11, 3, now);
            app.bench.flush().await.unwrap();
            let saved = app.bench.session().scene_id().unwrap();

            let mut resumed = app_with(gateway);
            resumed.resume_latest().await;
            assert_eq!(resumed.bench.session().scene_id(), Some(saved));
            assert_eq!(resumed.bench.editor().scene().live_count(), 1);
        })
        .await;
}

#[rstest]
fn notices_become_toasts_that_expire(mut app: TestApp) {
    let now = Instant::now();
    app.toast = Some(Toast { message: "Saved".to_owned(), error: false, expires_at: now });
    app.tick(now);
    assert!(app.toast.is_none());
}

#[test]
fn chrome_layout_hides_sidebar_and_status_when_maximized() {
    let area = Rect::new(0, 0, 100, 30);
    let shown = chrome_layout(area, false);
    assert_eq!(shown.sidebar.map(|rect| rect.width), Some(SIDEBAR_WIDTH));
    assert_eq!(shown.status, Some(Rect::new(0, 29, 100, 1)));
    assert_eq!(shown.canvas, Rect::new(0, 0, 100 - SIDEBAR_WIDTH, 29));

    let hidden = chrome_layout(area, true);
    assert_eq!(hidden.canvas, area);
    assert!(hidden.sidebar.is_none() && hidden.status.is_none());

    let narrow = chrome_layout(Rect::new(0, 0, 60, 20), false);
    assert!(narrow.sidebar.is_none());
}

#[test]
fn centered_rect_clamps_to_the_area() {
    assert_eq!(centered_rect(10, 4, Rect::new(0, 0, 20, 10)), Rect::new(5, 3, 10, 4));
    assert_eq!(centered_rect(50, 50, Rect::new(2, 2, 20, 10)), Rect::new(2, 2, 20, 10));
}

#[test]
fn styled_lines_split_selected_cells() {
    let mut scene = Scene::default();
    let rect = Element::rectangle(10.0, 0.0, 30.0, 40.0);
    scene.app_state.selected_element_ids.insert(rect.id.clone());
    scene.elements.push(rect);
    let rendered = render_scene(&scene, 6, 2).unwrap();

    let selected = Style::default().fg(ratatui::style::Color::Cyan);
    let lines = styled_lines(&rendered, Style::default(), selected);
    assert_eq!(lines.len(), 2);
    let first: Vec<(&str, Style)> =
        lines[0].spans.iter().map(|span| (span.content.as_ref(), span.style)).collect();
    assert_eq!(first, [(" ", Style::default()), ("┌──┐", selected), (" ", Style::default())]);
}

#[test]
fn footer_prefers_the_toast() {
    let theme = TuiTheme::default();
    let toast = Toast {
        message: "persistence failed: disk full".to_owned(),
        error: true,
        expires_at: Instant::now(),
    };
    let line = footer_line(Some(&toast), &theme);
    assert_eq!(line.spans[0].content, " persistence failed: disk full");
    assert_eq!(line.spans[0].style, theme.error_style());

    let hints: String =
        footer_line(None, &theme).spans.iter().map(|span| span.content.as_ref()).collect();
    assert!(hints.contains("^S save"));
    assert!(hints.contains("q quit"));
}

#[rstest]
fn draw_renders_scene_and_chrome(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('r')), now);
    app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 1, 1), now);
    app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 5, 3), now);
    app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 5, 3), now);

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|frame| draw(frame, &mut app)).unwrap();
    let screen = screen_text(&terminal);
    assert!(screen.contains("┌───┐"), "{screen}");
    assert!(screen.contains("Tools"));
    assert!(screen.contains("Untitled scene"));
    assert_eq!(app.canvas_area, Rect::new(1, 1, 100 - SIDEBAR_WIDTH - 2, 27));

    let mut chrome = app.chrome.clone();
    chrome.set_maximized(true);
    terminal.draw(|frame| draw(frame, &mut app)).unwrap();
    let screen = screen_text(&terminal);
    assert!(!screen.contains("Tools"));
    assert_eq!(app.canvas_area, Rect::new(0, 0, 100, 30));
}

#[rstest]
fn draw_shows_the_text_prompt(mut app: TestApp) {
    let now = Instant::now();
    app.handle_event(key(KeyCode::Char('t')), now);
    click(&mut app, 3, 3, now);
    type_text(&mut app, "hello", now);

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|frame| draw(frame, &mut app)).unwrap();
    let screen = screen_text(&terminal);
    assert!(screen.contains("Text"));
    assert!(screen.contains("hello"));
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width);
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn point_mapping_follows_scroll() {
    let mut app = app_with(Rc::new(MemoryGateway::new()));
    app.bench.handle_command(Command::Pan { dx: -100.0, dy: 0.0 }, Instant::now());
    assert_eq!(app.scene_point(1, 1, false), Some(Point::new(100.0, 0.0)));
    assert_eq!(app.scene_point(0, 1, false), None);
    assert_eq!(app.scene_point(0, 1, true), Some(Point::new(100.0, 0.0)));
}
