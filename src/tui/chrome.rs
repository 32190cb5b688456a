// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Layout, title, footer, sidebar, and style helpers used by TUI rendering.
struct ChromeLayout {
    canvas: Rect,
    sidebar: Option<Rect>,
    status: Option<Rect>,
}

fn chrome_layout(area: Rect, hidden: bool) -> ChromeLayout {
    if hidden {
        return ChromeLayout { canvas: area, sidebar: None, status: None };
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let sidebar_width = if rows[0].width >= SIDEBAR_WIDTH * 3 { SIDEBAR_WIDTH } else { 0 };
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(sidebar_width)])
        .split(rows[0]);
    ChromeLayout {
        canvas: panes[0],
        sidebar: (sidebar_width > 0).then_some(panes[1]),
        status: Some(rows[1]),
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn view_title(label: &str, tail: Option<&str>) -> String {
    let mut title = format!("─ {label}");
    if let Some(tail) = tail {
        let tail = tail.trim();
        if !tail.is_empty() {
            title.push(' ');
            title.push_str(tail);
        }
    }
    title.push(' ');
    title
}

fn canvas_title<G: PersistenceGateway + 'static>(bench: &Workbench<G>) -> String {
    let name = bench.editor().scene().app_state.name.as_deref().filter(|n| !n.trim().is_empty());
    let label = match (name, bench.session().scene_id()) {
        (Some(name), _) => name.to_owned(),
        (None, Some(scene_id)) => scene_id.to_string(),
        (None, None) => "Untitled scene".to_owned(),
    };
    let state = if bench.session().is_loading() {
        "loading…"
    } else if bench.session().is_saving() {
        "saving…"
    } else if bench.is_dirty() {
        "●"
    } else {
        ""
    };
    view_title(&label, Some(state))
}

fn tool_lines(active: Tool, theme: &TuiTheme) -> Vec<Line<'static>> {
    Tool::ALL
        .into_iter()
        .map(|tool| {
            let label = format!(" {} {:<10}", tool_shortcut(tool), tool.as_str());
            let style = if tool == active { theme.active_tool_style() } else { theme.base_style() };
            Line::from(Span::styled(label, style))
        })
        .collect()
}

fn sidebar_lines<G: PersistenceGateway + 'static>(
    bench: &Workbench<G>,
    theme: &TuiTheme,
) -> Vec<Line<'static>> {
    let editor = bench.editor();
    let mut lines = tool_lines(editor.tool(), theme);
    lines.push(Line::default());
    let stats = [
        ("elements", editor.scene().live_count().to_string()),
        ("selected", editor.selection().len().to_string()),
        ("undo", editor.history().undo_len().to_string()),
        ("redo", editor.history().redo_len().to_string()),
    ];
    for (label, value) in stats {
        lines.push(Line::from(vec![
            Span::styled(format!(" {label:<9}"), theme.muted_style()),
            Span::styled(value, theme.base_style()),
        ]));
    }
    if let Some(saved_at) = bench.session().last_saved_at() {
        lines.push(Line::from(Span::styled(format!(" saved @{saved_at}"), theme.muted_style())));
    }
    lines
}

const FOOTER_KEYS: [(&str, &str); 7] = [
    ("^S", "save"),
    ("^Z", "undo"),
    ("^Y", "redo"),
    ("^N", "new"),
    ("^O", "open"),
    ("Del", "delete"),
    ("q", "quit"),
];

fn footer_line(toast: Option<&Toast>, theme: &TuiTheme) -> Line<'static> {
    if let Some(toast) = toast {
        let style = theme.toast_style(toast.error);
        return Line::from(Span::styled(format!(" {}", toast.message), style));
    }
    let mut spans = Vec::with_capacity(FOOTER_KEYS.len() * 2);
    for (key, label) in FOOTER_KEYS {
        spans.push(Span::styled(format!(" {key}"), theme.key_style()));
        spans.push(Span::styled(format!(" {label} "), theme.muted_style()));
    }
    Line::from(spans)
}

/// Splits rendered rows into spans, styling the cells covered by selection spans.
fn styled_lines(rendered: &RenderedScene, base: Style, selected: Style) -> Vec<Line<'static>> {
    rendered
        .lines()
        .into_iter()
        .enumerate()
        .map(|(y, row)| {
            let chars: Vec<char> = row.chars().collect();
            let mut marks = vec![false; chars.len()];
            for &(_, x0, x1) in rendered.selection_spans().iter().filter(|span| span.0 == y) {
                for mark in marks.iter_mut().take(x1 + 1).skip(x0) {
                    *mark = true;
                }
            }

            let mut spans = Vec::new();
            let mut run = String::new();
            let mut run_marked = false;
            for (ch, marked) in chars.into_iter().zip(marks) {
                if marked != run_marked && !run.is_empty() {
                    let style = if run_marked { selected } else { base };
                    spans.push(Span::styled(std::mem::take(&mut run), style));
                }
                run_marked = marked;
                run.push(ch);
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, if run_marked { selected } else { base }));
            }
            Line::from(spans)
        })
        .collect()
}
