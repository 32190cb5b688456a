// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text rendering of scenes.
//!
//! [`render_scene`] is a pure function of the scene (elements plus the view state carried in
//! its app state: scroll, zoom, selection). It draws onto a fixed-size character [`Canvas`] and
//! returns cell spans for the selection so the TUI can highlight it without re-deriving
//! geometry.

pub mod grid;

use crate::model::{AppState, Element, ElementKind, Point, Scene, ShapeKind};

pub use grid::{Canvas, CanvasError};

/// Scene units covered by one character cell at zoom 1.
pub const CELL_WIDTH: f64 = 10.0;
pub const CELL_HEIGHT: f64 = 20.0;

/// A contiguous span of highlighted cells within one rendered line: `(y, x0, x1)`, inclusive.
pub type LineSpan = (usize, usize, usize);

/// Mapping between scene coordinates and character cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scroll_x: 0.0, scroll_y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    pub fn of(state: &AppState) -> Self {
        Self { scroll_x: state.scroll_x, scroll_y: state.scroll_y, zoom: state.zoom }
    }

    fn zoom(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > 0.1 {
            self.zoom
        } else {
            0.1
        }
    }

    /// Cell containing `p`. May lie outside the visible grid.
    pub fn cell_of(&self, p: Point) -> (i64, i64) {
        let zoom = self.zoom();
        (
            ((p.x + self.scroll_x) * zoom / CELL_WIDTH).floor() as i64,
            ((p.y + self.scroll_y) * zoom / CELL_HEIGHT).floor() as i64,
        )
    }

    /// Scene point at the top-left corner of cell `(col, row)`.
    pub fn scene_point(&self, col: u16, row: u16) -> Point {
        let zoom = self.zoom();
        Point::new(
            f64::from(col) * CELL_WIDTH / zoom - self.scroll_x,
            f64::from(row) * CELL_HEIGHT / zoom - self.scroll_y,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScene {
    canvas: Canvas,
    selection_spans: Vec<LineSpan>,
}

impl RenderedScene {
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Full-width rows, one per canvas line.
    pub fn lines(&self) -> Vec<String> {
        self.canvas.to_string().split('\n').map(str::to_owned).collect()
    }

    pub fn text_trimmed(&self) -> String {
        self.canvas.to_string_trimmed()
    }

    pub fn selection_spans(&self) -> &[LineSpan] {
        &self.selection_spans
    }
}

/// Renders the live elements of `scene` in paint order onto a `cols` x `rows` grid.
pub fn render_scene(scene: &Scene, cols: usize, rows: usize) -> Result<RenderedScene, CanvasError> {
    let viewport = Viewport::of(&scene.app_state);
    let mut canvas = Canvas::new(cols, rows)?;
    for element in scene.live_elements() {
        draw_element(&mut canvas, &viewport, element);
    }

    let mut selection_spans = Vec::new();
    for id in &scene.app_state.selected_element_ids {
        let Some(element) = scene.element(id).filter(|el| !el.is_deleted()) else {
            continue;
        };
        selection_spans.extend(element_spans(&viewport, element, cols, rows));
    }
    selection_spans.sort_unstable();
    selection_spans.dedup();

    Ok(RenderedScene { canvas, selection_spans })
}

/// Renders to trimmed text sized to fit every live element, with the view scrolled so the
/// top-left element sits at the origin. Used for plain-text previews.
pub fn render_scene_fitted(
    scene: &Scene,
    max_cols: usize,
    max_rows: usize,
) -> Result<String, CanvasError> {
    let Some(bounds) = scene.live_elements().map(Element::bounds).reduce(|a, b| a.union(b)) else {
        return Ok(String::new());
    };
    let mut fitted = scene.clone();
    fitted.app_state.scroll_x = -bounds.min_x;
    fitted.app_state.scroll_y = -bounds.min_y;
    fitted.app_state.zoom = 1.0;
    fitted.app_state.selected_element_ids.clear();
    let cols = ((bounds.width() / CELL_WIDTH).ceil() as usize + 2).min(max_cols);
    let rows = ((bounds.height() / CELL_HEIGHT).ceil() as usize + 2).min(max_rows);
    Ok(render_scene(&fitted, cols, rows)?.text_trimmed())
}

fn draw_element(canvas: &mut Canvas, viewport: &Viewport, element: &Element) {
    let bounds = element.bounds();
    let (x0, y0) = viewport.cell_of(Point::new(bounds.min_x, bounds.min_y));
    let (x1, y1) = viewport.cell_of(Point::new(bounds.max_x, bounds.max_y));

    match &element.kind {
        ElementKind::Shape(ShapeKind::Ellipse) => draw_ellipse(canvas, (x0, y0), (x1, y1)),
        ElementKind::Shape(ShapeKind::Diamond) => {
            let (mx, my) = ((x0 + x1) / 2, (y0 + y1) / 2);
            let corners = [(mx, y0), (x1, my), (mx, y1), (x0, my), (mx, y0)];
            for pair in corners.windows(2) {
                canvas.draw_segment_clipped(pair[0], pair[1], stroke_glyph);
            }
        }
        ElementKind::Shape(_) => canvas.draw_box_clipped(x0, y0, x1, y1),
        ElementKind::Frame(frame) => {
            canvas.draw_box_clipped(x0, y0, x1, y1);
            let name = frame.name.as_deref().unwrap_or("Frame");
            canvas.write_str_clipped(x0 + 1, y0, name);
        }
        ElementKind::Image(_) => {
            canvas.draw_box_clipped(x0, y0, x1, y1);
            canvas.write_str_clipped(x0 + 1, y0 + 1, "[image]");
        }
        ElementKind::Text(text) => {
            let line_height = text.font_size * text.line_height;
            for (i, line) in text.text.lines().enumerate() {
                let at = Point::new(element.x, element.y + i as f64 * line_height);
                let (col, row) = viewport.cell_of(at);
                canvas.write_str_clipped(col, row, line);
            }
        }
        ElementKind::Linear(linear) => {
            let cells = point_cells(viewport, element, &linear.points);
            for pair in cells.windows(2) {
                canvas.draw_segment_clipped(pair[0], pair[1], stroke_glyph);
            }
            if let [first, second, ..] = cells.as_slice() {
                if linear.start_arrowhead.is_some() {
                    canvas.plot(first.0, first.1, arrowhead_glyph(*second, *first));
                }
            }
            if let [.., before, last] = cells.as_slice() {
                if linear.end_arrowhead.is_some() {
                    canvas.plot(last.0, last.1, arrowhead_glyph(*before, *last));
                }
            }
        }
        ElementKind::Freedraw(freedraw) => {
            let cells = point_cells(viewport, element, &freedraw.points);
            if let [only] = cells.as_slice() {
                canvas.plot(only.0, only.1, '•');
            }
            for pair in cells.windows(2) {
                canvas.draw_segment_clipped(pair[0], pair[1], |_, _| '•');
            }
        }
    }
}

fn point_cells(viewport: &Viewport, element: &Element, points: &[Point]) -> Vec<(i64, i64)> {
    let mut cells: Vec<(i64, i64)> = points
        .iter()
        .map(|p| viewport.cell_of(Point::new(element.x + p.x, element.y + p.y)))
        .collect();
    cells.dedup();
    cells
}

fn draw_ellipse(canvas: &mut Canvas, (x0, y0): (i64, i64), (x1, y1): (i64, i64)) {
    let (cx, cy) = ((x0 + x1) as f64 / 2.0, (y0 + y1) as f64 / 2.0);
    let (rx, ry) = ((x1 - x0) as f64 / 2.0, (y1 - y0) as f64 / 2.0);
    let samples = (((rx + ry) * 4.0).ceil() as usize).clamp(8, 4096);
    for i in 0..samples {
        let t = i as f64 / samples as f64 * std::f64::consts::TAU;
        let x = (cx + rx * t.cos()).round() as i64;
        let y = (cy + ry * t.sin()).round() as i64;
        canvas.plot(x, y, '·');
    }
}

fn stroke_glyph(dx: i64, dy: i64) -> char {
    if dy == 0 || dx.abs() > 2 * dy.abs() {
        grid::BOX_HORIZONTAL
    } else if dx == 0 || dy.abs() > 2 * dx.abs() {
        grid::BOX_VERTICAL
    } else if (dx > 0) == (dy > 0) {
        '\\'
    } else {
        '/'
    }
}

/// Arrowhead at `tip`, pointing away from `from`.
fn arrowhead_glyph(from: (i64, i64), tip: (i64, i64)) -> char {
    let (dx, dy) = (tip.0 - from.0, tip.1 - from.1);
    if dx.abs() >= dy.abs() {
        if dx >= 0 {
            '>'
        } else {
            '<'
        }
    } else if dy > 0 {
        'v'
    } else {
        '^'
    }
}

fn element_spans(
    viewport: &Viewport,
    element: &Element,
    cols: usize,
    rows: usize,
) -> Vec<LineSpan> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let bounds = element.bounds();
    let (x0, y0) = viewport.cell_of(Point::new(bounds.min_x, bounds.min_y));
    let (x1, y1) = viewport.cell_of(Point::new(bounds.max_x, bounds.max_y));
    let (max_x, max_y) = (cols as i64 - 1, rows as i64 - 1);
    if x1 < 0 || y1 < 0 || x0 > max_x || y0 > max_y {
        return Vec::new();
    }
    let (x0, x1) = (x0.max(0) as usize, x1.min(max_x) as usize);
    (y0.max(0)..=y1.min(max_y)).map(|y| (y as usize, x0, x1)).collect()
}
