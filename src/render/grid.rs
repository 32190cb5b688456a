// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

pub const BOX_HORIZONTAL: char = '─';
pub const BOX_VERTICAL: char = '│';
pub const BOX_TOP_LEFT: char = '┌';
pub const BOX_TOP_RIGHT: char = '┐';
pub const BOX_BOTTOM_LEFT: char = '└';
pub const BOX_BOTTOM_RIGHT: char = '┘';
pub const BOX_TEE_RIGHT: char = '├';
pub const BOX_TEE_LEFT: char = '┤';
pub const BOX_TEE_DOWN: char = '┬';
pub const BOX_TEE_UP: char = '┴';
pub const BOX_CROSS: char = '┼';

/// Which neighbours a box-drawing cell connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Edges(u8);

impl Edges {
    const NONE: Self = Self(0);
    const LEFT: Self = Self(1);
    const RIGHT: Self = Self(1 << 1);
    const UP: Self = Self(1 << 2);
    const DOWN: Self = Self(1 << 3);

    fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn has(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    fn of(ch: char) -> Option<Self> {
        let (l, r, u, d) = (Self::LEFT, Self::RIGHT, Self::UP, Self::DOWN);
        let edges = match ch {
            BOX_HORIZONTAL => l.with(r),
            BOX_VERTICAL => u.with(d),
            BOX_TOP_LEFT => r.with(d),
            BOX_TOP_RIGHT => l.with(d),
            BOX_BOTTOM_LEFT => r.with(u),
            BOX_BOTTOM_RIGHT => l.with(u),
            BOX_TEE_RIGHT => u.with(d).with(r),
            BOX_TEE_LEFT => u.with(d).with(l),
            BOX_TEE_DOWN => l.with(r).with(d),
            BOX_TEE_UP => l.with(r).with(u),
            BOX_CROSS => l.with(r).with(u).with(d),
            _ => return None,
        };
        Some(edges)
    }

    fn glyph(self) -> char {
        match self.0 {
            0 => ' ',
            1..=3 => BOX_HORIZONTAL,
            4 | 8 | 12 => BOX_VERTICAL,
            10 => BOX_TOP_LEFT,
            9 => BOX_TOP_RIGHT,
            6 => BOX_BOTTOM_LEFT,
            5 => BOX_BOTTOM_RIGHT,
            14 => BOX_TEE_RIGHT,
            13 => BOX_TEE_LEFT,
            11 => BOX_TEE_DOWN,
            7 => BOX_TEE_UP,
            _ => BOX_CROSS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    edges: Edges,
}

/// A fixed-size character grid.
///
/// Plain characters overwrite (last writer wins). Box-drawing characters merge with what is
/// already there, so crossing outlines turn into junctions instead of erasing each other.
///
/// The `*_clipped` drawing methods take signed coordinates and silently drop whatever falls
/// outside the grid; the plain accessors are bounds-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        Self::new_filled(width, height, ' ')
    }

    pub fn new_filled(width: usize, height: usize, fill: char) -> Result<Self, CanvasError> {
        let len = width.checked_mul(height).ok_or(CanvasError::AreaOverflow { width, height })?;
        Ok(Self { width, height, cells: vec![Cell { ch: fill, edges: Edges::NONE }; len] })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.glyph_at(x, y, idx))
    }

    pub fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        let cell = &mut self.cells[idx];
        match Edges::of(ch) {
            Some(edges) => cell.edges = cell.edges.with(edges),
            None => *cell = Cell { ch, edges: Edges::NONE },
        }
        Ok(())
    }

    /// Sets one cell; out-of-grid coordinates are ignored.
    pub fn plot(&mut self, x: i64, y: i64, ch: char) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            if x < self.width && y < self.height {
                let _ = self.set(x, y, ch);
            }
        }
    }

    /// Writes `text` left to right from `(x, y)`, clipping on every side.
    pub fn write_str_clipped(&mut self, x: i64, y: i64, text: &str) {
        for (offset, ch) in (0i64..).zip(text.chars()) {
            self.plot(x + offset, y, ch);
        }
    }

    /// Draws a box outline with corners at `(x0, y0)` and `(x1, y1)`.
    ///
    /// Degenerate boxes collapse to a line or a single junction.
    pub fn draw_box_clipped(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) {
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));

        if min_x == max_x && min_y == max_y {
            self.plot(min_x, min_y, BOX_CROSS);
            return;
        }
        if min_y == max_y {
            for x in self.clip_x(min_x, max_x) {
                self.plot(x, min_y, BOX_HORIZONTAL);
            }
            return;
        }
        if min_x == max_x {
            for y in self.clip_y(min_y, max_y) {
                self.plot(min_x, y, BOX_VERTICAL);
            }
            return;
        }

        for x in self.clip_x(min_x + 1, max_x - 1) {
            self.plot(x, min_y, BOX_HORIZONTAL);
            self.plot(x, max_y, BOX_HORIZONTAL);
        }
        for y in self.clip_y(min_y + 1, max_y - 1) {
            self.plot(min_x, y, BOX_VERTICAL);
            self.plot(max_x, y, BOX_VERTICAL);
        }
        self.plot(min_x, min_y, BOX_TOP_LEFT);
        self.plot(max_x, min_y, BOX_TOP_RIGHT);
        self.plot(min_x, max_y, BOX_BOTTOM_LEFT);
        self.plot(max_x, max_y, BOX_BOTTOM_RIGHT);
    }

    /// Bresenham segment from `(x0, y0)` to `(x1, y1)` inclusive. `glyph` picks the character
    /// from the overall direction `(dx, dy)`.
    pub fn draw_segment_clipped(
        &mut self,
        (x0, y0): (i64, i64),
        (x1, y1): (i64, i64),
        glyph: impl Fn(i64, i64) -> char,
    ) {
        let (w, h) = (self.width as i64, self.height as i64);
        if x0.max(x1) < 0 || y0.max(y1) < 0 || x0.min(x1) >= w || y0.min(y1) >= h {
            return;
        }
        let ch = glyph(x1 - x0, y1 - y0);
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.plot(x, y, ch);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Rows rendered as strings with trailing blanks (and trailing empty rows) removed.
    pub fn to_string_trimmed(&self) -> String {
        let mut lines: Vec<String> = (0..self.height)
            .map(|y| {
                let row: String = (0..self.width)
                    .map(|x| self.glyph_at(x, y, y * self.width + x))
                    .collect();
                row.trim_end_matches(' ').to_owned()
            })
            .collect();
        while matches!(lines.last(), Some(line) if line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn clip_x(&self, from: i64, to: i64) -> std::ops::RangeInclusive<i64> {
        from.max(-1)..=to.min(self.width as i64)
    }

    fn clip_y(&self, from: i64, to: i64) -> std::ops::RangeInclusive<i64> {
        from.max(-1)..=to.min(self.height as i64)
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if x >= self.width || y >= self.height {
            return Err(CanvasError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        Ok(y * self.width + x)
    }

    fn glyph_at(&self, x: usize, y: usize, idx: usize) -> char {
        let Cell { ch, edges } = self.cells[idx];
        if edges.is_empty() {
            return ch;
        }
        let connected = self.connected_edges(x, y, edges);
        if connected.is_empty() {
            edges.glyph()
        } else {
            connected.glyph()
        }
    }

    /// The subset of `edges` that meets a matching edge in the neighbouring cell.
    fn connected_edges(&self, x: usize, y: usize, edges: Edges) -> Edges {
        let at = |x: usize, y: usize| self.cells[y * self.width + x].edges;
        let mut connected = Edges::NONE;
        if edges.has(Edges::LEFT) && x > 0 && at(x - 1, y).has(Edges::RIGHT) {
            connected = connected.with(Edges::LEFT);
        }
        if edges.has(Edges::RIGHT) && x + 1 < self.width && at(x + 1, y).has(Edges::LEFT) {
            connected = connected.with(Edges::RIGHT);
        }
        if edges.has(Edges::UP) && y > 0 && at(x, y - 1).has(Edges::DOWN) {
            connected = connected.with(Edges::UP);
        }
        if edges.has(Edges::DOWN) && y + 1 < self.height && at(x, y + 1).has(Edges::UP) {
            connected = connected.with(Edges::DOWN);
        }
        connected
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        for y in 0..self.height {
            for x in 0..self.width {
                f.write_char(self.glyph_at(x, y, y * self.width + x))?;
            }
            if y + 1 < self.height {
                f.write_char('\n')?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    AreaOverflow { width: usize, height: usize },
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AreaOverflow { width, height } => {
                write!(f, "canvas area overflow: {width}*{height}")
            }
            Self::OutOfBounds { x, y, width, height } => {
                write!(f, "out of bounds: ({x},{y}) for {width}x{height} canvas")
            }
        }
    }
}

impl std::error::Error for CanvasError {}

#[cfg(test)]
mod tests {
    use super::{Canvas, CanvasError};

    #[test]
    fn checked_access_reports_out_of_bounds() {
        let mut c = Canvas::new_filled(3, 2, '.').unwrap();
        c.set(1, 0, 'X').unwrap();
        assert_eq!(c.get(1, 0).unwrap(), 'X');
        assert_eq!(c.to_string(), ".X.\n...");
        assert_eq!(
            c.set(3, 0, 'X').unwrap_err(),
            CanvasError::OutOfBounds { x: 3, y: 0, width: 3, height: 2 }
        );
    }

    #[test]
    fn rejects_area_overflow() {
        assert_eq!(
            Canvas::new(usize::MAX, 2).unwrap_err(),
            CanvasError::AreaOverflow { width: usize::MAX, height: 2 }
        );
    }

    #[test]
    fn text_is_clipped_on_both_sides() {
        let mut c = Canvas::new_filled(4, 1, '.').unwrap();
        c.write_str_clipped(-2, 0, "abcdefgh");
        assert_eq!(c.to_string(), "cdef");
        c.write_str_clipped(0, 5, "zz");
        assert_eq!(c.to_string(), "cdef");
    }

    #[test]
    fn box_outline_uses_corners() {
        let mut c = Canvas::new_filled(6, 5, '.').unwrap();
        c.draw_box_clipped(4, 3, 1, 1);
        assert_eq!(c.to_string(), "......\n.┌──┐.\n.│..│.\n.└──┘.\n......");
    }

    #[test]
    fn partially_visible_box_keeps_visible_edges() {
        let mut c = Canvas::new_filled(4, 3, '.').unwrap();
        c.draw_box_clipped(-3, 1, 2, 10);
        assert_eq!(c.to_string(), "....\n──┐.\n..│.");
    }

    #[test]
    fn overlapping_boxes_merge_into_junctions() {
        let mut c = Canvas::new(7, 5).unwrap();
        c.draw_box_clipped(0, 0, 4, 2);
        c.draw_box_clipped(2, 2, 6, 4);
        assert_eq!(c.to_string(), "┌───┐  \n│   │  \n└─┬─┴─┐\n  │   │\n  └───┘");
    }

    #[test]
    fn segments_cover_both_endpoints() {
        let mut c = Canvas::new_filled(4, 4, '.').unwrap();
        c.draw_segment_clipped((0, 0), (3, 3), |_, _| '\\');
        assert_eq!(c.to_string(), "\\...\n.\\..\n..\\.\n...\\");
        let mut c = Canvas::new_filled(3, 1, '.').unwrap();
        c.draw_segment_clipped((-5, 0), (1, 0), |_, _| '=');
        assert_eq!(c.to_string(), "==.");
    }

    #[test]
    fn trimmed_output_drops_trailing_blanks() {
        let mut c = Canvas::new(3, 3).unwrap();
        c.plot(0, 0, 'A');
        assert_eq!(c.to_string_trimmed(), "A");
    }
}
