// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rand::Rng;
use serde_json::{Map, Value};

use super::ids::{ElementId, FileId, GroupId};
use super::unix_millis;

/// A point in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (min_x, max_x) = if width < 0.0 { (x + width, x) } else { (x, x + width) };
        let (min_y, max_y) = if height < 0.0 { (y + height, y) } else { (y, y + height) };
        Self { min_x, min_y, max_x, max_y }
    }

    /// Bounds of `points`, each offset by `origin`. Empty input collapses to the origin.
    pub fn from_points(origin: Point, points: &[Point]) -> Self {
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return Self { min_x: origin.x, min_y: origin.y, max_x: origin.x, max_y: origin.y };
        };
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        bounds.translate(origin.x, origin.y)
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStyle {
    Hachure,
    CrossHatch,
    #[default]
    Solid,
    Zigzag,
}

impl FillStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hachure => "hachure",
            Self::CrossHatch => "cross-hatch",
            Self::Solid => "solid",
            Self::Zigzag => "zigzag",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "hachure" => Some(Self::Hachure),
            "cross-hatch" => Some(Self::CrossHatch),
            "solid" => Some(Self::Solid),
            "zigzag" => Some(Self::Zigzag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roundness {
    pub kind: u32,
    pub value: Option<f64>,
}

/// Stroke/fill styling shared by every element variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    pub stroke_color: String,
    pub background_color: String,
    pub fill_style: FillStyle,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
    pub roughness: u8,
    /// 0..=100
    pub opacity: u8,
    pub roundness: Option<Roundness>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#1e1e1e".to_owned(),
            background_color: "transparent".to_owned(),
            fill_style: FillStyle::Solid,
            stroke_width: 2.0,
            stroke_style: StrokeStyle::Solid,
            roughness: 1,
            opacity: 100,
            roundness: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Diamond,
    Embeddable,
    Iframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    pub text: String,
    pub original_text: String,
    pub font_size: f64,
    pub font_family: u32,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub line_height: f64,
    /// Weak reference to the shape this text is bound into.
    pub container_id: Option<ElementId>,
}

impl TextData {
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        let text = text.into();
        Self {
            original_text: text.clone(),
            text,
            font_size,
            font_family: 1,
            text_align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: 1.25,
            container_id: None,
        }
    }

    /// A rough monospace estimate of the rendered size; real text layout is left to renderers.
    pub fn measure(&self) -> (f64, f64) {
        let lines = self.text.lines().count().max(1);
        let widest = self.text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        (widest as f64 * self.font_size * 0.6, lines as f64 * self.font_size * self.line_height)
    }
}

/// Binding of a linear element's endpoint to another element.
#[derive(Debug, Clone, PartialEq)]
pub struct PointBinding {
    pub element_id: ElementId,
    pub focus: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearData {
    pub arrow: bool,
    /// Points relative to the element's `(x, y)`. The first point is conventionally `(0, 0)`.
    pub points: Vec<Point>,
    pub start_binding: Option<PointBinding>,
    pub end_binding: Option<PointBinding>,
    pub start_arrowhead: Option<String>,
    pub end_arrowhead: Option<String>,
}

impl LinearData {
    pub fn new(arrow: bool) -> Self {
        Self {
            arrow,
            points: vec![Point::ORIGIN],
            start_binding: None,
            end_binding: None,
            start_arrowhead: None,
            end_arrowhead: arrow.then(|| "arrow".to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreedrawData {
    pub points: Vec<Point>,
    pub pressures: Vec<f64>,
    pub simulate_pressure: bool,
}

impl Default for FreedrawData {
    fn default() -> Self {
        Self { points: vec![Point::ORIGIN], pressures: Vec::new(), simulate_pressure: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    #[default]
    Pending,
    Saved,
    Error,
}

impl ImageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Saved => "saved",
            Self::Error => "error",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "saved" => Some(Self::Saved),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub file_id: Option<FileId>,
    pub status: ImageStatus,
    pub scale: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameData {
    pub name: Option<String>,
    pub magic: bool,
}

/// Variant payload, keyed by the wire `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Shape(ShapeKind),
    Text(TextData),
    Linear(LinearData),
    Freedraw(FreedrawData),
    Image(ImageData),
    Frame(FrameData),
}

impl ElementKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Shape(ShapeKind::Rectangle) => "rectangle",
            Self::Shape(ShapeKind::Ellipse) => "ellipse",
            Self::Shape(ShapeKind::Diamond) => "diamond",
            Self::Shape(ShapeKind::Embeddable) => "embeddable",
            Self::Shape(ShapeKind::Iframe) => "iframe",
            Self::Text(_) => "text",
            Self::Linear(linear) if linear.arrow => "arrow",
            Self::Linear(_) => "line",
            Self::Freedraw(_) => "freedraw",
            Self::Image(_) => "image",
            Self::Frame(frame) if frame.magic => "magicframe",
            Self::Frame(_) => "frame",
        }
    }

    fn points(&self) -> Option<&[Point]> {
        match self {
            Self::Linear(linear) => Some(&linear.points),
            Self::Freedraw(freedraw) => Some(&freedraw.points),
            _ => None,
        }
    }
}

/// Weak reference from an element to an element bound to it (arrows, container text).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundElement {
    pub id: ElementId,
    pub kind: String,
}

/// Version bookkeeping carried by every element.
///
/// Codecs restore it verbatim; every mutation through [`Element`] methods advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionStamp {
    pub version: u64,
    pub version_nonce: u32,
    pub updated: u64,
}

/// A partial element update; every `Some` field is written, then the element is bumped once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub angle: Option<f64>,
    pub style: Option<ElementStyle>,
    pub group_ids: Option<Vec<GroupId>>,
    pub frame_id: Option<Option<ElementId>>,
    pub link: Option<Option<String>>,
    pub locked: Option<bool>,
    pub text: Option<String>,
}

impl ElementPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One diagram primitive.
///
/// Data fields are public; the [`VersionStamp`] is not, so every field change made through the
/// mutation methods strictly increases `version` and regenerates `version_nonce`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub style: ElementStyle,
    pub group_ids: Vec<GroupId>,
    pub frame_id: Option<ElementId>,
    pub bound_elements: Vec<BoundElement>,
    pub link: Option<String>,
    pub locked: bool,
    pub seed: u32,
    /// Wire fields this model does not interpret; preserved on export.
    pub extra: Map<String, Value>,
    stamp: VersionStamp,
    is_deleted: bool,
}

impl Element {
    /// A fresh element: new id, `version = 1`, random nonce and seed, `updated = now`.
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: ElementId::random(),
            kind,
            x,
            y,
            width,
            height,
            angle: 0.0,
            style: ElementStyle::default(),
            group_ids: Vec::new(),
            frame_id: None,
            bound_elements: Vec::new(),
            link: None,
            locked: false,
            seed: random_seed(),
            extra: Map::new(),
            stamp: VersionStamp {
                version: 1,
                version_nonce: random_seed(),
                updated: unix_millis(),
            },
            is_deleted: false,
        }
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Shape(ShapeKind::Rectangle), x, y, width, height)
    }

    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Shape(ShapeKind::Ellipse), x, y, width, height)
    }

    pub fn text(x: f64, y: f64, text: impl Into<String>, font_size: f64) -> Self {
        let data = TextData::new(text, font_size);
        let (width, height) = data.measure();
        Self::new(ElementKind::Text(data), x, y, width, height)
    }

    pub fn linear(x: f64, y: f64, arrow: bool) -> Self {
        Self::new(ElementKind::Linear(LinearData::new(arrow)), x, y, 0.0, 0.0)
    }

    pub fn freedraw(x: f64, y: f64) -> Self {
        Self::new(ElementKind::Freedraw(FreedrawData::default()), x, y, 0.0, 0.0)
    }

    /// Restores persisted version bookkeeping and deletion state.
    pub fn with_stamp(mut self, stamp: VersionStamp, is_deleted: bool) -> Self {
        self.stamp = stamp;
        self.is_deleted = is_deleted;
        self
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    pub fn stamp(&self) -> VersionStamp {
        self.stamp
    }

    pub fn version(&self) -> u64 {
        self.stamp.version
    }

    pub fn version_nonce(&self) -> u32 {
        self.stamp.version_nonce
    }

    pub fn updated(&self) -> u64 {
        self.stamp.updated
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    pub fn text_data(&self) -> Option<&TextData> {
        match &self.kind {
            ElementKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Advances the version stamp without changing data.
    pub fn bump(&mut self) {
        self.stamp = VersionStamp {
            version: self.stamp.version.saturating_add(1),
            version_nonce: fresh_nonce(self.stamp.version_nonce),
            updated: unix_millis(),
        };
    }

    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(angle) = patch.angle {
            self.angle = angle;
        }
        if let Some(style) = &patch.style {
            self.style = style.clone();
        }
        if let Some(group_ids) = &patch.group_ids {
            self.group_ids = group_ids.clone();
        }
        if let Some(frame_id) = &patch.frame_id {
            self.frame_id = frame_id.clone();
        }
        if let Some(link) = &patch.link {
            self.link = link.clone();
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let (Some(text), ElementKind::Text(data)) = (&patch.text, &mut self.kind) {
            data.text = text.clone();
            data.original_text = text.clone();
            let (width, height) = data.measure();
            self.width = width;
            self.height = height;
        }
        self.bump();
    }

    /// Merges an incoming copy of this element (same id).
    ///
    /// Data is taken from `incoming`; the result's version is `max(self, incoming) + 1` with a
    /// fresh nonce. A tombstone stays a tombstone.
    pub fn merge_from(&mut self, incoming: Element) {
        let was_deleted = self.is_deleted;
        let base_version = self.stamp.version.max(incoming.stamp.version);
        let previous_nonce = self.stamp.version_nonce;
        *self = incoming;
        self.is_deleted = self.is_deleted || was_deleted;
        self.stamp.version = base_version;
        self.stamp.version_nonce = previous_nonce;
        self.bump();
    }

    /// Rolls this element back to an earlier copy of itself, deletion state included.
    ///
    /// Returns `false` when the data already matches. Otherwise the result's version is
    /// `max(self, snapshot) + 1` with a fresh nonce, so history never moves a version backwards.
    pub fn revert_to(&mut self, snapshot: Element) -> bool {
        if self.same_data(&snapshot) {
            return false;
        }
        let base_version = self.stamp.version.max(snapshot.stamp.version);
        let previous_nonce = self.stamp.version_nonce;
        *self = snapshot;
        self.stamp.version = base_version;
        self.stamp.version_nonce = previous_nonce;
        self.bump();
        true
    }

    fn same_data(&self, other: &Element) -> bool {
        if self.stamp == other.stamp {
            return self == other;
        }
        let mut aligned = other.clone();
        aligned.stamp = self.stamp;
        self == &aligned
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        self.bump();
    }

    pub fn set_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self.bump();
    }

    /// Appends a sample given in scene coordinates to a linear or freehand element.
    ///
    /// Returns `false` (and leaves the element untouched) for other variants.
    pub fn push_point(&mut self, at: Point, pressure: Option<f64>) -> bool {
        let relative = Point::new(at.x - self.x, at.y - self.y);
        match &mut self.kind {
            ElementKind::Linear(linear) => linear.points.push(relative),
            ElementKind::Freedraw(freedraw) => {
                freedraw.points.push(relative);
                if let Some(pressure) = pressure {
                    freedraw.pressures.push(pressure);
                }
            }
            _ => return false,
        }
        self.sync_point_extent();
        self.bump();
        true
    }

    /// Tombstones the element. Returns `false` when it already was one.
    pub fn mark_deleted(&mut self) -> bool {
        if self.is_deleted {
            return false;
        }
        self.is_deleted = true;
        self.bump();
        true
    }

    pub fn point_count(&self) -> usize {
        self.kind.points().map_or(0, <[Point]>::len)
    }

    /// Axis-aligned bounds used for hit-testing. Rotation is ignored.
    pub fn bounds(&self) -> Bounds {
        match self.kind.points() {
            Some(points) => Bounds::from_points(Point::new(self.x, self.y), points),
            None => Bounds::from_rect(self.x, self.y, self.width, self.height),
        }
    }

    /// Inclusive bounding-box containment.
    pub fn hit_test(&self, at: Point) -> bool {
        self.bounds().contains(at)
    }

    fn sync_point_extent(&mut self) {
        if let Some(points) = self.kind.points() {
            let local = Bounds::from_points(Point::ORIGIN, points);
            self.width = local.width();
            self.height = local.height();
        }
    }
}

fn random_seed() -> u32 {
    rand::thread_rng().gen_range(1..=i32::MAX as u32)
}

fn fresh_nonce(previous: u32) -> u32 {
    loop {
        let nonce = random_seed();
        if nonce != previous {
            return nonce;
        }
    }
}
