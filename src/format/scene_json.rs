// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::model::{
    AppState, BoundElement, Element, ElementId, ElementKind, ElementStyle, FileData, FileId,
    FillStyle, FrameData, FreedrawData, Id, ImageData, ImageStatus, ItemDefaults, LinearData,
    Point, PointBinding, Roundness, Scene, ScenePayload, ShapeKind, StrokeStyle, TextAlign,
    TextData, Tool, VersionStamp, VerticalAlign, WIRE_TYPE, WIRE_VERSION,
};

/// Legacy envelope tag accepted on import.
const LEGACY_WIRE_TYPE: &str = "excalidraw";

#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    Missing,
    /// Present, but not readable as the field's type.
    Invalid { message: String },
    OutOfRange { min: f64, max: f64 },
    UnknownVariant { value: String },
    Duplicate,
    Syntax { message: String },
}

/// A wire document that cannot be turned into a scene.
///
/// `path` names the offending field, e.g. `elements[2].x` or `appState.zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    path: String,
    problem: Problem,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, problem: Problem) -> Self {
        Self { path: path.into(), problem }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    fn missing(path: impl Into<String>) -> Self {
        Self::new(path, Problem::Missing)
    }

    fn from_serde(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = match err.path().to_string() {
            root if root == "." => String::new(),
            path => path,
        };
        let inner = err.into_inner();
        let message = inner.to_string();
        if inner.is_syntax() || inner.is_eof() {
            Self::new("", Problem::Syntax { message })
        } else {
            Self::new(path, Problem::Invalid { message })
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<document>" } else { self.path.as_str() };
        match &self.problem {
            Problem::Missing => write!(f, "{path}: missing required field"),
            Problem::Invalid { message } => write!(f, "{path}: {message}"),
            Problem::OutOfRange { min, max } => {
                write!(f, "{path}: value out of range ({min}..={max})")
            }
            Problem::UnknownVariant { value } => write!(f, "{path}: unknown value '{value}'"),
            Problem::Duplicate => write!(f, "{path}: duplicate id"),
            Problem::Syntax { message } => write!(f, "{path}: invalid JSON ({message})"),
        }
    }
}

impl std::error::Error for ValidationError {}

type Result<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneDocumentJson {
    #[serde(rename = "type")]
    kind: Option<String>,
    version: Option<Number>,
    source: Option<String>,
    elements: Option<Vec<ElementJson>>,
    app_state: Option<AppStateJson>,
    files: Option<BTreeMap<String, FileJson>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// One element in wire form: the common fields plus every variant's optional fields.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementJson {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    angle: Option<f64>,
    stroke_color: Option<String>,
    background_color: Option<String>,
    fill_style: Option<String>,
    stroke_width: Option<f64>,
    stroke_style: Option<String>,
    roughness: Option<Number>,
    opacity: Option<Number>,
    roundness: Option<RoundnessJson>,
    group_ids: Option<Vec<String>>,
    frame_id: Option<String>,
    bound_elements: Option<Vec<BoundElementJson>>,
    link: Option<String>,
    locked: Option<bool>,
    seed: Option<Number>,
    version: Option<Number>,
    version_nonce: Option<Number>,
    is_deleted: Option<bool>,
    updated: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_family: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertical_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    points: Option<Vec<[f64; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_binding: Option<BindingJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_binding: Option<BindingJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_arrowhead: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_arrowhead: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pressures: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    simulate_pressure: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<[f64; 2]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoundnessJson {
    #[serde(rename = "type", default = "default_roundness_kind")]
    kind: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
}

fn default_roundness_kind() -> u32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoundElementJson {
    id: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BindingJson {
    element_id: String,
    #[serde(default)]
    focus: f64,
    #[serde(default)]
    gap: f64,
}

/// View state. Read leniently: missing keys take defaults and unknown names fall back.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppStateJson {
    name: Option<String>,
    scroll_x: Option<f64>,
    scroll_y: Option<f64>,
    zoom: Option<ZoomJson>,
    grid_size: Option<f64>,
    view_background_color: Option<String>,
    theme: Option<String>,
    active_tool: Option<ActiveToolJson>,
    selected_element_ids: Option<Map<String, Value>>,
    open_dialog: Option<Value>,
    current_item_stroke_color: Option<String>,
    current_item_background_color: Option<String>,
    current_item_fill_style: Option<String>,
    current_item_stroke_width: Option<f64>,
    current_item_stroke_style: Option<String>,
    current_item_roughness: Option<Number>,
    current_item_opacity: Option<Number>,
    current_item_font_size: Option<f64>,
    current_item_font_family: Option<Number>,
    current_item_text_align: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ZoomJson {
    Plain(f64),
    Wrapped { value: Option<f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ActiveToolJson {
    Name(String),
    Wrapped {
        #[serde(rename = "type")]
        kind: Option<String>,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileJson {
    id: Option<String>,
    mime_type: Option<String>,
    #[serde(rename = "dataURL")]
    data_url: Option<String>,
    created: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_retrieved: Option<Number>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Parses and validates a wire document.
pub fn parse_payload(json: &str) -> Result<ScenePayload> {
    let mut de = serde_json::Deserializer::from_str(json);
    let document: SceneDocumentJson =
        serde_path_to_error::deserialize(&mut de).map_err(ValidationError::from_serde)?;
    de.end().map_err(|err| ValidationError::new("", Problem::Syntax { message: err.to_string() }))?;
    payload_from_json(document)
}

/// Validates an already parsed wire document.
pub fn decode_payload(value: &Value) -> Result<ScenePayload> {
    let document: SceneDocumentJson =
        serde_path_to_error::deserialize(value).map_err(ValidationError::from_serde)?;
    payload_from_json(document)
}

/// Serializes a payload as pretty-printed wire JSON.
pub fn to_json_string(payload: &ScenePayload) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&payload_to_json(payload))
}

pub fn encode_payload(payload: &ScenePayload) -> serde_json::Result<Value> {
    serde_json::to_value(payload_to_json(payload))
}

fn payload_to_json(payload: &ScenePayload) -> SceneDocumentJson {
    let scene = &payload.scene;
    SceneDocumentJson {
        kind: Some(WIRE_TYPE.to_owned()),
        version: Some(payload.version.into()),
        source: Some(payload.source.clone()),
        elements: Some(scene.elements.iter().map(element_to_json).collect()),
        app_state: Some(app_state_to_json(&scene.app_state)),
        files: Some(
            scene.files.iter().map(|(id, file)| (id.to_string(), file_to_json(file))).collect(),
        ),
        extra: payload.extra.clone(),
    }
}

fn payload_from_json(document: SceneDocumentJson) -> Result<ScenePayload> {
    let kind = document.kind.ok_or_else(|| ValidationError::missing("type"))?;
    if kind != WIRE_TYPE && kind != LEGACY_WIRE_TYPE {
        return Err(ValidationError::new("type", Problem::UnknownVariant { value: kind }));
    }

    let version = match document.version {
        Some(version) => version.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or_else(|| {
            ValidationError::new(
                "version",
                Problem::OutOfRange { min: 0.0, max: f64::from(u32::MAX) },
            )
        })?,
        None => WIRE_VERSION,
    };

    let raw_elements = document.elements.ok_or_else(|| ValidationError::missing("elements"))?;
    let mut elements = Vec::with_capacity(raw_elements.len());
    let mut seen = HashSet::with_capacity(raw_elements.len());
    for (index, raw) in raw_elements.into_iter().enumerate() {
        let path = format!("elements[{index}]");
        let element = element_from_json(&path, raw)?;
        if !seen.insert(element.id.clone()) {
            return Err(ValidationError::new(format!("{path}.id"), Problem::Duplicate));
        }
        elements.push(element);
    }

    let app_state = document.app_state.map(app_state_from_json).unwrap_or_default();
    let files = match document.files {
        Some(files) => files_from_json(files)?,
        None => BTreeMap::new(),
    };

    Ok(ScenePayload {
        version,
        source: document.source.unwrap_or_default(),
        scene: Scene { elements, app_state, files },
        extra: document.extra,
    })
}

fn element_to_json(element: &Element) -> ElementJson {
    let stamp = element.stamp();
    let style = &element.style;
    let mut json = ElementJson {
        id: Some(element.id.to_string()),
        kind: Some(element.type_tag().to_owned()),
        x: Some(element.x),
        y: Some(element.y),
        width: Some(element.width),
        height: Some(element.height),
        angle: Some(element.angle),
        stroke_color: Some(style.stroke_color.clone()),
        background_color: Some(style.background_color.clone()),
        fill_style: Some(style.fill_style.as_str().to_owned()),
        stroke_width: Some(style.stroke_width),
        stroke_style: Some(style.stroke_style.as_str().to_owned()),
        roughness: Some(style.roughness.into()),
        opacity: Some(style.opacity.into()),
        roundness: style.roundness.map(|r| RoundnessJson { kind: r.kind, value: r.value }),
        group_ids: Some(element.group_ids.iter().map(ToString::to_string).collect()),
        frame_id: element.frame_id.as_ref().map(ToString::to_string),
        bound_elements: (!element.bound_elements.is_empty()).then(|| {
            element
                .bound_elements
                .iter()
                .map(|bound| BoundElementJson {
                    id: bound.id.to_string(),
                    kind: Some(bound.kind.clone()),
                })
                .collect()
        }),
        link: element.link.clone(),
        locked: Some(element.locked),
        seed: Some(element.seed.into()),
        version: Some(stamp.version.into()),
        version_nonce: Some(stamp.version_nonce.into()),
        is_deleted: Some(element.is_deleted()),
        updated: Some(stamp.updated.into()),
        extra: element.extra.clone(),
        ..ElementJson::default()
    };

    match &element.kind {
        ElementKind::Shape(_) => {}
        ElementKind::Text(text) => {
            json.text = Some(text.text.clone());
            json.original_text = Some(text.original_text.clone());
            json.font_size = Some(text.font_size);
            json.font_family = Some(text.font_family.into());
            json.text_align = Some(text.text_align.as_str().to_owned());
            json.vertical_align = Some(text.vertical_align.as_str().to_owned());
            json.line_height = Some(text.line_height);
            json.container_id = text.container_id.as_ref().map(ToString::to_string);
        }
        ElementKind::Linear(linear) => {
            json.points = Some(points_to_json(&linear.points));
            json.start_binding = linear.start_binding.as_ref().map(binding_to_json);
            json.end_binding = linear.end_binding.as_ref().map(binding_to_json);
            json.start_arrowhead = linear.start_arrowhead.clone();
            json.end_arrowhead = linear.end_arrowhead.clone();
        }
        ElementKind::Freedraw(freedraw) => {
            json.points = Some(points_to_json(&freedraw.points));
            json.pressures = Some(freedraw.pressures.clone());
            json.simulate_pressure = Some(freedraw.simulate_pressure);
        }
        ElementKind::Image(image) => {
            json.file_id = image.file_id.as_ref().map(ToString::to_string);
            json.status = Some(image.status.as_str().to_owned());
            json.scale = Some([image.scale.0, image.scale.1]);
        }
        ElementKind::Frame(frame) => {
            json.name = frame.name.clone();
        }
    }
    json
}

fn element_from_json(path: &str, json: ElementJson) -> Result<Element> {
    let at = |field: &str| format!("{path}.{field}");
    let id: ElementId = json
        .id
        .and_then(|raw| Id::new(raw).ok())
        .ok_or_else(|| ValidationError::missing(at("id")))?;
    let type_tag = json.kind.ok_or_else(|| ValidationError::missing(at("type")))?;

    let kind = match type_tag.as_str() {
        "rectangle" => ElementKind::Shape(ShapeKind::Rectangle),
        "ellipse" => ElementKind::Shape(ShapeKind::Ellipse),
        "diamond" => ElementKind::Shape(ShapeKind::Diamond),
        "embeddable" => ElementKind::Shape(ShapeKind::Embeddable),
        "iframe" => ElementKind::Shape(ShapeKind::Iframe),
        "text" => {
            let text = json.text.ok_or_else(|| ValidationError::missing(at("text")))?;
            let defaults = TextData::new(String::new(), 20.0);
            ElementKind::Text(TextData {
                original_text: json.original_text.unwrap_or_else(|| text.clone()),
                text,
                font_size: json.font_size.unwrap_or(defaults.font_size),
                font_family: json.font_family.as_ref().map_or(defaults.font_family, wrapped_u32),
                text_align: json
                    .text_align
                    .as_deref()
                    .and_then(TextAlign::parse)
                    .unwrap_or_default(),
                vertical_align: json
                    .vertical_align
                    .as_deref()
                    .and_then(VerticalAlign::parse)
                    .unwrap_or_default(),
                line_height: json.line_height.unwrap_or(defaults.line_height),
                container_id: optional_id(json.container_id),
            })
        }
        "line" | "arrow" => ElementKind::Linear(LinearData {
            arrow: type_tag == "arrow",
            points: points_from_json(json.points),
            start_binding: binding_from_json(&at("startBinding"), json.start_binding)?,
            end_binding: binding_from_json(&at("endBinding"), json.end_binding)?,
            start_arrowhead: json.start_arrowhead,
            end_arrowhead: json.end_arrowhead,
        }),
        "freedraw" => ElementKind::Freedraw(FreedrawData {
            points: points_from_json(json.points),
            pressures: json.pressures.unwrap_or_default(),
            simulate_pressure: json.simulate_pressure.unwrap_or(true),
        }),
        "image" => ElementKind::Image(ImageData {
            file_id: optional_id(json.file_id),
            status: json.status.as_deref().and_then(ImageStatus::parse).unwrap_or_default(),
            scale: json.scale.map_or((1.0, 1.0), |[sx, sy]| (sx, sy)),
        }),
        "frame" | "magicframe" => {
            ElementKind::Frame(FrameData { name: json.name, magic: type_tag == "magicframe" })
        }
        _ => {
            return Err(ValidationError::new(
                at("type"),
                Problem::UnknownVariant { value: type_tag },
            ))
        }
    };

    let x = json.x.ok_or_else(|| ValidationError::missing(at("x")))?;
    let y = json.y.ok_or_else(|| ValidationError::missing(at("y")))?;

    let defaults = ElementStyle::default();
    let opacity = match json.opacity.as_ref().and_then(Number::as_f64) {
        Some(opacity) if !(0.0..=100.0).contains(&opacity) => {
            return Err(ValidationError::new(
                at("opacity"),
                Problem::OutOfRange { min: 0.0, max: 100.0 },
            ))
        }
        Some(opacity) => opacity.round() as u8,
        None => defaults.opacity,
    };
    let style = ElementStyle {
        stroke_color: json.stroke_color.unwrap_or(defaults.stroke_color),
        background_color: json.background_color.unwrap_or(defaults.background_color),
        fill_style: json.fill_style.as_deref().and_then(FillStyle::parse).unwrap_or_default(),
        stroke_width: json.stroke_width.unwrap_or(defaults.stroke_width),
        stroke_style: json.stroke_style.as_deref().and_then(StrokeStyle::parse).unwrap_or_default(),
        roughness: json.roughness.as_ref().map_or(defaults.roughness, clamped_u8),
        opacity,
        roundness: json.roundness.map(|r| Roundness { kind: r.kind, value: r.value }),
    };

    let stamp = VersionStamp {
        version: json.version.as_ref().map_or(1, saturating_u64),
        version_nonce: json.version_nonce.as_ref().map_or(0, wrapped_u32),
        updated: json.updated.as_ref().map_or(0, saturating_u64),
    };
    let is_deleted = json.is_deleted.unwrap_or(false);

    let (width, height) = (json.width.unwrap_or(0.0), json.height.unwrap_or(0.0));
    let mut element =
        Element::new(kind, x, y, width, height).with_id(id).with_stamp(stamp, is_deleted);
    element.angle = json.angle.unwrap_or(0.0);
    element.style = style;
    element.group_ids = json
        .group_ids
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| Id::new(raw).ok())
        .collect();
    element.frame_id = optional_id(json.frame_id);
    element.bound_elements = json
        .bound_elements
        .unwrap_or_default()
        .into_iter()
        .filter_map(|bound| {
            let id = Id::new(bound.id).ok()?;
            Some(BoundElement { id, kind: bound.kind.unwrap_or_else(|| "arrow".to_owned()) })
        })
        .collect();
    element.link = json.link;
    element.locked = json.locked.unwrap_or(false);
    element.seed = json.seed.as_ref().map_or(1, wrapped_u32);
    element.extra = json.extra;
    Ok(element)
}

fn points_to_json(points: &[Point]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.x, p.y]).collect()
}

fn points_from_json(points: Option<Vec<[f64; 2]>>) -> Vec<Point> {
    match points {
        Some(points) => points.into_iter().map(|[x, y]| Point::new(x, y)).collect(),
        None => vec![Point::ORIGIN],
    }
}

fn binding_to_json(binding: &PointBinding) -> BindingJson {
    BindingJson {
        element_id: binding.element_id.to_string(),
        focus: binding.focus,
        gap: binding.gap,
    }
}

fn binding_from_json(path: &str, binding: Option<BindingJson>) -> Result<Option<PointBinding>> {
    let Some(binding) = binding else {
        return Ok(None);
    };
    let element_id = Id::new(binding.element_id)
        .map_err(|_| ValidationError::missing(format!("{path}.elementId")))?;
    Ok(Some(PointBinding { element_id, focus: binding.focus, gap: binding.gap }))
}

fn app_state_to_json(state: &AppState) -> AppStateJson {
    let item = &state.item_defaults;
    AppStateJson {
        name: state.name.clone(),
        scroll_x: Some(state.scroll_x),
        scroll_y: Some(state.scroll_y),
        zoom: Some(ZoomJson::Wrapped { value: Some(state.zoom) }),
        grid_size: state.grid_size,
        view_background_color: Some(state.view_background_color.clone()),
        theme: Some(state.theme.clone()),
        active_tool: Some(ActiveToolJson::Wrapped {
            kind: Some(state.active_tool.as_str().to_owned()),
        }),
        selected_element_ids: Some(
            state
                .selected_element_ids
                .iter()
                .map(|id| (id.to_string(), Value::Bool(true)))
                .collect(),
        ),
        open_dialog: state.open_dialog.as_ref().map(|name| serde_json::json!({ "name": name })),
        current_item_stroke_color: Some(item.style.stroke_color.clone()),
        current_item_background_color: Some(item.style.background_color.clone()),
        current_item_fill_style: Some(item.style.fill_style.as_str().to_owned()),
        current_item_stroke_width: Some(item.style.stroke_width),
        current_item_stroke_style: Some(item.style.stroke_style.as_str().to_owned()),
        current_item_roughness: Some(item.style.roughness.into()),
        current_item_opacity: Some(item.style.opacity.into()),
        current_item_font_size: Some(item.font_size),
        current_item_font_family: Some(item.font_family.into()),
        current_item_text_align: Some(item.text_align.as_str().to_owned()),
        extra: state.extra.clone(),
    }
}

fn app_state_from_json(json: AppStateJson) -> AppState {
    let defaults = AppState::default();
    let item = ItemDefaults::default();
    let style = item.style;

    let zoom = match json.zoom {
        Some(ZoomJson::Plain(zoom) | ZoomJson::Wrapped { value: Some(zoom) }) => zoom,
        Some(ZoomJson::Wrapped { value: None }) | None => defaults.zoom,
    };
    let active_tool = match json.active_tool {
        Some(ActiveToolJson::Name(name) | ActiveToolJson::Wrapped { kind: Some(name) }) => {
            Tool::parse(&name).unwrap_or_default()
        }
        Some(ActiveToolJson::Wrapped { kind: None }) => Tool::default(),
        None => defaults.active_tool,
    };
    let selected_element_ids: BTreeSet<ElementId> = json
        .selected_element_ids
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, selected)| selected.as_bool() == Some(true))
        .filter_map(|(key, _)| ElementId::new(key).ok())
        .collect();
    let open_dialog = match json.open_dialog {
        Some(Value::String(name)) => Some(name),
        Some(Value::Object(map)) => map.get("name").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    };

    let item_defaults = ItemDefaults {
        style: ElementStyle {
            stroke_color: json.current_item_stroke_color.unwrap_or(style.stroke_color),
            background_color: json.current_item_background_color.unwrap_or(style.background_color),
            fill_style: json
                .current_item_fill_style
                .as_deref()
                .and_then(FillStyle::parse)
                .unwrap_or_default(),
            stroke_width: json.current_item_stroke_width.unwrap_or(style.stroke_width),
            stroke_style: json
                .current_item_stroke_style
                .as_deref()
                .and_then(StrokeStyle::parse)
                .unwrap_or_default(),
            roughness: json.current_item_roughness.as_ref().map_or(style.roughness, clamped_u8),
            opacity: json
                .current_item_opacity
                .as_ref()
                .and_then(Number::as_f64)
                .map_or(style.opacity, |opacity| opacity.round().clamp(0.0, 100.0) as u8),
            roundness: None,
        },
        font_size: json.current_item_font_size.unwrap_or(item.font_size),
        font_family: json.current_item_font_family.as_ref().map_or(item.font_family, wrapped_u32),
        text_align: json
            .current_item_text_align
            .as_deref()
            .and_then(TextAlign::parse)
            .unwrap_or_default(),
    };

    AppState {
        name: json.name,
        scroll_x: json.scroll_x.unwrap_or(defaults.scroll_x),
        scroll_y: json.scroll_y.unwrap_or(defaults.scroll_y),
        zoom: zoom.max(0.1),
        grid_size: json.grid_size,
        view_background_color: json.view_background_color.unwrap_or(defaults.view_background_color),
        theme: json.theme.unwrap_or(defaults.theme),
        active_tool,
        selected_element_ids,
        open_dialog,
        item_defaults,
        extra: json.extra,
    }
}

fn file_to_json(file: &FileData) -> FileJson {
    FileJson {
        id: Some(file.id.to_string()),
        mime_type: Some(file.mime_type.clone()),
        data_url: Some(file.data_url.clone()),
        created: Some(file.created.into()),
        last_retrieved: file.last_retrieved.map(Number::from),
        extra: file.extra.clone(),
    }
}

fn files_from_json(files: BTreeMap<String, FileJson>) -> Result<BTreeMap<FileId, FileData>> {
    let mut out = BTreeMap::new();
    for (key, json) in files {
        let path = format!("files.{key}");
        let key_id = FileId::new(key).map_err(|_| ValidationError::missing(path.clone()))?;
        let file = FileData {
            id: optional_id(json.id).unwrap_or_else(|| key_id.clone()),
            mime_type: json
                .mime_type
                .ok_or_else(|| ValidationError::missing(format!("{path}.mimeType")))?,
            data_url: json
                .data_url
                .ok_or_else(|| ValidationError::missing(format!("{path}.dataURL")))?,
            created: json.created.as_ref().map_or(0, saturating_u64),
            last_retrieved: json.last_retrieved.as_ref().map(saturating_u64),
            extra: json.extra,
        };
        out.insert(key_id, file);
    }
    Ok(out)
}

/// Empty ids read as absent.
fn optional_id<T>(raw: Option<String>) -> Option<Id<T>> {
    raw.and_then(|raw| Id::new(raw).ok())
}

/// Integers that other producers may emit as signed or fractional; wrapped into `u32`.
fn wrapped_u32(number: &Number) -> u32 {
    match number.as_i64() {
        Some(n) => n as u32,
        None => number.as_f64().map_or(0, |n| n as i64 as u32),
    }
}

fn saturating_u64(number: &Number) -> u64 {
    match number.as_u64() {
        Some(n) => n,
        None => number.as_f64().map_or(0, |n| n.max(0.0) as u64),
    }
}

fn clamped_u8(number: &Number) -> u8 {
    number.as_f64().map_or(0, |n| n.round().clamp(0.0, f64::from(u8::MAX)) as u8)
}
