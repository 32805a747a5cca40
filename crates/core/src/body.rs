//! Track bodies and the body sanitizer.
//!
//! A body is one placed element of a track. Its shape-specific fields depend
//! on the `type` tag, so [`BodyShape`] is a tagged union: a marble can never
//! carry a `frontColor` and a track-block can never carry a `note`.
//!
//! Clients send bodies as loosely typed JSON (numbers may arrive as strings,
//! flags as any truthy value). [`sanitize_body`] coerces that input into a
//! [`Body`], keeping only the fields whitelisted for its type.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::{messages, FieldViolation};

pub const MARBLE: &str = "marble";
pub const TRACK_BLOCK: &str = "track-block";
pub const NOTE_BLOCK: &str = "note-block";

/// A placed body: universal placement fields plus the per-type shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub is_static: bool,
    #[serde(flatten)]
    pub shape: BodyShape,
}

/// Per-type body fields, serialized with a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BodyShape {
    #[serde(rename_all = "camelCase")]
    Marble {
        radius: Option<f64>,
        camera_tracking: bool,
        gradient_start: Option<String>,
        gradient_end: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    TrackBlock {
        width: Option<f64>,
        height: Option<f64>,
        front_color: Option<String>,
        back_color: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    NoteBlock {
        width: Option<f64>,
        height: Option<f64>,
        gradient_start: Option<String>,
        gradient_end: Option<String>,
        note: Option<String>,
        octave: Option<String>,
        volume: Option<f64>,
    },
}

impl BodyShape {
    /// The `type` tag stored alongside the body.
    pub fn type_name(&self) -> &'static str {
        match self {
            BodyShape::Marble { .. } => MARBLE,
            BodyShape::TrackBlock { .. } => TRACK_BLOCK,
            BodyShape::NoteBlock { .. } => NOTE_BLOCK,
        }
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are false.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Parse a number or numeric string into a finite `f64`.
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Reads fields from one JSON object, collecting coercion failures.
struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
    violations: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    fn path_of(&self, key: &str) -> String {
        format!("{}.{key}", self.path)
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn number(&mut self, key: &str) -> f64 {
        match self.present(key) {
            Some(value) => self.parse_number(key, value).unwrap_or_default(),
            None => {
                let path = self.path_of(key);
                self.violations
                    .push(FieldViolation::body(&path, messages::required(&path), None));
                0.0
            }
        }
    }

    fn optional_number(&mut self, key: &str) -> Option<f64> {
        let value = self.present(key)?;
        self.parse_number(key, value)
    }

    fn parse_number(&mut self, key: &str, value: &Value) -> Option<f64> {
        let parsed = coerce_number(value);
        if parsed.is_none() {
            let path = self.path_of(key);
            self.violations.push(FieldViolation::body(
                &path,
                messages::wrong_type(&path, "number"),
                Some(value.clone()),
            ));
        }
        parsed
    }

    fn flag(&self, key: &str) -> bool {
        is_truthy(self.map.get(key))
    }

    fn text(&mut self, key: &str) -> Option<String> {
        match self.present(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            other => {
                let path = self.path_of(key);
                self.violations.push(FieldViolation::body(
                    &path,
                    messages::wrong_type(&path, "string"),
                    Some(other.clone()),
                ));
                None
            }
        }
    }
}

/// Sanitize one incoming body. `path` prefixes violation field names.
pub fn sanitize_body(value: &Value, path: &str) -> Result<Body, Vec<FieldViolation>> {
    let Some(map) = value.as_object() else {
        return Err(vec![FieldViolation::body(
            path,
            messages::wrong_type(path, "object"),
            Some(value.clone()),
        )]);
    };

    let mut reader = FieldReader {
        map,
        path,
        violations: Vec::new(),
    };

    let x = reader.number("x");
    let y = reader.number("y");
    let rotation = reader.number("rotation");
    let is_static = reader.flag("isStatic");

    let shape = match map.get("type").and_then(Value::as_str) {
        Some(MARBLE) => Some(BodyShape::Marble {
            radius: reader.optional_number("radius"),
            camera_tracking: reader.flag("cameraTracking"),
            gradient_start: reader.text("gradientStart"),
            gradient_end: reader.text("gradientEnd"),
        }),
        Some(TRACK_BLOCK) => Some(BodyShape::TrackBlock {
            width: reader.optional_number("width"),
            height: reader.optional_number("height"),
            front_color: reader.text("frontColor"),
            back_color: reader.text("backColor"),
        }),
        Some(NOTE_BLOCK) => Some(BodyShape::NoteBlock {
            width: reader.optional_number("width"),
            height: reader.optional_number("height"),
            gradient_start: reader.text("gradientStart"),
            gradient_end: reader.text("gradientEnd"),
            note: reader.text("note"),
            octave: reader.text("octave"),
            volume: reader.optional_number("volume"),
        }),
        _ => {
            let type_path = reader.path_of("type");
            reader.violations.push(FieldViolation::body(
                &type_path,
                messages::wrong_type(&type_path, "\"marble\" | \"track-block\" | \"note-block\""),
                map.get("type").cloned(),
            ));
            None
        }
    };

    match shape {
        Some(shape) if reader.violations.is_empty() => Ok(Body {
            x,
            y,
            rotation,
            is_static,
            shape,
        }),
        _ => Err(reader.violations),
    }
}

/// Sanitize a list of bodies, reporting violations from every element.
pub fn sanitize_bodies(value: &Value, field: &str) -> Result<Vec<Body>, Vec<FieldViolation>> {
    let Some(items) = value.as_array() else {
        return Err(vec![FieldViolation::body(
            field,
            messages::wrong_type(field, "array"),
            Some(value.clone()),
        )]);
    };

    let mut bodies = Vec::with_capacity(items.len());
    let mut violations = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match sanitize_body(item, &format!("{field}[{index}]")) {
            Ok(body) => bodies.push(body),
            Err(errs) => violations.extend(errs),
        }
    }

    if violations.is_empty() {
        Ok(bodies)
    } else {
        Err(violations)
    }
}
