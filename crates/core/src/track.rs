//! Track submissions (the payload of `POST /track` and `PUT /track/{id}`).

use serde_json::Value;

use crate::body::{coerce_number, is_truthy, sanitize_bodies, Body};
use crate::error::CoreError;
use crate::validation::{messages, FieldViolation, RequestValidator};

/// Maximum number of tracks returned by the public track listing.
pub const TRACK_LIST_LIMIT: i64 = 20;

/// A validated, sanitized track ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSubmission {
    pub name: String,
    pub preview_on_playback: bool,
    pub volume: f64,
    pub bodies: Vec<Body>,
}

impl TrackSubmission {
    /// Run the track route validators and, if they pass, sanitize the payload.
    ///
    /// Both stages always run and report through one [`CoreError::Validation`].
    /// A field flagged by the shape rules is not reported again by the sanitizer.
    pub fn validate(content_type: Option<&str>, payload: &Value) -> Result<Self, CoreError> {
        let mut validator = RequestValidator::new(payload);
        validator
            .json_content_type(content_type)
            .body_is_object()
            .required("name")
            .required("previewOnPlayback")
            .required("volume")
            .required("initialState");

        match Self::from_json(payload) {
            Ok(submission) => {
                validator.finish()?;
                Ok(submission)
            }
            Err(violations) => {
                validator.merge(violations);
                validator.finish()?;
                Err(CoreError::Internal(
                    "sanitizer failed without reporting a violation".into(),
                ))
            }
        }
    }

    /// Coerce an already shape-checked payload into a submission.
    pub fn from_json(payload: &Value) -> Result<Self, Vec<FieldViolation>> {
        let field = |name: &str| payload.get(name).filter(|v| !v.is_null());
        let mut violations = Vec::new();

        let name = match field("name") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            other => {
                violations.push(FieldViolation::body(
                    "name",
                    messages::wrong_type("name", "string"),
                    other.cloned(),
                ));
                String::new()
            }
        };

        let volume = match field("volume") {
            Some(value) => coerce_number(value).unwrap_or_else(|| {
                violations.push(FieldViolation::body(
                    "volume",
                    messages::wrong_type("volume", "number"),
                    Some(value.clone()),
                ));
                0.0
            }),
            None => {
                violations.push(FieldViolation::body("volume", messages::required("volume"), None));
                0.0
            }
        };

        let preview_on_playback = is_truthy(field("previewOnPlayback"));

        let initial_state = payload.get("initialState").unwrap_or(&Value::Null);
        let bodies = match sanitize_bodies(initial_state, "initialState") {
            Ok(bodies) => bodies,
            Err(errs) => {
                violations.extend(errs);
                Vec::new()
            }
        };

        if violations.is_empty() {
            Ok(Self {
                name,
                preview_on_playback,
                volume,
                bodies,
            })
        } else {
            Err(violations)
        }
    }
}
