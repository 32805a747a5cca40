//! Declarative request validation.
//!
//! A [`RequestValidator`] runs a sequence of independent rules against a parsed
//! JSON body (and, for the content-type rule, a header value). Rules never
//! short-circuit: every failure is recorded as a [`FieldViolation`] so the
//! client receives the complete list in a single 400 response.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// Minimum accepted password length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Where in the request a violated field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Headers,
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub location: Location,
    /// Field name or path (`initialState[2].x`). Empty for the body as a whole.
    pub field: String,
    pub message: String,
    /// The offending value as received, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldViolation {
    pub fn body(field: impl Into<String>, message: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            location: Location::Body,
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

/// Client-facing rule messages.
pub mod messages {
    use super::MIN_PASSWORD_LENGTH;

    pub const INVALID: &str = "Request failed validation.";
    pub const CONTENT_TYPE: &str = "content-type header must be \"application/json\"";
    pub const BODY_NOT_OBJECT: &str = "Request body must be formatted as a JSON object.";
    pub const INCORRECT_CREDENTIALS: &str = "Incorrect username or password.";
    pub const NOT_LOGGED_IN: &str = "User must be logged in to use this endpoint.";

    pub fn required(field: &str) -> String {
        format!("'{field}' is a required field, but no value was provided.")
    }

    pub fn unique(field: &str) -> String {
        format!("'{field}' must be a unique value.")
    }

    pub fn wrong_type(field: &str, expected: &str) -> String {
        format!("The value of '{field}' provided was the wrong type. Expected: {expected}")
    }

    pub fn password_length() -> String {
        format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long.")
    }
}

/// The independent password strength rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    Length,
    Whitespace,
    Lowercase,
    Uppercase,
    Special,
}

impl PasswordRule {
    pub const ALL: [PasswordRule; 5] = [
        PasswordRule::Length,
        PasswordRule::Whitespace,
        PasswordRule::Lowercase,
        PasswordRule::Uppercase,
        PasswordRule::Special,
    ];

    pub fn is_satisfied_by(self, password: &str) -> bool {
        match self {
            PasswordRule::Length => password.chars().count() >= MIN_PASSWORD_LENGTH,
            // Must be non-empty as well as whitespace free.
            PasswordRule::Whitespace => {
                !password.is_empty() && !password.chars().any(char::is_whitespace)
            }
            PasswordRule::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordRule::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordRule::Special => password.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    pub fn message(self) -> String {
        match self {
            PasswordRule::Length => messages::password_length(),
            PasswordRule::Whitespace => "Password cannot contain whitespace.".into(),
            PasswordRule::Lowercase => "Password must contain at least 1 lowercase character.".into(),
            PasswordRule::Uppercase => "Password must contain at least 1 uppercase character.".into(),
            PasswordRule::Special => "Password must contain at least 1 special character.".into(),
        }
    }
}

/// Every password rule the given password violates, in declaration order.
pub fn password_violations(password: &str) -> Vec<PasswordRule> {
    PasswordRule::ALL
        .into_iter()
        .filter(|rule| !rule.is_satisfied_by(password))
        .collect()
}

/// Whether a JSON value counts as "provided" for the `required` rule.
///
/// `null`, the empty string and the empty array are treated as missing.
/// `false`, `0` and objects are provided.
pub fn is_provided(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// String form of a value as seen by string-based rules. Missing becomes `""`.
pub fn string_form(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Accumulates rule violations for one request.
pub struct RequestValidator<'a> {
    body: &'a Value,
    violations: Vec<FieldViolation>,
    redacted: Vec<&'static str>,
}

impl<'a> RequestValidator<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self {
            body,
            violations: Vec::new(),
            redacted: Vec::new(),
        }
    }

    /// Look up a top-level body field. `None` when the body is not an object.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.body.as_object().and_then(|map| map.get(name))
    }

    /// The `content-type` header must mention `application/json` (case-insensitive).
    pub fn json_content_type(&mut self, content_type: Option<&str>) -> &mut Self {
        let matches = content_type
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
        if !matches {
            self.violations.push(FieldViolation {
                location: Location::Headers,
                field: "content-type".into(),
                message: messages::CONTENT_TYPE.into(),
                value: content_type.map(|ct| Value::String(ct.to_string())),
            });
        }
        self
    }

    /// The parsed body must be a JSON object.
    pub fn body_is_object(&mut self) -> &mut Self {
        if !self.body.is_object() {
            self.violations.push(FieldViolation::body(
                "",
                messages::BODY_NOT_OBJECT,
                Some(self.body.clone()),
            ));
        }
        self
    }

    /// The field must be present and non-empty.
    pub fn required(&mut self, name: &str) -> &mut Self {
        let value = self.field(name);
        if !is_provided(value) {
            self.violations
                .push(FieldViolation::body(name, messages::required(name), value.cloned()));
        }
        self
    }

    /// Apply every [`PasswordRule`] to the string form of the field.
    pub fn password_policy(&mut self, name: &str) -> &mut Self {
        let value = self.field(name);
        let password = string_form(value);
        for rule in password_violations(&password) {
            self.violations
                .push(FieldViolation::body(name, rule.message(), value.cloned()));
        }
        self
    }

    /// Record an externally checked failure (e.g. a uniqueness lookup).
    pub fn reject(&mut self, name: &str, message: impl Into<String>) -> &mut Self {
        let value = self.field(name).cloned();
        self.violations.push(FieldViolation::body(name, message, value));
        self
    }

    /// Append violations found by a later stage, skipping fields already reported.
    pub fn merge(&mut self, violations: Vec<FieldViolation>) -> &mut Self {
        for violation in violations {
            let seen = self.violations.iter().any(|v| v.field == violation.field);
            if !seen {
                self.violations.push(violation);
            }
        }
        self
    }

    /// Replace reported values of this field with `"hidden"`.
    pub fn redact(&mut self, name: &'static str) -> &mut Self {
        self.redacted.push(name);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn finish(self) -> Result<(), CoreError> {
        if self.violations.is_empty() {
            return Ok(());
        }
        let redacted = self.redacted;
        let violations = self
            .violations
            .into_iter()
            .map(|mut v| {
                if v.value.is_some() && redacted.contains(&v.field.as_str()) {
                    v.value = Some(Value::String("hidden".into()));
                }
                v
            })
            .collect();
        Err(CoreError::Validation(violations))
    }
}
