//! Loosely typed JSON request body extractor.
//!
//! Handlers validate the body themselves so every rule violation can be
//! reported at once; this extractor only captures the raw JSON and the
//! declared content type.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A request body parsed as untyped JSON, plus its `content-type` header.
///
/// An empty body, or one sent without a JSON content type, is treated as `{}`.
#[derive(Debug, Clone)]
pub struct RequestPayload {
    pub content_type: Option<String>,
    pub body: Value,
}

impl RequestPayload {
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

impl<S> FromRequest<S> for RequestPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = Bytes::from_request(req, state).await?;

        let mut payload = RequestPayload {
            content_type,
            body: Value::Object(Map::new()),
        };

        if payload.is_json() && !bytes.iter().all(u8::is_ascii_whitespace) {
            payload.body = serde_json::from_slice(&bytes)
                .map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {e}")))?;
        }

        Ok(payload)
    }
}
