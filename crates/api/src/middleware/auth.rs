//! Bearer-token authentication extractor for Axum handlers.
//!
//! Extraction never fails: a missing, malformed or rejected token yields
//! [`AuthContext::Anonymous`] and each handler decides, after its own
//! validation, whether to demand a login with [`AuthContext::require`].

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use marbles_core::error::CoreError;
use marbles_core::types::DbId;
use marbles_core::validation::messages;

use crate::auth::jwt::{verify_token, JwtConfig};
use crate::state::AppState;

/// The caller's identity, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Authenticated { id: DbId, username: String },
    Anonymous,
}

impl AuthContext {
    /// Resolve the context from request headers.
    pub fn from_headers(headers: &HeaderMap, config: &JwtConfig) -> Self {
        let Some(token) = bearer_token(headers) else {
            return AuthContext::Anonymous;
        };

        match verify_token(token, config) {
            Ok(claims) => AuthContext::Authenticated {
                id: claims.id,
                username: claims.username,
            },
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring rejected bearer token");
                AuthContext::Anonymous
            }
        }
    }

    /// The authenticated user's id, or 401 for anonymous callers.
    pub fn require(&self) -> Result<DbId, CoreError> {
        match self {
            AuthContext::Authenticated { id, .. } => Ok(*id),
            AuthContext::Anonymous => Err(CoreError::Unauthorized(messages::NOT_LOGGED_IN.into())),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(AuthContext::from_headers(&parts.headers, &state.config.jwt))
    }
}
