//! Handlers for the `/user` resource (register, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marbles_core::error::CoreError;
use marbles_core::types::DbId;
use marbles_core::validation::{is_provided, messages, string_form, RequestValidator};
use marbles_db::models::user::CreateUser;
use marbles_db::repositories::UserRepo;
use serde::Serialize;

use crate::auth::jwt::issue_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::payload::RequestPayload;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: DbId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: DbId,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /user/register
///
/// Create an account. Every failed rule is reported; the password value is
/// never echoed back.
pub async fn register(
    State(state): State<AppState>,
    payload: RequestPayload,
) -> AppResult<impl IntoResponse> {
    let mut validator = RequestValidator::new(&payload.body);
    validator
        .json_content_type(payload.content_type())
        .body_is_object()
        .required("username");

    let username_value = validator.field("username");
    if is_provided(username_value) {
        let taken = UserRepo::username_exists(&state.pool, &string_form(username_value)).await?;
        if taken {
            validator.reject("username", messages::unique("username"));
        }
    }

    validator
        .required("password")
        .password_policy("password")
        .redact("password");
    validator.finish()?;

    let username = string_form(payload.body.get("username"));
    let password_hash = hash_password(&string_form(payload.body.get("password")))
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { id: user.id })))
}

/// POST /user/login
///
/// Exchange a username and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    payload: RequestPayload,
) -> AppResult<Json<LoginResponse>> {
    let mut validator = RequestValidator::new(&payload.body);
    validator
        .required("username")
        .required("password")
        .redact("password");
    validator.finish()?;

    let username = string_form(payload.body.get("username"));
    let password = string_form(payload.body.get("password"));

    let incorrect =
        || AppError::Core(CoreError::Unauthorized(messages::INCORRECT_CREDENTIALS.into()));

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(incorrect)?;

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(incorrect());
    }

    let token = issue_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse { id: user.id, token }))
}
