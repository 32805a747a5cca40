//! Handlers for the `/track` resource and the caller's own track list.
//!
//! Mutating handlers check, in order: request validation, login, route id,
//! existence, then ownership.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marbles_core::error::CoreError;
use marbles_core::track::{TrackSubmission, TRACK_LIST_LIMIT};
use marbles_core::types::DbId;
use marbles_db::models::track::{TrackSummary, TrackWithBodies};
use marbles_db::repositories::TrackRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthContext;
use crate::payload::RequestPayload;
use crate::state::AppState;

const TRACK: &str = "track";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSaved {
    pub track_id: DbId,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a route id, treating anything non-numeric as an unknown track.
fn parse_track_id(raw: &str) -> AppResult<DbId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("There was no {TRACK} found with id {raw}")))
}

/// Check the track exists and the caller owns it.
async fn ensure_owner(state: &AppState, id: DbId, user_id: DbId) -> AppResult<()> {
    let track = TrackRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: TRACK, id })?;

    if track.user_id != user_id {
        tracing::warn!(
            track_id = id,
            user_id,
            owner_id = track.user_id,
            "Rejected change to another user's track"
        );
        return Err(CoreError::Forbidden(format!(
            "You do not have permission to modify {TRACK} {id}"
        ))
        .into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /track
///
/// The most recent tracks from every user.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<TrackSummary>>> {
    let tracks = TrackRepo::list_summaries(&state.pool, TRACK_LIST_LIMIT).await?;
    Ok(Json(tracks))
}

/// GET /user/track
///
/// Every track owned by the caller.
pub async fn list_own(
    State(state): State<AppState>,
    auth: AuthContext,
) -> AppResult<Json<Vec<TrackSummary>>> {
    let user_id = auth.require()?;
    let tracks = TrackRepo::list_summaries_for_user(&state.pool, user_id).await?;
    Ok(Json(tracks))
}

/// GET /track/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<TrackWithBodies>> {
    let id = parse_track_id(&raw_id)?;
    let track = TrackRepo::find_with_bodies(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: TRACK, id })?;
    Ok(Json(track))
}

/// POST /track
///
/// Save a new track owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: RequestPayload,
) -> AppResult<impl IntoResponse> {
    let submission = TrackSubmission::validate(payload.content_type(), &payload.body)?;
    let user_id = auth.require()?;

    let track_id = TrackRepo::create(&state.pool, user_id, &submission).await?;

    tracing::info!(
        user_id,
        track_id,
        body_count = submission.bodies.len(),
        "Track created"
    );
    Ok((
        StatusCode::CREATED,
        Json(TrackSaved {
            track_id,
            message: "New track saved!",
        }),
    ))
}

/// PUT /track/{id}
///
/// Overwrite one of the caller's tracks, replacing its whole body set.
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    auth: AuthContext,
    payload: RequestPayload,
) -> AppResult<impl IntoResponse> {
    let submission = TrackSubmission::validate(payload.content_type(), &payload.body)?;
    let user_id = auth.require()?;
    let id = parse_track_id(&raw_id)?;
    ensure_owner(&state, id, user_id).await?;

    let replaced = TrackRepo::replace(&state.pool, id, &submission).await?;
    if !replaced {
        return Err(CoreError::NotFound { entity: TRACK, id }.into());
    }

    tracing::info!(
        user_id,
        track_id = id,
        body_count = submission.bodies.len(),
        "Track updated"
    );
    Ok((
        StatusCode::CREATED,
        Json(TrackSaved {
            track_id: id,
            message: "Track updated!",
        }),
    ))
}

/// DELETE /track/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    auth: AuthContext,
) -> AppResult<StatusCode> {
    let user_id = auth.require()?;
    let id = parse_track_id(&raw_id)?;
    ensure_owner(&state, id, user_id).await?;

    if !TrackRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: TRACK, id }.into());
    }

    tracing::info!(user_id, track_id = id, "Track deleted");
    Ok(StatusCode::NO_CONTENT)
}
