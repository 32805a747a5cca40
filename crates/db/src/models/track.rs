//! Track entity model and read views.

use marbles_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::body::StoredBody;

/// A row from the `tracks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    #[serde(rename = "previewOnPlayback")]
    pub preview_on_playback: bool,
    pub volume: f64,
}

/// One entry of a track listing, joined with the owner's username.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TrackSummary {
    pub id: DbId,
    pub name: String,
    pub username: String,
}

/// A track together with its bodies, as returned by `GET /track/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackWithBodies {
    #[serde(flatten)]
    pub track: Track,
    #[serde(rename = "initialState")]
    pub initial_state: Vec<StoredBody>,
}
