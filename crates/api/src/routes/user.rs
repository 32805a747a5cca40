//! Route definitions for the `/user` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{track, user};
use crate::state::AppState;

/// ```text
/// POST /user/register  -> register
/// POST /user/login     -> login
/// GET  /user/track     -> list_own (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(user::register))
        .route("/user/login", post(user::login))
        .route("/user/track", get(track::list_own))
}
