//! Route definitions for the `/track` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::track;
use crate::state::AppState;

/// The collection is served with and without a trailing slash.
///
/// ```text
/// GET    /track       -> list
/// POST   /track       -> create (requires auth)
/// GET    /track/{id}  -> get_by_id
/// PUT    /track/{id}  -> update (owner only)
/// DELETE /track/{id}  -> delete (owner only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/track", get(track::list).post(track::create))
        .route("/track/", get(track::list).post(track::create))
        .route(
            "/track/{id}",
            get(track::get_by_id)
                .put(track::update)
                .delete(track::delete),
        )
}
