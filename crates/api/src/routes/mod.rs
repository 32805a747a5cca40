pub mod health;
pub mod track;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                 service and database health
///
/// /user/register          register (public)
/// /user/login             login (public)
/// /user/track             caller's tracks (requires auth)
///
/// /track                  list (public), create (requires auth)
/// /track/{id}             get (public), replace, delete (owner only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(user::router())
        .merge(track::router())
}
