#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use marbles_api::auth::jwt::JwtConfig;
use marbles_api::config::ServerConfig;
use marbles_api::router::build_app_router;
use marbles_api::state::AppState;

/// A password that satisfies every strength rule.
pub const STRONG_PASSWORD: &str = "Str0ng!Passw0rd";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiry_hours: 1,
        },
    }
}

/// Build the full application router, sharing the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState {
        pool,
        config: Arc::new(test_config()),
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Register a user through the API and log in, returning `(id, token)`.
pub async fn register_and_login(pool: &PgPool, username: &str) -> (i64, String) {
    let credentials = json!({ "username": username, "password": STRONG_PASSWORD });

    let response = post_json(build_test_app(pool.clone()), "/user/register", credentials.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(build_test_app(pool.clone()), "/user/login", credentials).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    (
        json["id"].as_i64().unwrap(),
        json["token"].as_str().unwrap().to_string(),
    )
}

/// A track payload with one body of each type.
pub fn sample_track(name: &str) -> Value {
    json!({
        "name": name,
        "previewOnPlayback": true,
        "volume": 0.6,
        "initialState": [
            {
                "type": "marble", "x": 10, "y": 20, "rotation": 0, "isStatic": false,
                "radius": 12, "cameraTracking": true,
                "gradientStart": "#ff0000", "gradientEnd": "#0000ff",
                "frontColor": "green", "note": "C"
            },
            {
                "type": "track-block", "x": "30.5", "y": 40, "rotation": 0.25, "isStatic": true,
                "width": 100, "height": 8, "frontColor": "#222", "backColor": "#333",
                "radius": 99
            },
            {
                "type": "note-block", "x": 50, "y": 60, "rotation": 0,
                "width": 20, "height": 10, "gradientStart": "#aaa", "gradientEnd": "#bbb",
                "note": "E", "octave": 5, "volume": 0.4, "cameraTracking": true
            }
        ]
    })
}
