#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use clubhouse_activity::ActivityBus;
use clubhouse_api::config::ServerConfig;
use clubhouse_api::engine::RsvpEngine;
use clubhouse_api::router::build_app_router;
use clubhouse_api::state::AppState;
use clubhouse_core::types::DbId;
use clubhouse_db::models::event::{CreateEvent, Event};
use clubhouse_db::models::user::{CreateUser, User};
use clubhouse_db::repositories::{EventRepo, UserRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// The waitlist sweep is disabled; tests drive rebalancing explicitly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        waitlist_sweep_interval_secs: 0,
    }
}

/// Build the full application router, sharing the production middleware
/// stack, on top of the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone(), Arc::new(ActivityBus::default()));
    build_app_router(state, &config)
}

/// An engine wired to its own bus, for tests that bypass HTTP.
pub fn test_engine(pool: PgPool) -> (RsvpEngine, Arc<ActivityBus>) {
    let bus = Arc::new(ActivityBus::default());
    (RsvpEngine::new(pool, Arc::clone(&bus)), bus)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@club.test"),
        },
    )
    .await
    .unwrap()
}

pub async fn create_event(pool: &PgPool, title: &str, max_attendees: i32) -> Event {
    EventRepo::create(
        pool,
        &CreateEvent {
            title: title.to_string(),
            description: None,
            starts_at: Utc::now() + Duration::days(7),
            location: "Main hall".to_string(),
            max_attendees,
            host_id: None,
        },
    )
    .await
    .unwrap()
}

pub fn rsvp_uri(user_id: DbId, event_id: DbId) -> String {
    format!("/api/v1/rsvps/{user_id}/{event_id}")
}
