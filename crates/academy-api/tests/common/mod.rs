//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use academy_api::routes;
use academy_api::state::AppState;
use academy_catalog::application::loader;
use academy_core::clock::Clock;
use academy_core::repository::{AuthService, RecordRepository};
use academy_core::user::{Role, User};
use academy_test_support::{ManualClock, RecordingRecordRepository, StaticAuthService};
use academy_training::domain::narration::VoicePreference;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// The candidate every test signs in as.
pub fn candidate() -> User {
    User {
        id: "u-7".to_owned(),
        name: "Morgan Blades".to_owned(),
        email: "morgan@academy.test".to_owned(),
        role: Role::Candidate,
    }
}

/// Handles the test keeps to drive time and inspect saved records.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub records: Arc<RecordingRecordRepository>,
}

/// Build the full app router over the built-in catalog with a manual clock
/// and an in-memory record repository. Uses the same route structure as
/// `main.rs`.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(RecordingRecordRepository::new()))
}

/// Like `build_test_app`, listing `records`' candidates for review.
pub fn build_test_app_with(records: Arc<RecordingRecordRepository>) -> TestApp {
    let clock = Arc::new(ManualClock::at_default_start());
    let auth = StaticAuthService::new(vec![(candidate(), "letmein".to_owned())]);
    let router = build_router(
        clock.clone(),
        records.clone(),
        Arc::new(auth),
    );
    TestApp {
        router,
        clock,
        records,
    }
}

/// Build the full app router over arbitrary collaborators.
pub fn build_router(
    clock: Arc<dyn Clock>,
    records: Arc<dyn RecordRepository>,
    auth: Arc<dyn AuthService>,
) -> Router {
    let app_state = AppState::new(
        clock,
        loader::builtin().unwrap(),
        records,
        auth,
        VoicePreference::default(),
    );
    routes::app(app_state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

/// Send a bodiless request and return the response.
pub async fn request(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    request(app, "GET", uri).await
}
