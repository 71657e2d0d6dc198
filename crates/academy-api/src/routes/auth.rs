//! Sign-in routes, proxied to the academy backend.
//!
//! A rejection comes back as an `AuthOutcome` with `success: false` and a
//! non-2xx status; backend outages map through `ApiError`.

use academy_core::user::{AuthOutcome, Credentials};
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /register.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name for the new account.
    pub name: String,
    /// Login details for the new account.
    #[serde(flatten)]
    pub credentials: Credentials,
}

fn with_status(outcome: AuthOutcome, rejected: StatusCode) -> (StatusCode, Json<AuthOutcome>) {
    let status = if outcome.success {
        StatusCode::OK
    } else {
        rejected
    };
    (status, Json(outcome))
}

/// POST /login
#[instrument(skip(state, credentials), fields(identifier = %credentials.identifier, role = ?credentials.role))]
async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthOutcome>), ApiError> {
    let outcome = state.auth.login(&credentials).await?;
    info!(success = outcome.success, "login handled");
    Ok(with_status(outcome, StatusCode::UNAUTHORIZED))
}

/// POST /register
#[instrument(skip(state, request), fields(identifier = %request.credentials.identifier, role = ?request.credentials.role))]
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthOutcome>), ApiError> {
    let outcome = state
        .auth
        .register(&request.name, &request.credentials)
        .await?;
    info!(success = outcome.success, "registration handled");
    Ok(with_status(outcome, StatusCode::BAD_REQUEST))
}

/// POST /reset-password
#[instrument(skip(state, credentials), fields(identifier = %credentials.identifier))]
async fn reset_password(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthOutcome>), ApiError> {
    let outcome = state.auth.reset_password(&credentials).await?;
    info!(success = outcome.success, "password reset handled");
    Ok(with_status(outcome, StatusCode::BAD_REQUEST))
}

/// Returns the router for authentication.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/reset-password", post(reset_password))
}
