//! Route modules, one per area of the UI.

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod catalog;
pub mod health;
pub mod review;
pub mod sessions;

/// Assembles every router under its prefix. Layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/catalog", catalog::router())
        .nest("/api/v1/sessions", sessions::router())
        .nest("/api/v1/auth", auth::router())
        .nest("/api/v1/review", review::router())
        .with_state(state)
}
