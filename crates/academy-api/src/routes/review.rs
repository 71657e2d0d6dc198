//! Admin dashboard routes.

use academy_catalog::domain::step::RoutineKind;
use academy_core::error::DomainError;
use academy_training::application::review::{self, CandidateSummary, TechniqueStats};
use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /candidates
#[instrument(skip(state))]
async fn list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateSummary>>, ApiError> {
    let summaries = review::handle_candidate_review(&*state.records).await?;
    info!(candidates = summaries.len(), "candidate review loaded");
    Ok(Json(summaries))
}

/// GET /techniques/{id}
#[instrument(skip(state))]
async fn technique_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TechniqueStats>, ApiError> {
    let technique = state
        .catalog
        .get(&id)
        .filter(|routine| routine.kind == RoutineKind::Technique)
        .ok_or_else(|| DomainError::Unavailable(format!("no technique named '{id}'")))?;
    let stats = review::handle_technique_review(&technique.id, &*state.records).await?;
    Ok(Json(stats))
}

/// Returns the router for the admin dashboard.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/candidates", get(list_candidates))
        .route("/techniques/{id}", get(technique_detail))
}
