//! Routes for browsing techniques and services.

use academy_catalog::domain::step::{Routine, RoutineKind};
use academy_core::error::DomainError;
use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Restrict the listing to techniques or services.
    pub kind: Option<RoutineKind>,
}

/// A sub-service as shown in the service picker.
#[derive(Debug, Serialize)]
pub struct SubServiceSummary {
    /// Sub-service identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Number of steps.
    pub step_count: usize,
}

/// A routine as shown in the catalog listing.
#[derive(Debug, Serialize)]
pub struct RoutineSummary {
    /// Routine identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Technique or service.
    pub kind: RoutineKind,
    /// Category heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Short description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of steps; zero means the routine cannot be started yet.
    pub step_count: usize,
    /// Variants of a service.
    pub sub_services: Vec<SubServiceSummary>,
}

impl From<&Routine> for RoutineSummary {
    fn from(routine: &Routine) -> Self {
        Self {
            id: routine.id.clone(),
            name: routine.name.clone(),
            kind: routine.kind,
            category: routine.category.clone(),
            description: routine.description.clone(),
            step_count: routine.steps.len(),
            sub_services: routine
                .sub_services
                .iter()
                .map(|sub| SubServiceSummary {
                    id: sub.id.clone(),
                    name: sub.name.clone(),
                    step_count: sub.steps.len(),
                })
                .collect(),
        }
    }
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// Identifies the catalog revision.
    pub fingerprint: String,
    /// Routines in catalog order.
    pub routines: Vec<RoutineSummary>,
}

/// GET /
#[instrument(skip(state))]
async fn list_routines(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        fingerprint: state.catalog.fingerprint().to_owned(),
        routines: state
            .catalog
            .routines(query.kind)
            .map(RoutineSummary::from)
            .collect(),
    })
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_routine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Routine>, ApiError> {
    let routine = state
        .catalog
        .get(&id)
        .cloned()
        .ok_or_else(|| DomainError::Unavailable(format!("no routine named '{id}'")))?;
    Ok(Json(routine))
}

/// Returns the router for the catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routines))
        .route("/{id}", get(get_routine))
}
