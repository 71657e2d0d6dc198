//! Routes for running technique training and live customer sessions.
//!
//! Every response carries the session view plus the narration commands
//! queued since the last response, so the page can play them right away.

use std::sync::Arc;

use academy_core::clock::Clock;
use academy_core::error::DomainError;
use academy_core::platform::{Camera, Frame, Voice};
use academy_core::record::CustomerDetails;
use academy_core::user::User;
use academy_training::application::command_handlers::{self, StepOutcome};
use academy_training::application::session::{LiveSessionRequest, SessionView, TrainingSession};
use academy_training::domain::completion::CompletionOutcome;
use academy_training::domain::narration::NarrationController;
use academy_training::domain::session_clock::format_elapsed;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::bridge::{BrowserCamera, BrowserNarration, NarrationCommand};
use crate::error::ApiError;
use crate::registry::ActiveSession;
use crate::state::AppState;

/// What the page reported about its speech synthesis.
#[derive(Debug, Deserialize)]
pub struct NarrationSupport {
    /// Voices the browser offers.
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// Request body for POST /techniques.
#[derive(Debug, Deserialize)]
pub struct StartTechniqueRequest {
    /// The signed-in user.
    pub user: User,
    /// Technique id or name.
    pub technique: String,
    /// Absent when the page has no speech synthesis.
    pub narration: Option<NarrationSupport>,
}

/// Request body for POST /live.
#[derive(Debug, Deserialize)]
pub struct StartLiveRequest {
    /// The signed-in user.
    pub user: User,
    /// Service id or name.
    pub service: String,
    /// Sub-service id or name.
    pub sub_service: Option<String>,
    /// Customer metadata.
    pub customer: CustomerDetails,
    /// Absent when the page has no speech synthesis.
    pub narration: Option<NarrationSupport>,
    /// Whether the page acquired a camera stream.
    #[serde(default)]
    pub camera: bool,
}

/// Request body for POST /{id}/captures.
#[derive(Debug, Deserialize)]
pub struct CaptureUpload {
    /// MIME type of the frame, e.g. `image/jpeg`.
    pub mime_type: String,
    /// Base64-encoded frame bytes.
    pub data: String,
}

/// Request body for PUT /{id}/rating.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    /// Customer rating, 1 to 5.
    pub rating: u8,
}

/// Narration actions the page can send.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationAction {
    /// Play/pause.
    Toggle,
    /// Silence narration.
    Mute,
    /// Re-enable narration.
    Unmute,
    /// Restart the current step.
    Replay,
    /// The browser finished (or failed) an utterance.
    Finished,
}

/// Query string of POST /{id}/narration/{action}.
#[derive(Debug, Default, Deserialize)]
pub struct NarrationQuery {
    /// For `finished`: the utterance number from the `speak` command.
    pub utterance: Option<u64>,
}

/// Response body describing a session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Current state.
    pub session: SessionView,
    /// Elapsed time for the on-screen timer, until the session ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_elapsed: Option<String>,
    /// Outcome of the completion, once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionOutcome>,
    /// Speech commands to play, oldest first.
    pub narration_commands: Vec<NarrationCommand>,
}

/// Response body for POST /{id}/next and /{id}/prev.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    /// What the navigation did.
    pub step: StepOutcome,
    /// State after the navigation.
    #[serde(flatten)]
    pub state: SessionResponse,
}

/// Response body for POST /{id}/captures.
#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    /// Whether the frame was stored; drives the flash acknowledgment.
    pub captured: bool,
    /// Images captured so far.
    pub capture_count: usize,
}

fn respond(active: &ActiveSession, clock: &dyn Clock) -> SessionResponse {
    SessionResponse {
        session: active.session.view(clock),
        display_elapsed: active.displayed_elapsed_ms().map(format_elapsed),
        completion: active.session.completion().cloned(),
        narration_commands: active
            .narration
            .as_ref()
            .map(|n| n.drain())
            .unwrap_or_default(),
    }
}

fn narration_for(
    state: &AppState,
    support: Option<NarrationSupport>,
) -> (NarrationController, Option<Arc<BrowserNarration>>) {
    match support {
        Some(support) => {
            let bridge = Arc::new(BrowserNarration::new(support.voices));
            let controller = NarrationController::new(bridge.clone(), &state.voice_preference);
            (controller, Some(bridge))
        }
        None => (NarrationController::disabled(), None),
    }
}

/// POST /techniques
#[instrument(skip(state, request), fields(technique = %request.technique, user_id = %request.user.id))]
async fn start_technique(
    State(state): State<AppState>,
    Json(request): Json<StartTechniqueRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let (narration, bridge) = narration_for(&state, request.narration);
    let session = TrainingSession::start_technique(
        &state.catalog,
        &request.technique,
        &request.user,
        narration,
        state.clock.as_ref(),
    )?;
    let active = ActiveSession::new(session, state.clock.clone(), bridge, None);
    let body = respond(&active, state.clock.as_ref());
    let session_id = state.sessions.insert(active).await;
    info!(%session_id, "session registered");
    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /live
#[instrument(skip(state, request), fields(service = %request.service, user_id = %request.user.id))]
async fn start_live(
    State(state): State<AppState>,
    Json(request): Json<StartLiveRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let (narration, bridge) = narration_for(&state, request.narration);
    let camera = request.camera.then(|| Arc::new(BrowserCamera::default()));
    let session = TrainingSession::start_live(
        &state.catalog,
        LiveSessionRequest {
            service: request.service,
            sub_service: request.sub_service,
            customer: request.customer,
        },
        &request.user,
        narration,
        camera.clone().map(|c| c as Arc<dyn Camera>),
        state.clock.as_ref(),
    )?;
    let active = ActiveSession::new(session, state.clock.clone(), bridge, camera);
    let body = respond(&active, state.clock.as_ref());
    let session_id = state.sessions.insert(active).await;
    info!(%session_id, "session registered");
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    Ok(Json(respond(&active, state.clock.as_ref())))
}

/// POST /{id}/next
#[instrument(skip(state))]
async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StepResponse>, ApiError> {
    let mut active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    let step = command_handlers::handle_next_step(
        &mut active.session,
        state.clock.as_ref(),
        &*state.records,
    )
    .await?;
    active.sync_lifecycle();
    if matches!(&step, StepOutcome::Completed(outcome) if !outcome.persisted) {
        warn!(session_id = %id, "completion shown without persistence");
    }
    Ok(Json(StepResponse {
        step,
        state: respond(&active, state.clock.as_ref()),
    }))
}

/// POST /{id}/prev
#[instrument(skip(state))]
async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StepResponse>, ApiError> {
    let mut active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    let step = command_handlers::handle_previous_step(&mut active.session, state.clock.as_ref());
    Ok(Json(StepResponse {
        step,
        state: respond(&active, state.clock.as_ref()),
    }))
}

/// POST /{id}/abort
#[instrument(skip(state))]
async fn abort_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    active.session.abort();
    active.sync_lifecycle();
    Ok(Json(respond(&active, state.clock.as_ref())))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn dismiss_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{id}/narration/{action}
#[instrument(skip(state))]
async fn narration_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(Uuid, NarrationAction)>,
    Query(query): Query<NarrationQuery>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    match action {
        NarrationAction::Toggle => active.session.toggle_narration(),
        NarrationAction::Mute => active.session.mute_narration(),
        NarrationAction::Unmute => active.session.unmute_narration(),
        NarrationAction::Replay => active.session.replay_narration(),
        NarrationAction::Finished => {
            let utterance = query.utterance.ok_or_else(|| {
                DomainError::Validation("finished must name the utterance".to_owned())
            })?;
            active.session.narration_finished(utterance);
        }
    }
    Ok(Json(respond(&active, state.clock.as_ref())))
}

/// GET /{id}/narration/commands
#[instrument(skip(state))]
async fn narration_commands(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<NarrationCommand>>, ApiError> {
    let active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    Ok(Json(
        active
            .narration
            .as_ref()
            .map(|n| n.drain())
            .unwrap_or_default(),
    ))
}

/// POST /{id}/captures
#[instrument(skip(state, upload), fields(mime_type = %upload.mime_type))]
async fn capture_frame(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(upload): Json<CaptureUpload>,
) -> Result<Json<CaptureResponse>, ApiError> {
    if !upload.mime_type.starts_with("image/") {
        return Err(DomainError::Validation(format!(
            "captures must be images, got '{}'",
            upload.mime_type
        ))
        .into());
    }
    let bytes = STANDARD
        .decode(upload.data.as_bytes())
        .map_err(|e| DomainError::Validation(format!("frame is not valid base64: {e}")))?;

    let mut active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    if let Some(camera) = &active.camera {
        camera.stage(Frame {
            mime_type: upload.mime_type,
            bytes,
        });
    }
    let captured = active.session.capture(state.clock.as_ref());
    let capture_count = active.session.view(state.clock.as_ref()).capture_count;
    Ok(Json(CaptureResponse {
        captured,
        capture_count,
    }))
}

/// PUT /{id}/rating
#[instrument(skip(state, request), fields(rating = request.rating))]
async fn set_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut active = state.sessions.checkout(id, state.clock.as_ref()).await?;
    active.session.set_rating(request.rating)?;
    Ok(Json(respond(&active, state.clock.as_ref())))
}

/// Returns the router for sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/techniques", post(start_technique))
        .route("/live", post(start_live))
        .route("/{id}", get(get_session).delete(dismiss_session))
        .route("/{id}/next", post(next_step))
        .route("/{id}/prev", post(previous_step))
        .route("/{id}/abort", post(abort_session))
        .route("/{id}/narration/commands", get(narration_commands))
        .route("/{id}/narration/{action}", post(narration_action))
        .route("/{id}/captures", post(capture_frame))
        .route("/{id}/rating", put(set_rating))
}
