//! A single training or live session: the sequencer, clock, narration,
//! capture log and reporter bound to one routine and one user.

use std::sync::Arc;

use academy_catalog::application::narration_text::speakable_text;
use academy_catalog::domain::catalog::StepCatalog;
use academy_catalog::domain::step::{RoutineKind, StepDescriptor};
use academy_core::clock::Clock;
use academy_core::error::DomainError;
use academy_core::platform::Camera;
use academy_core::record::{CompletionRecord, CustomerDetails};
use academy_core::repository::RecordRepository;
use academy_core::user::User;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::capture::CaptureLog;
use crate::domain::completion::{
    CompletionOutcome, CompletionReporter, LiveSessionSummary, customer_session_record,
    technique_record,
};
use crate::domain::narration::{NarrationController, NarrationState};
use crate::domain::sequencer::{StepSequencer, Transition};
use crate::domain::session_clock::SessionClock;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Steps are being walked.
    Active,
    /// The last step was left and the record was submitted.
    Completed,
    /// The user left before the end; nothing was persisted.
    Aborted,
}

/// Everything needed to begin a live session.
#[derive(Debug, Clone)]
pub struct LiveSessionRequest {
    /// Service id or name.
    pub service: String,
    /// Sub-service id or name within the service.
    pub sub_service: Option<String>,
    /// Customer metadata gathered before starting.
    pub customer: CustomerDetails,
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The active step changed.
    Moved {
        /// New zero-based position.
        position: usize,
    },
    /// The session finished; the record still has to be reported.
    Completed(CompletionRecord),
    /// Nothing happened.
    Unchanged,
}

struct LiveContext {
    service: String,
    sub_service: Option<String>,
    customer: CustomerDetails,
    camera: Option<Arc<dyn Camera>>,
    capture_log: CaptureLog,
    rating: Option<u8>,
}

/// Read-only view of a session for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// Routine identifier.
    pub routine_id: String,
    /// Routine display name.
    pub routine_name: String,
    /// Technique or service.
    pub kind: RoutineKind,
    /// Sub-service, live sessions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_service: Option<String>,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Zero-based active step.
    pub position: usize,
    /// Total number of steps.
    pub step_count: usize,
    /// The active step.
    pub current_step: StepDescriptor,
    /// Durations recorded so far.
    pub step_timings: Vec<u64>,
    /// Time since the session started.
    pub elapsed_ms: u64,
    /// Narration state.
    pub narration: NarrationState,
    /// Whether voice controls are enabled.
    pub narration_available: bool,
    /// Whether the capture button is enabled.
    pub capture_enabled: bool,
    /// Number of captured images.
    pub capture_count: usize,
    /// Customer rating, live sessions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

/// A training run over one routine.
///
/// Narration and camera are released exactly once on completion, abort,
/// or drop.
pub struct TrainingSession {
    id: Uuid,
    user_id: String,
    routine_id: String,
    routine_name: String,
    kind: RoutineKind,
    sequencer: StepSequencer,
    session_clock: SessionClock,
    narration: NarrationController,
    live: Option<LiveContext>,
    reporter: CompletionReporter,
    status: SessionStatus,
    completion: Option<CompletionOutcome>,
    released: bool,
}

impl std::fmt::Debug for TrainingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingSession")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("routine_id", &self.routine_id)
            .field("position", &self.sequencer.position())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl TrainingSession {
    /// Starts virtual training on a technique.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unavailable` if the technique does not exist,
    /// is not a technique, or has no steps.
    pub fn start_technique(
        catalog: &StepCatalog,
        technique: &str,
        user: &User,
        narration: NarrationController,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let routine = catalog
            .get(technique)
            .filter(|r| r.kind == RoutineKind::Technique)
            .ok_or_else(|| DomainError::Unavailable(format!("no technique named '{technique}'")))?;
        let steps = catalog.steps_for(&routine.id, None)?.to_vec();
        let sequencer = StepSequencer::start(steps, clock)?;

        let mut session = Self {
            id: Uuid::new_v4(),
            user_id: user.id.clone(),
            routine_id: routine.id.clone(),
            routine_name: routine.name.clone(),
            kind: RoutineKind::Technique,
            sequencer,
            session_clock: SessionClock::start(clock),
            narration,
            live: None,
            reporter: CompletionReporter::new(),
            status: SessionStatus::Active,
            completion: None,
            released: false,
        };
        info!(session_id = %session.id, technique = %session.routine_id, user_id = %user.id, "technique training started");
        session.announce_current_step();
        Ok(session)
    }

    /// Starts a live session on a real customer. `camera` is acquired here;
    /// if it is absent or fails to start, capture is disabled.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the customer has no name, and
    /// `DomainError::Unavailable` if the service or sub-service does not
    /// exist or has no steps.
    pub fn start_live(
        catalog: &StepCatalog,
        request: LiveSessionRequest,
        user: &User,
        narration: NarrationController,
        camera: Option<Arc<dyn Camera>>,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        if request.customer.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "customer name is required".to_owned(),
            ));
        }
        let routine = catalog
            .get(&request.service)
            .filter(|r| r.kind == RoutineKind::Service)
            .ok_or_else(|| {
                DomainError::Unavailable(format!("no service named '{}'", request.service))
            })?;
        let steps = catalog
            .steps_for(&routine.id, request.sub_service.as_deref())?
            .to_vec();
        let sub_service = request
            .sub_service
            .as_deref()
            .and_then(|key| routine.sub_service(key))
            .map(|sub| sub.name.clone());
        let sequencer = StepSequencer::start(steps, clock)?;

        let camera = camera.and_then(|camera| match camera.start() {
            Ok(()) => Some(camera),
            Err(e) => {
                warn!(error = %e, "camera unavailable, capture disabled");
                None
            }
        });
        let capture_log = if camera.is_some() {
            CaptureLog::enabled()
        } else {
            CaptureLog::disabled()
        };

        let mut session = Self {
            id: Uuid::new_v4(),
            user_id: user.id.clone(),
            routine_id: routine.id.clone(),
            routine_name: routine.name.clone(),
            kind: RoutineKind::Service,
            sequencer,
            session_clock: SessionClock::start(clock),
            narration,
            live: Some(LiveContext {
                service: routine.id.clone(),
                sub_service,
                customer: request.customer,
                camera,
                capture_log,
                rating: None,
            }),
            reporter: CompletionReporter::new(),
            status: SessionStatus::Active,
            completion: None,
            released: false,
        };
        info!(session_id = %session.id, service = %session.routine_id, user_id = %user.id, "live session started");
        session.announce_current_step();
        Ok(session)
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Lifecycle status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// When the session started.
    #[must_use]
    pub fn session_clock(&self) -> SessionClock {
        self.session_clock
    }

    /// The completion outcome, once the session has completed.
    #[must_use]
    pub fn completion(&self) -> Option<&CompletionOutcome> {
        self.completion.as_ref()
    }

    /// Leaves the active step forward. On the last step this completes the
    /// session, releases platform resources and returns the record to report.
    pub fn next(&mut self, clock: &dyn Clock) -> Progress {
        if self.status != SessionStatus::Active {
            return Progress::Unchanged;
        }
        match self.sequencer.go_next(clock) {
            Transition::Moved { position } => {
                self.announce_current_step();
                Progress::Moved { position }
            }
            Transition::Completed { step_timings } => {
                self.release();
                self.status = SessionStatus::Completed;
                info!(session_id = %self.id, steps = step_timings.len(), "session completed");
                Progress::Completed(self.build_record(step_timings, clock))
            }
            Transition::Unchanged => Progress::Unchanged,
        }
    }

    /// Steps back one position.
    pub fn prev(&mut self, clock: &dyn Clock) -> Progress {
        if self.status != SessionStatus::Active {
            return Progress::Unchanged;
        }
        match self.sequencer.go_prev(clock) {
            Transition::Moved { position } => {
                self.announce_current_step();
                Progress::Moved { position }
            }
            Transition::Completed { .. } | Transition::Unchanged => Progress::Unchanged,
        }
    }

    /// Submits the completion record through this session's reporter and
    /// keeps the outcome for the completion screen.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session is not completed or
    /// was already reported.
    pub async fn report(
        &mut self,
        record: CompletionRecord,
        repo: &dyn RecordRepository,
    ) -> Result<CompletionOutcome, DomainError> {
        if self.status != SessionStatus::Completed {
            return Err(DomainError::Validation(
                "only completed sessions can be reported".to_owned(),
            ));
        }
        let outcome = self.reporter.submit(record, repo).await?;
        self.completion = Some(outcome.clone());
        Ok(outcome)
    }

    /// Leaves the session without completing it. Nothing is persisted and
    /// the step in progress records no timing.
    pub fn abort(&mut self) {
        if self.status != SessionStatus::Active {
            return;
        }
        self.release();
        self.status = SessionStatus::Aborted;
        info!(
            session_id = %self.id,
            position = self.sequencer.position(),
            recorded_steps = self.sequencer.step_timings().len(),
            "session aborted"
        );
    }

    /// Play/pause the narration.
    pub fn toggle_narration(&mut self) {
        if self.status == SessionStatus::Active {
            self.narration.toggle();
        }
    }

    /// Silence narration for this and future steps.
    pub fn mute_narration(&mut self) {
        if self.status == SessionStatus::Active {
            self.narration.mute();
        }
    }

    /// Re-enable narration from the next step entry.
    pub fn unmute_narration(&mut self) {
        if self.status == SessionStatus::Active {
            self.narration.unmute();
        }
    }

    /// Speak the current step again from the start.
    pub fn replay_narration(&mut self) {
        if self.status == SessionStatus::Active {
            self.narration.replay();
        }
    }

    /// The narration engine finished or failed utterance `utterance`.
    pub fn narration_finished(&mut self, utterance: u64) {
        self.narration.engine_finished(utterance);
    }

    /// Captures the camera's current frame, tagged with the active step.
    /// Returns `true` when an image was stored.
    pub fn capture(&mut self, clock: &dyn Clock) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }
        let step_index = self.sequencer.position();
        let step_title = self.sequencer.current_step().title.clone();
        let Some(live) = self.live.as_mut() else {
            return false;
        };
        let Some(camera) = &live.camera else {
            return false;
        };
        match camera.capture_frame() {
            Ok(frame) => {
                let stored = live
                    .capture_log
                    .capture(&frame, step_index, &step_title, clock);
                debug!(session_id = %self.id, step_index, stored, "frame captured");
                stored
            }
            Err(e) => {
                warn!(error = %e, "frame capture failed");
                false
            }
        }
    }

    /// Records the customer's rating (1 to 5) before the session completes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the rating is out of range, the
    /// session is not a live session, or it is no longer active.
    pub fn set_rating(&mut self, rating: u8) -> Result<(), DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::Validation(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        if self.status != SessionStatus::Active {
            return Err(DomainError::Validation(
                "session is no longer active".to_owned(),
            ));
        }
        let live = self.live.as_mut().ok_or_else(|| {
            DomainError::Validation("only live sessions can be rated".to_owned())
        })?;
        live.rating = Some(rating);
        Ok(())
    }

    /// Snapshot for the UI.
    #[must_use]
    pub fn view(&self, clock: &dyn Clock) -> SessionView {
        SessionView {
            session_id: self.id,
            routine_id: self.routine_id.clone(),
            routine_name: self.routine_name.clone(),
            kind: self.kind,
            sub_service: self.live.as_ref().and_then(|l| l.sub_service.clone()),
            status: self.status,
            position: self.sequencer.position(),
            step_count: self.sequencer.len(),
            current_step: self.sequencer.current_step().clone(),
            step_timings: self.sequencer.step_timings().to_vec(),
            elapsed_ms: self.session_clock.elapsed_millis(clock),
            narration: self.narration.state(),
            narration_available: self.narration.is_available(),
            capture_enabled: self.status == SessionStatus::Active
                && self.live.as_ref().is_some_and(|l| l.capture_log.is_enabled()),
            capture_count: self.live.as_ref().map_or(0, |l| l.capture_log.len()),
            rating: self.live.as_ref().and_then(|l| l.rating),
        }
    }

    fn announce_current_step(&mut self) {
        let text = speakable_text(&self.sequencer.current_step().instructions);
        self.narration.step_entered(text);
    }

    fn build_record(&self, step_timings: Vec<u64>, clock: &dyn Clock) -> CompletionRecord {
        match &self.live {
            None => CompletionRecord::Technique(technique_record(
                &self.user_id,
                &self.routine_id,
                step_timings,
                clock,
            )),
            Some(live) => CompletionRecord::CustomerSession(customer_session_record(
                &self.user_id,
                LiveSessionSummary {
                    session_id: self.id,
                    service: live.service.clone(),
                    sub_service: live.sub_service.clone(),
                    customer: live.customer.clone(),
                    captured_images: live.capture_log.images().to_vec(),
                    rating: live.rating,
                },
                step_timings,
                clock,
            )),
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.narration.release();
        if let Some(camera) = self.live.as_ref().and_then(|l| l.camera.as_ref()) {
            camera.stop();
        }
    }
}

impl Drop for TrainingSession {
    fn drop(&mut self) {
        self.release();
    }
}
