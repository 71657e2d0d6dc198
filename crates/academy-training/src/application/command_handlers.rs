//! Command handlers for the Training context.
//!
//! These orchestrate a session's domain transitions with the persistence
//! collaborator: advance, and on completion report exactly once.

use academy_core::clock::Clock;
use academy_core::error::DomainError;
use academy_core::repository::RecordRepository;
use serde::Serialize;
use tracing::instrument;

use crate::application::session::{Progress, TrainingSession};
use crate::domain::completion::CompletionOutcome;

/// Result of a navigation command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The active step changed.
    Moved {
        /// New zero-based position.
        position: usize,
    },
    /// The session finished and its record was handed over.
    Completed(CompletionOutcome),
    /// The command had no effect.
    Unchanged,
}

/// Handles "next": advances the session and, if that completes it, reports
/// the record.
///
/// # Errors
///
/// Returns `DomainError` only if the reporter refuses the record, which
/// cannot happen for a session completed by this call.
#[instrument(skip_all, fields(session_id = %session.id()))]
pub async fn handle_next_step(
    session: &mut TrainingSession,
    clock: &dyn Clock,
    repo: &dyn RecordRepository,
) -> Result<StepOutcome, DomainError> {
    match session.next(clock) {
        Progress::Moved { position } => Ok(StepOutcome::Moved { position }),
        Progress::Unchanged => Ok(StepOutcome::Unchanged),
        Progress::Completed(record) => {
            let outcome = session.report(record, repo).await?;
            Ok(StepOutcome::Completed(outcome))
        }
    }
}

/// Handles "previous".
#[must_use]
pub fn handle_previous_step(session: &mut TrainingSession, clock: &dyn Clock) -> StepOutcome {
    match session.prev(clock) {
        Progress::Moved { position } => StepOutcome::Moved { position },
        Progress::Completed(_) | Progress::Unchanged => StepOutcome::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_catalog::application::loader;
    use academy_core::record::CompletionRecord;
    use academy_core::user::{Role, User};
    use academy_test_support::{FailingRecordRepository, ManualClock, RecordingRecordRepository};

    use crate::domain::narration::NarrationController;

    fn session(clock: &ManualClock) -> TrainingSession {
        let catalog = loader::load_from_str(
            r"
routines:
  - id: two
    name: Two Step
    kind: technique
    steps:
      - { title: A, instructions: a }
      - { title: B, instructions: b }
",
        )
        .unwrap();
        let user = User {
            id: "cand-1".to_owned(),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            role: Role::Candidate,
        };
        TrainingSession::start_technique(
            &catalog,
            "two",
            &user,
            NarrationController::disabled(),
            clock,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_handle_next_step_reports_on_completion() {
        // Arrange
        let clock = ManualClock::at_default_start();
        let repo = RecordingRecordRepository::new();
        let mut session = session(&clock);

        // Act
        clock.advance_millis(300);
        let first = handle_next_step(&mut session, &clock, &repo).await.unwrap();
        clock.advance_millis(200);
        let second = handle_next_step(&mut session, &clock, &repo).await.unwrap();
        let third = handle_next_step(&mut session, &clock, &repo).await.unwrap();

        // Assert
        assert!(matches!(first, StepOutcome::Moved { position: 1 }));
        match second {
            StepOutcome::Completed(outcome) => {
                assert!(outcome.persisted);
                assert_eq!(outcome.record.step_timings(), &[300, 200]);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert!(matches!(third, StepOutcome::Unchanged));
        assert_eq!(repo.saved_techniques().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_next_step_completes_despite_failed_save() {
        let clock = ManualClock::at_default_start();
        let mut session = session(&clock);

        handle_next_step(&mut session, &clock, &FailingRecordRepository)
            .await
            .unwrap();
        let outcome = handle_next_step(&mut session, &clock, &FailingRecordRepository)
            .await
            .unwrap();

        match outcome {
            StepOutcome::Completed(outcome) => {
                assert!(!outcome.persisted);
                assert!(matches!(outcome.record, CompletionRecord::Technique(_)));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_previous_step_at_start_is_unchanged() {
        let clock = ManualClock::at_default_start();
        let mut session = session(&clock);

        assert!(matches!(
            handle_previous_step(&mut session, &clock),
            StepOutcome::Unchanged
        ));
    }
}
