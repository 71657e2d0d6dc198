//! Completion reporter: builds terminal records and hands them to the
//! persistence collaborator.

use academy_core::clock::Clock;
use academy_core::error::DomainError;
use academy_core::record::{
    CapturedImage, CompletedTechniqueRecord, CompletionRecord, CustomerDetails,
    CustomerSessionRecord, total_millis,
};
use academy_core::repository::RecordRepository;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// What the completion screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    /// The record that was submitted.
    pub record: CompletionRecord,
    /// Whether the backend accepted it. A failed save does not block the
    /// completion screen.
    pub persisted: bool,
}

/// Builds the record for a finished technique run.
#[must_use]
pub fn technique_record(
    user_id: &str,
    technique_id: &str,
    step_timings: Vec<u64>,
    clock: &dyn Clock,
) -> CompletedTechniqueRecord {
    CompletedTechniqueRecord {
        user_id: user_id.to_owned(),
        technique_id: technique_id.to_owned(),
        completed_at: clock.now(),
        total_time_ms: total_millis(&step_timings),
        step_timings,
    }
}

/// Inputs for a finished live session beyond the timings.
#[derive(Debug, Clone)]
pub struct LiveSessionSummary {
    /// Client session identifier.
    pub session_id: Uuid,
    /// Service identifier.
    pub service: String,
    /// Sub-service, if one was chosen.
    pub sub_service: Option<String>,
    /// Customer metadata.
    pub customer: CustomerDetails,
    /// Images in capture order.
    pub captured_images: Vec<CapturedImage>,
    /// Customer rating, if given.
    pub rating: Option<u8>,
}

/// Builds the record for a finished live session.
#[must_use]
pub fn customer_session_record(
    user_id: &str,
    summary: LiveSessionSummary,
    step_timings: Vec<u64>,
    clock: &dyn Clock,
) -> CustomerSessionRecord {
    CustomerSessionRecord {
        user_id: user_id.to_owned(),
        session_id: summary.session_id,
        completed_at: clock.now(),
        service: summary.service,
        sub_service: summary.sub_service,
        customer: summary.customer,
        total_time_ms: total_millis(&step_timings),
        step_timings,
        captured_images: summary.captured_images,
        rating: summary.rating,
    }
}

/// Submits a session's record at most once.
#[derive(Debug, Default)]
pub struct CompletionReporter {
    submitted: bool,
}

impl CompletionReporter {
    /// Creates a reporter that has not submitted anything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record has already been handed over.
    #[must_use]
    pub fn has_submitted(&self) -> bool {
        self.submitted
    }

    /// Hands `record` to the repository. A save failure is logged and
    /// reported through `persisted = false`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if this reporter already submitted.
    pub async fn submit(
        &mut self,
        record: CompletionRecord,
        repo: &dyn RecordRepository,
    ) -> Result<CompletionOutcome, DomainError> {
        if self.submitted {
            return Err(DomainError::Validation(
                "session has already been reported".to_owned(),
            ));
        }
        self.submitted = true;

        let saved = match &record {
            CompletionRecord::Technique(r) => repo.save_completed_technique(r).await,
            CompletionRecord::CustomerSession(r) => repo.save_customer_session(r).await,
        };
        let persisted = match saved {
            Ok(()) => {
                info!(total_time_ms = record.total_time_ms(), "completion record saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "completion record could not be saved");
                false
            }
        };
        Ok(CompletionOutcome { record, persisted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_test_support::{FailingRecordRepository, ManualClock, RecordingRecordRepository};

    #[tokio::test]
    async fn test_submit_saves_technique_record_with_total() {
        // Arrange
        let clock = ManualClock::at_default_start();
        let repo = RecordingRecordRepository::new();
        let mut reporter = CompletionReporter::new();
        let record = technique_record("u-1", "classic-bob", vec![2_000, 1_500, 3_000], &clock);

        // Act
        let outcome = reporter
            .submit(CompletionRecord::Technique(record), &repo)
            .await
            .unwrap();

        // Assert
        assert!(outcome.persisted);
        let saved = repo.saved_techniques();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].total_time_ms, 6_500);
        assert_eq!(saved[0].completed_at, clock.now());
    }

    #[tokio::test]
    async fn test_second_submit_is_rejected() {
        let clock = ManualClock::at_default_start();
        let repo = RecordingRecordRepository::new();
        let mut reporter = CompletionReporter::new();
        let record = CompletionRecord::Technique(technique_record("u-1", "bob", vec![1], &clock));

        reporter.submit(record.clone(), &repo).await.unwrap();
        let second = reporter.submit(record, &repo).await;

        assert!(matches!(second, Err(DomainError::Validation(_))));
        assert_eq!(repo.saved_techniques().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_still_returns_record() {
        let clock = ManualClock::at_default_start();
        let mut reporter = CompletionReporter::new();
        let record = CompletionRecord::Technique(technique_record("u-1", "bob", vec![5], &clock));

        let outcome = reporter
            .submit(record.clone(), &FailingRecordRepository)
            .await
            .unwrap();

        assert!(!outcome.persisted);
        assert_eq!(outcome.record, record);
        assert!(reporter.has_submitted());
    }

    #[tokio::test]
    async fn test_customer_session_with_no_captures_sends_empty_list() {
        let clock = ManualClock::at_default_start();
        let repo = RecordingRecordRepository::new();
        let mut reporter = CompletionReporter::new();
        let summary = LiveSessionSummary {
            session_id: Uuid::new_v4(),
            service: "cut-and-blow-dry".to_owned(),
            sub_service: None,
            customer: CustomerDetails {
                name: "Grace".to_owned(),
                ..CustomerDetails::default()
            },
            captured_images: Vec::new(),
            rating: Some(5),
        };
        let record = customer_session_record("u-1", summary, vec![100, 200], &clock);

        reporter
            .submit(CompletionRecord::CustomerSession(record), &repo)
            .await
            .unwrap();

        let saved = repo.saved_sessions();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].captured_images.is_empty());
        assert_eq!(saved[0].total_time_ms, 300);
        assert_eq!(saved[0].rating, Some(5));
    }
}
