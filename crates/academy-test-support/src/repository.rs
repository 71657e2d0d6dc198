//! Test repositories: mock `RecordRepository` implementations for tests.

use std::sync::Mutex;

use academy_core::error::DomainError;
use academy_core::record::{CandidateHistory, CompletedTechniqueRecord, CustomerSessionRecord};
use academy_core::repository::RecordRepository;
use async_trait::async_trait;

/// A record repository that keeps every saved record in memory and returns
/// the configured candidate histories from `list_candidates`.
#[derive(Debug, Default)]
pub struct RecordingRecordRepository {
    candidates: Vec<CandidateHistory>,
    techniques: Mutex<Vec<CompletedTechniqueRecord>>,
    sessions: Mutex<Vec<CustomerSessionRecord>>,
}

impl RecordingRecordRepository {
    /// Create an empty recording repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that lists `candidates`.
    #[must_use]
    pub fn with_candidates(candidates: Vec<CandidateHistory>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    /// Returns a snapshot of all saved technique records.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_techniques(&self) -> Vec<CompletedTechniqueRecord> {
        self.techniques.lock().unwrap().clone()
    }

    /// Returns a snapshot of all saved customer session records.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_sessions(&self) -> Vec<CustomerSessionRecord> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordRepository for RecordingRecordRepository {
    async fn save_completed_technique(
        &self,
        record: &CompletedTechniqueRecord,
    ) -> Result<(), DomainError> {
        self.techniques.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn save_customer_session(
        &self,
        record: &CustomerSessionRecord,
    ) -> Result<(), DomainError> {
        self.sessions.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateHistory>, DomainError> {
        Ok(self.candidates.clone())
    }
}

/// A record repository that always returns an infrastructure error. Useful
/// for testing degraded persistence paths.
#[derive(Debug)]
pub struct FailingRecordRepository;

#[async_trait]
impl RecordRepository for FailingRecordRepository {
    async fn save_completed_technique(
        &self,
        _record: &CompletedTechniqueRecord,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save_customer_session(
        &self,
        _record: &CustomerSessionRecord,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateHistory>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
