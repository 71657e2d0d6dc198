//! External collaborator abstractions: persistence and authentication.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::record::{CandidateHistory, CompletedTechniqueRecord, CustomerSessionRecord};
use crate::user::{AuthOutcome, Credentials};

/// Repository trait for appending completion records and reading them back
/// for review.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Append a completed technique run to the user's history.
    async fn save_completed_technique(
        &self,
        record: &CompletedTechniqueRecord,
    ) -> Result<(), DomainError>;

    /// Append a completed live session to the user's history.
    async fn save_customer_session(&self, record: &CustomerSessionRecord)
    -> Result<(), DomainError>;

    /// Load every user together with their records.
    async fn list_candidates(&self) -> Result<Vec<CandidateHistory>, DomainError>;
}

/// Authentication collaborator. Rejections are reported through
/// `AuthOutcome`; `Err` is reserved for transport failures.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Sign a user in.
    async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, DomainError>;

    /// Create an account.
    async fn register(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, DomainError>;

    /// Replace the password of an existing account.
    async fn reset_password(&self, credentials: &Credentials) -> Result<AuthOutcome, DomainError>;
}
