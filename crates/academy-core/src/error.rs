//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A training session was not found.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// Requested data does not exist or has no steps to walk through.
    #[error("not available: {0}")]
    Unavailable(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
