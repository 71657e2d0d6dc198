//! Terminal completion records handed to the persistence collaborator.
//!
//! Records are write-once snapshots. Ownership moves to the backend on
//! submission; the client keeps a copy only for the completion screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::User;

/// Sum of a list of step durations, in milliseconds.
#[must_use]
pub fn total_millis(step_timings: &[u64]) -> u64 {
    step_timings.iter().sum()
}

/// An image taken during a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    /// Zero-based index of the step active at capture time.
    pub step_index: usize,
    /// Title of the step active at capture time.
    pub step_title: String,
    /// `data:<mime>;base64,<payload>` URL of the encoded frame.
    pub image_data: String,
    /// When the frame was captured.
    pub timestamp: DateTime<Utc>,
}

/// Customer metadata gathered before a live session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Customer name.
    pub name: String,
    /// Phone number or email, if the customer gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Free-form notes (hair type, requests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A completed virtual technique training run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTechniqueRecord {
    /// The candidate who trained.
    pub user_id: String,
    /// Catalog identifier of the technique.
    pub technique_id: String,
    /// When the final step was left.
    pub completed_at: DateTime<Utc>,
    /// Duration of each step advanced through, in order.
    pub step_timings: Vec<u64>,
    /// Sum of `step_timings`.
    pub total_time_ms: u64,
}

/// A completed live session on a real customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSessionRecord {
    /// The candidate who worked the session.
    pub user_id: String,
    /// Client-generated session identifier.
    pub session_id: Uuid,
    /// When the final step was left.
    pub completed_at: DateTime<Utc>,
    /// Catalog identifier of the service.
    pub service: String,
    /// Sub-service chosen within the service, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_service: Option<String>,
    /// The customer worked on.
    pub customer: CustomerDetails,
    /// Duration of each step advanced through, in order.
    pub step_timings: Vec<u64>,
    /// Sum of `step_timings`.
    pub total_time_ms: u64,
    /// Captured images in capture order; empty when none were taken.
    #[serde(default)]
    pub captured_images: Vec<CapturedImage>,
    /// Customer satisfaction rating from 1 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

/// Terminal record of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionRecord {
    /// A virtual technique run.
    Technique(CompletedTechniqueRecord),
    /// A live customer session.
    CustomerSession(CustomerSessionRecord),
}

impl CompletionRecord {
    /// Per-step durations of the run.
    #[must_use]
    pub fn step_timings(&self) -> &[u64] {
        match self {
            Self::Technique(record) => &record.step_timings,
            Self::CustomerSession(record) => &record.step_timings,
        }
    }

    /// Total duration of the run.
    #[must_use]
    pub fn total_time_ms(&self) -> u64 {
        match self {
            Self::Technique(record) => record.total_time_ms,
            Self::CustomerSession(record) => record.total_time_ms,
        }
    }
}

/// A user together with every record the backend holds for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateHistory {
    /// The user.
    pub user: User,
    /// Completed virtual techniques.
    #[serde(default)]
    pub completed_techniques: Vec<CompletedTechniqueRecord>,
    /// Completed live sessions.
    #[serde(default)]
    pub customer_sessions: Vec<CustomerSessionRecord>,
}
