//! Shared test mocks and utilities for the Salon Academy training engine.

mod auth;
mod clock;
mod platform;
mod repository;

pub use auth::StaticAuthService;
pub use clock::{FixedClock, ManualClock};
pub use platform::{NarrationCall, RecordingNarrationEngine, StubCamera};
pub use repository::{FailingRecordRepository, RecordingRecordRepository};
