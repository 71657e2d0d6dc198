//! Shared application state.

use std::sync::Arc;

use academy_catalog::domain::catalog::StepCatalog;
use academy_core::clock::Clock;
use academy_core::repository::{AuthService, RecordRepository};
use academy_training::domain::narration::VoicePreference;

use crate::registry::SessionRegistry;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for deterministic time.
    pub clock: Arc<dyn Clock>,
    /// The technique/service table.
    pub catalog: Arc<StepCatalog>,
    /// Persistence collaborator for completion records.
    pub records: Arc<dyn RecordRepository>,
    /// Authentication collaborator.
    pub auth: Arc<dyn AuthService>,
    /// Voice choice for narration.
    pub voice_preference: Arc<VoicePreference>,
    /// Sessions in progress or awaiting dismissal.
    pub sessions: SessionRegistry,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog_fingerprint", &self.catalog.fingerprint())
            .field("voice_preference", &self.voice_preference)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        catalog: StepCatalog,
        records: Arc<dyn RecordRepository>,
        auth: Arc<dyn AuthService>,
        voice_preference: VoicePreference,
    ) -> Self {
        Self {
            clock,
            catalog: Arc::new(catalog),
            records,
            auth,
            voice_preference: Arc::new(voice_preference),
            sessions: SessionRegistry::default(),
        }
    }
}
