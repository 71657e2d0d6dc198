//! In-process registry of sessions.
//!
//! Each session screen owns one entry: the training session, its display
//! ticker, and the browser bridges. The ticker is dropped as soon as the
//! session ends; the entry itself stays until the screen dismisses it so
//! the completion screen can still read it. Entries nobody has touched for
//! longer than the session TTL are swept, since a closed page never sends
//! its dismissal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use academy_core::clock::{Clock, millis_between};
use academy_core::error::DomainError;
use academy_training::application::session::{SessionStatus, TrainingSession};
use academy_training::application::ticker::{DISPLAY_PERIOD, DisplayTicker};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

use crate::bridge::{BrowserCamera, BrowserNarration};

/// One session screen's resources.
#[derive(Debug)]
pub struct ActiveSession {
    /// The session state machine.
    pub session: TrainingSession,
    /// Elapsed-time publisher; `None` once the session has ended.
    pub ticker: Option<DisplayTicker>,
    /// Narration command queue, if the page has speech synthesis.
    pub narration: Option<Arc<BrowserNarration>>,
    /// Upload slot for frames, if the page has a camera.
    pub camera: Option<Arc<BrowserCamera>>,
    last_touched: DateTime<Utc>,
}

impl ActiveSession {
    /// Wraps `session`, starting its display ticker.
    #[must_use]
    pub fn new(
        session: TrainingSession,
        clock: Arc<dyn Clock>,
        narration: Option<Arc<BrowserNarration>>,
        camera: Option<Arc<BrowserCamera>>,
    ) -> Self {
        let last_touched = clock.now();
        let ticker = DisplayTicker::spawn(session.session_clock(), clock, DISPLAY_PERIOD);
        Self {
            session,
            ticker: Some(ticker),
            narration,
            camera,
            last_touched,
        }
    }

    /// Records that the page used this session at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_touched = now;
    }

    /// Whether the page has been silent for at least `ttl`.
    #[must_use]
    pub fn is_idle(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        u128::from(millis_between(self.last_touched, now)) >= ttl.as_millis()
    }

    /// Stops the ticker once the session is no longer active.
    pub fn sync_lifecycle(&mut self) {
        if self.session.status() != SessionStatus::Active {
            self.ticker = None;
        }
    }

    /// Elapsed time as last published by the ticker.
    #[must_use]
    pub fn displayed_elapsed_ms(&self) -> Option<u64> {
        self.ticker.as_ref().map(DisplayTicker::elapsed_millis)
    }
}

/// Shared map from session id to its screen resources.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<ActiveSession>>>>>,
}

impl SessionRegistry {
    /// Registers a session and returns its id.
    pub async fn insert(&self, active: ActiveSession) -> Uuid {
        let id = active.session.id();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(active)));
        id
    }

    /// Looks a session up.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no such session exists.
    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<ActiveSession>>, DomainError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DomainError::SessionNotFound(id))
    }

    /// Locks a session for a request and marks it as touched.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no such session exists.
    pub async fn checkout(
        &self,
        id: Uuid,
        clock: &dyn Clock,
    ) -> Result<OwnedMutexGuard<ActiveSession>, DomainError> {
        let mut active = self.get(id).await?.lock_owned().await;
        active.touch(clock.now());
        Ok(active)
    }

    /// Removes a session, aborting it if still active. Dropping the entry
    /// releases its ticker, narration and camera.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no such session exists.
    pub async fn remove(&self, id: Uuid) -> Result<(), DomainError> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(DomainError::SessionNotFound(id))?;
        let mut active = entry.lock().await;
        active.session.abort();
        active.sync_lifecycle();
        info!(session_id = %id, "session dismissed");
        Ok(())
    }

    /// Removes every session idle for at least `ttl`, aborting the active
    /// ones. Sessions locked by a request in flight are skipped. Returns how
    /// many were removed.
    pub async fn sweep_idle(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let expired: Vec<(Uuid, Arc<Mutex<ActiveSession>>)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| {
                    entry
                        .try_lock()
                        .is_ok_and(|active| active.is_idle(now, ttl))
                })
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|entry| (id, entry)))
                .collect()
        };
        for (id, entry) in &expired {
            let mut active = entry.lock().await;
            active.session.abort();
            active.sync_lifecycle();
            info!(session_id = %id, "idle session swept");
        }
        expired.len()
    }

    /// Spawns a task that sweeps idle sessions every `period`. The task
    /// runs until the returned handle is aborted.
    #[must_use]
    pub fn spawn_sweeper(
        &self,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        period: Duration,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let swept = registry.sweep_idle(clock.now(), ttl).await;
                debug!(swept, "session sweep finished");
            }
        })
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are registered.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_catalog::application::loader;
    use academy_core::user::{Role, User};
    use academy_test_support::{FixedClock, ManualClock};
    use academy_training::domain::narration::NarrationController;
    use chrono::Utc;

    fn active_session(clock: &Arc<dyn Clock>) -> ActiveSession {
        let user = User {
            id: "u-1".to_owned(),
            name: "Ada".to_owned(),
            email: "ada@academy.test".to_owned(),
            role: Role::Candidate,
        };
        let session = TrainingSession::start_technique(
            &loader::builtin().unwrap(),
            "classic-bob",
            &user,
            NarrationController::disabled(),
            clock.as_ref(),
        )
        .unwrap();
        ActiveSession::new(session, clock.clone(), None, None)
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_session() {
        // Arrange
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc::now()));
        let registry = SessionRegistry::default();

        // Act
        let id = registry.insert(active_session(&clock)).await;

        // Assert
        let entry = registry.get(id).await.unwrap();
        assert_eq!(entry.lock().await.session.id(), id);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_ended_session_stops_ticker() {
        // Arrange
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc::now()));
        let mut active = active_session(&clock);
        assert_eq!(active.displayed_elapsed_ms(), Some(0));

        // Act
        active.session.abort();
        active.sync_lifecycle();

        // Assert
        assert!(active.ticker.is_none());
        assert_eq!(active.displayed_elapsed_ms(), None);
    }

    #[tokio::test]
    async fn test_sweep_aborts_and_drops_idle_active_session() {
        // Arrange
        let manual = Arc::new(ManualClock::at_default_start());
        let clock: Arc<dyn Clock> = manual.clone();
        let registry = SessionRegistry::default();
        let id = registry.insert(active_session(&clock)).await;
        let entry = registry.get(id).await.unwrap();
        let ttl = Duration::from_secs(60);

        // Act
        manual.advance_millis(30_000);
        let early = registry.sweep_idle(clock.now(), ttl).await;
        manual.advance_millis(30_000);
        let swept = registry.sweep_idle(clock.now(), ttl).await;

        // Assert
        assert_eq!(early, 0);
        assert_eq!(swept, 1);
        assert!(registry.is_empty().await);
        let active = entry.lock().await;
        assert_eq!(active.session.status(), SessionStatus::Aborted);
        assert!(active.ticker.is_none());
    }

    #[tokio::test]
    async fn test_checkout_keeps_session_alive() {
        // Arrange
        let manual = Arc::new(ManualClock::at_default_start());
        let clock: Arc<dyn Clock> = manual.clone();
        let registry = SessionRegistry::default();
        let id = registry.insert(active_session(&clock)).await;
        let ttl = Duration::from_secs(60);

        // Act
        manual.advance_millis(45_000);
        drop(registry.checkout(id, clock.as_ref()).await.unwrap());
        manual.advance_millis(45_000);
        let swept = registry.sweep_idle(clock.now(), ttl).await;

        // Assert
        assert_eq!(swept, 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_task_removes_idle_sessions() {
        // Arrange
        let manual = Arc::new(ManualClock::at_default_start());
        let clock: Arc<dyn Clock> = manual.clone();
        let registry = SessionRegistry::default();
        registry.insert(active_session(&clock)).await;
        manual.advance_millis(120_000);

        // Act
        let sweeper =
            registry.spawn_sweeper(clock, Duration::from_secs(60), Duration::from_millis(5));
        tokio::time::timeout(Duration::from_secs(2), async {
            while !registry.is_empty().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        sweeper.abort();

        // Assert
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_unknown_session_is_not_found() {
        // Arrange
        let registry = SessionRegistry::default();
        let id = Uuid::new_v4();

        // Act
        let result = registry.remove(id).await;

        // Assert
        assert!(matches!(result, Err(DomainError::SessionNotFound(missing)) if missing == id));
        assert!(registry.is_empty().await);
    }
}
