//! Display ticker: republishes a session's elapsed time on a fixed period.
//!
//! The tick is for display only. Step durations are taken from the clock
//! at transition time and never from this value.

use std::sync::Arc;
use std::time::Duration;

use academy_core::clock::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::session_clock::SessionClock;

/// Period used by the session screens.
pub const DISPLAY_PERIOD: Duration = Duration::from_secs(1);

/// A repeating timer owned by a session screen. The task is aborted when
/// the ticker is dropped.
#[derive(Debug)]
pub struct DisplayTicker {
    handle: JoinHandle<()>,
    elapsed: watch::Receiver<u64>,
}

impl DisplayTicker {
    /// Spawns the ticker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(session_clock: SessionClock, clock: Arc<dyn Clock>, period: Duration) -> Self {
        let (tx, rx) = watch::channel(session_clock.elapsed_millis(clock.as_ref()));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx
                    .send(session_clock.elapsed_millis(clock.as_ref()))
                    .is_err()
                {
                    break;
                }
            }
        });
        Self {
            handle,
            elapsed: rx,
        }
    }

    /// Latest published elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_millis(&self) -> u64 {
        *self.elapsed.borrow()
    }

    /// A receiver that is notified on every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.clone()
    }

    /// Whether the background task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for DisplayTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_test_support::ManualClock;

    #[tokio::test]
    async fn test_ticker_publishes_clock_elapsed() {
        // Arrange
        let clock = Arc::new(ManualClock::at_default_start());
        let session_clock = SessionClock::start(clock.as_ref());
        let ticker = DisplayTicker::spawn(session_clock, clock.clone(), Duration::from_millis(5));
        let mut rx = ticker.subscribe();

        // Act
        clock.advance_millis(4_000);
        tokio::time::timeout(Duration::from_secs(2), async {
            while *rx.borrow_and_update() != 4_000 {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        // Assert
        assert_eq!(ticker.elapsed_millis(), 4_000);
    }

    #[tokio::test]
    async fn test_dropping_ticker_stops_task() {
        let clock = Arc::new(ManualClock::at_default_start());
        let ticker = DisplayTicker::spawn(
            SessionClock::start(clock.as_ref()),
            clock,
            Duration::from_millis(5),
        );
        let mut rx = ticker.subscribe();

        drop(ticker);

        // The sender lives in the aborted task, so the channel closes.
        tokio::time::timeout(Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await
        .unwrap();
    }
}
