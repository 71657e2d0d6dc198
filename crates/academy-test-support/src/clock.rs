//! Test clocks: deterministic `Clock` implementations for tests.

use std::sync::Mutex;

use academy_core::clock::Clock;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that only moves when told to. Used to script step durations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock reading 2026-01-15 10:00:00 UTC.
    ///
    /// # Panics
    ///
    /// Never in practice; the constant date is valid.
    #[must_use]
    pub fn at_default_start() -> Self {
        Self::new(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    /// Move the clock forward by `millis` milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn advance_millis(&self, millis: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::milliseconds(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
