//! Session clock: elapsed wall-clock time since a session began.

use academy_core::clock::{Clock, millis_between};
use chrono::{DateTime, Utc};

/// Origin timestamp of a session. Elapsed time is recomputed from the clock
/// on every read and is for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    origin: DateTime<Utc>,
}

impl SessionClock {
    /// Captures the current time as the origin.
    #[must_use]
    pub fn start(clock: &dyn Clock) -> Self {
        Self {
            origin: clock.now(),
        }
    }

    /// When the session started.
    #[must_use]
    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    /// Milliseconds since the origin.
    #[must_use]
    pub fn elapsed_millis(&self, clock: &dyn Clock) -> u64 {
        millis_between(self.origin, clock.now())
    }
}

/// Formats a duration as `MM:SS`, or `H:MM:SS` past the hour.
#[must_use]
pub fn format_elapsed(millis: u64) -> String {
    let total_seconds = millis / 1_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
