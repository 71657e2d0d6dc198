//! Step sequencer: the forward/backward walk through a step list.

use academy_catalog::domain::step::StepDescriptor;
use academy_core::clock::{Clock, millis_between};
use academy_core::error::DomainError;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Effect of a navigation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The position changed.
    Moved {
        /// New zero-based position.
        position: usize,
    },
    /// The last step was left; carries every recorded duration.
    Completed {
        /// Duration of each forward exit, in milliseconds.
        step_timings: Vec<u64>,
    },
    /// Nothing happened.
    Unchanged,
}

/// Walks an ordered, non-empty step list.
///
/// Every forward exit appends `now - step_entered_at` to the timing list.
/// Backward moves neither record nor remove timings. Once completed the
/// sequencer ignores navigation; a fresh [`StepSequencer::start`] is needed
/// to walk again.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    steps: Vec<StepDescriptor>,
    position: usize,
    step_entered_at: DateTime<Utc>,
    step_timings: Vec<u64>,
    completed: bool,
}

impl StepSequencer {
    /// Starts at position 0 with no timings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unavailable` if `steps` is empty.
    pub fn start(steps: Vec<StepDescriptor>, clock: &dyn Clock) -> Result<Self, DomainError> {
        if steps.is_empty() {
            return Err(DomainError::Unavailable(
                "this routine has no steps yet".to_owned(),
            ));
        }
        Ok(Self {
            steps,
            position: 0,
            step_entered_at: clock.now(),
            step_timings: Vec::new(),
            completed: false,
        })
    }

    /// Records the current step's duration, then advances or completes.
    pub fn go_next(&mut self, clock: &dyn Clock) -> Transition {
        if self.completed {
            return Transition::Unchanged;
        }
        let now = clock.now();
        let duration = millis_between(self.step_entered_at, now);
        self.step_timings.push(duration);
        debug!(position = self.position, duration_ms = duration, "step left");

        if self.is_last() {
            self.completed = true;
            return Transition::Completed {
                step_timings: self.step_timings.clone(),
            };
        }
        self.position += 1;
        self.step_entered_at = now;
        Transition::Moved {
            position: self.position,
        }
    }

    /// Steps back one position; no-op at the first step.
    pub fn go_prev(&mut self, clock: &dyn Clock) -> Transition {
        if self.completed || self.position == 0 {
            return Transition::Unchanged;
        }
        self.position -= 1;
        self.step_entered_at = clock.now();
        Transition::Moved {
            position: self.position,
        }
    }

    /// Zero-based index of the active step.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The active step.
    #[must_use]
    pub fn current_step(&self) -> &StepDescriptor {
        &self.steps[self.position]
    }

    /// All steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    /// Number of steps. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`; a sequencer cannot hold an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the active step is the last one.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position + 1 == self.steps.len()
    }

    /// Durations recorded so far.
    #[must_use]
    pub fn step_timings(&self) -> &[u64] {
        &self.step_timings
    }

    /// Whether the final step has been left.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
