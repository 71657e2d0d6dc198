//! Domain layer for the Training context.

pub mod capture;
pub mod completion;
pub mod narration;
pub mod sequencer;
pub mod session_clock;
