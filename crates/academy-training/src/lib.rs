//! Salon Academy: Training bounded context.
//!
//! Responsible for walking a technique or service step by step: the step
//! sequencer and its timings, the session clock, voice narration, image
//! capture during live sessions, reporting completed runs, and the admin
//! review of candidates' histories.

pub mod application;
pub mod domain;
