//! Salon Academy Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that every bounded
//! context depends on: time, errors, completion records, users, and the
//! seams to external collaborators (persistence, auth, narration, camera).
//! It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod platform;
pub mod record;
pub mod repository;
pub mod user;
