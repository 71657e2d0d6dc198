//! Salon Academy API: the HTTP service the browser UI drives.
//!
//! Sessions live in an in-process registry; the browser plays narration
//! commands and uploads camera frames, while persistence and sign-in are
//! proxied to the academy backend.

pub mod bridge;
pub mod config;
pub mod error;
pub mod registry;
pub mod routes;
pub mod state;
