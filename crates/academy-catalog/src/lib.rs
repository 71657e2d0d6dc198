//! Salon Academy: Catalog bounded context.
//!
//! Responsible for the single table of techniques and services, each an
//! ordered list of steps: YAML ingestion, validation, lookup by id or name,
//! fingerprinting, and extraction of speakable text from step instructions.

pub mod application;
pub mod domain;
