//! Salon Academy: REST backend adapter.
//!
//! Implements the persistence and authentication collaborators against the
//! academy's HTTP backend.

pub mod http_backend;
