//! Domain layer for the Catalog context.

pub mod catalog;
pub mod step;
