//! Application layer for the Training context.

pub mod command_handlers;
pub mod review;
pub mod session;
pub mod ticker;
