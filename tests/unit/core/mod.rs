//! Unit tests for the core machine model.

pub mod mem;
pub mod pipeline;
