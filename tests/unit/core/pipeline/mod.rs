//! Unit tests for the pipeline engine.

pub mod control;
pub mod hazards;
