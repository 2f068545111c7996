//! # Unit Tests
//!
//! This module serves as the central hub for the unit tests of the machine
//! model, organized to mirror the crate's own module tree.


/// Unit tests for the core machine model.
///
/// This module covers architectural registers, data memory, and the
/// pipeline engine's hazard, timing, and control-transfer behavior.
pub mod core;
