//! Common types shared across the simulator.
//!
//! This module collects the leaf data types used by every other component:
//! 1. **Bit vectors:** The fixed-width twos-complement value type carried by
//!    registers and memory transfers.
//! 2. **Errors and events:** The fault taxonomy, hazard kinds, and the stage
//!    event enum returned by instruction stage hooks.

/// Fixed-width twos-complement bit vector arithmetic.
pub mod bits;
/// Fault taxonomy, hazard kinds, stage events, and API errors.
pub mod error;

pub use bits::{BitVector64, Width};
pub use error::{ArithmeticFault, Fault, HazardKind, SimError, StageEvent};
