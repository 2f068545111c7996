//! Architectural state of the simulated machine.

/// Register banks, write semaphores, and the program counter.
pub mod reg;

pub use reg::{RegBank, Register, RegisterFile};
