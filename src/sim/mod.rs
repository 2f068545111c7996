//! The simulator facade: machine lifecycle, stepping, and inspection.

/// Serializable machine snapshots.
pub mod snapshot;
mod simulator;
mod symbols;

pub use simulator::{MachineStatus, Simulator, StepOutcome};
pub use snapshot::{Snapshot, StageView, StallCounters};
pub use symbols::SymbolTable;
