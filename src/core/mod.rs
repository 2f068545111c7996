//! Core machine model: architectural state, memory, and the pipeline.

/// Architectural register state.
pub mod arch;
/// Flat big-endian data memory.
pub mod mem;
/// Five-stage in-order pipeline engine.
pub mod pipeline;
