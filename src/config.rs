//! Configuration system for the MIPS64 simulator.
//!
//! This module defines all configuration structures used to parameterize a
//! simulation run. It provides:
//! 1. **Defaults:** Baseline constants (memory size, memory latency,
//!    forwarding, exception enables).
//! 2. **Structures:** Config for the core, the memory unit, and per-kind
//!    arithmetic exception enables.
//!
//! Configuration is supplied via JSON from an embedding frontend
//! (`Config::from_json`) or use `Config::default()`. Changing a setting
//! between runs never requires rebuilding the simulator, only a reset.

use serde::Deserialize;

use crate::common::error::ArithmeticFault;

/// Default configuration constants for the simulator.
mod defaults {
    /// Total size of simulated data memory (64 KiB).
    ///
    /// Accesses at or beyond this size raise an out-of-bounds fault.
    pub const MEMORY_SIZE: usize = 64 * 1024;

    /// Memory port occupancy per data access, in cycles.
    ///
    /// Each cycle beyond the first keeps the memory stage busy and is
    /// counted as a structural stall.
    pub const MEMORY_LATENCY: u64 = 1;

    /// Whether operand forwarding is enabled.
    pub const FORWARDING: bool = true;

    /// Whether each arithmetic exception kind traps by default.
    ///
    /// Disabled kinds are masked: the operation commits its defined
    /// fallback value and the run continues.
    pub const EXCEPTIONS_ENABLED: bool = true;
}

/// Data memory configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Size of the flat data memory in bytes.
    pub size: usize,
    /// Cycles a load or store occupies the memory port.
    pub latency: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size: defaults::MEMORY_SIZE,
            latency: defaults::MEMORY_LATENCY,
        }
    }
}

/// Per-kind arithmetic exception enables.
///
/// Mirrors the original machine's four exception toggles. An enabled kind
/// faults the machine when raised; a disabled kind is masked and execution
/// continues with the operation's fallback result (wrapped integer, NaN,
/// signed infinity or zero per IEEE 754 defaults).
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ExceptionConfig {
    /// Trap on invalid operations (NaN operand, 0/0, inf - inf).
    pub invalid_operation: bool,
    /// Trap on integer or floating-point overflow.
    pub overflow: bool,
    /// Trap on floating-point underflow.
    pub underflow: bool,
    /// Trap on division by zero.
    pub divide_by_zero: bool,
}

impl Default for ExceptionConfig {
    fn default() -> Self {
        Self {
            invalid_operation: defaults::EXCEPTIONS_ENABLED,
            overflow: defaults::EXCEPTIONS_ENABLED,
            underflow: defaults::EXCEPTIONS_ENABLED,
            divide_by_zero: defaults::EXCEPTIONS_ENABLED,
        }
    }
}

impl ExceptionConfig {
    /// Whether the given fault kind is masked (does not trap).
    pub fn is_masked(&self, kind: ArithmeticFault) -> bool {
        !match kind {
            ArithmeticFault::InvalidOperation => self.invalid_operation,
            ArithmeticFault::Overflow => self.overflow,
            ArithmeticFault::Underflow => self.underflow,
            ArithmeticFault::DivideByZero => self.divide_by_zero,
        }
    }
}

/// Root configuration type.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Operand forwarding toggle.
    ///
    /// When enabled, results still in flight are bypassed to decode- and
    /// fetch-stage consumers ahead of the write-semaphore check.
    pub forwarding: bool,
    /// Data memory parameters.
    pub memory: MemoryConfig,
    /// Arithmetic exception enables.
    pub exceptions: ExceptionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forwarding: defaults::FORWARDING,
            memory: MemoryConfig::default(),
            exceptions: ExceptionConfig::default(),
        }
    }
}

impl Config {
    /// Deserializes a configuration from a JSON document.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
