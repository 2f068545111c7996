//! Fault taxonomy and stage event definitions.
//!
//! This module defines the error handling surface of the simulator. It
//! provides:
//! 1. **Faults:** Errors of the simulated program (alignment, bounds,
//!    arithmetic), fatal unless masked by configuration.
//! 2. **Hazards:** Stall causes, counted by the pipeline and never surfaced
//!    as errors.
//! 3. **Stage events:** The result enum returned by instruction stage hooks
//!    in place of control-flow-by-exception.
//! 4. **API errors:** Synchronous rejections of simulator misuse.

use thiserror::Error;

/// Arithmetic fault kinds raised by the execute stage.
///
/// Each kind is individually maskable through
/// [`ExceptionConfig`](crate::config::ExceptionConfig); a masked fault
/// commits its defined fallback value and execution continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ArithmeticFault {
    /// Twos-complement or floating-point overflow.
    #[error("arithmetic overflow")]
    Overflow,
    /// Floating-point underflow (result too small to represent normally).
    #[error("arithmetic underflow")]
    Underflow,
    /// Division of a nonzero value by zero.
    #[error("divide by zero")]
    DivideByZero,
    /// Operation with no defined result (NaN operand, 0/0, inf - inf).
    #[error("invalid operation")]
    InvalidOperation,
}

/// A fatal error of the simulated program.
///
/// Faults transition the machine to `Faulted`; the run can only be resumed
/// through a reset. A faulting operation never partially completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    /// A memory access that violates natural alignment.
    #[error("misaligned access at {addr:#x}: requires {required}-byte alignment")]
    Misaligned {
        /// The offending address.
        addr: u64,
        /// The alignment the access width requires, in bytes.
        required: u64,
    },
    /// A memory access beyond the configured memory size.
    #[error("access at {addr:#x} outside memory of {size} bytes")]
    OutOfBounds {
        /// The offending address.
        addr: u64,
        /// The configured memory size in bytes.
        size: u64,
    },
    /// An unmasked arithmetic fault.
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticFault),
}

/// Cause of a pipeline stall.
///
/// Stalls are expected and recoverable; the pipeline counts them per kind
/// and retries the stalled instruction on the next cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HazardKind {
    /// Read-after-write: a source register has a pending writer.
    Raw,
    /// Write-after-write: the destination register has a pending writer.
    Waw,
    /// Contention for the memory port.
    Structural,
}

/// Outcome of one instruction stage hook.
///
/// Stage hooks report to the pipeline instead of mutating pipeline state;
/// the pipeline's step loop is the sole decision point for stalling,
/// redirecting, halting, or faulting. Control-flow events are not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    /// The stage completed; the instruction may advance.
    Normal,
    /// The instruction cannot proceed this cycle; retry next cycle.
    Stall(HazardKind),
    /// A taken branch or jump: redirect fetch to the given address and
    /// squash anything fetched on the wrong path.
    ControlTransfer(u64),
    /// Program termination; the machine halts after this commit.
    Halt,
    /// A breakpoint opcode committed; simulation pauses but may continue.
    Breakpoint,
    /// A fatal fault; the machine transitions to `Faulted`.
    Fault(Fault),
}

/// Misuse of the [`BitVector64`](crate::common::BitVector64) API.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BitsError {
    /// A signed value that does not fit the requested width.
    #[error("value {value} does not fit in a {bits}-bit twos-complement field")]
    OutOfRange {
        /// The rejected value.
        value: i64,
        /// The requested field width in bits.
        bits: u32,
    },
    /// A binary string that is not 64 characters of `0`/`1`.
    #[error("invalid 64-bit binary string: {0:?}")]
    BadBinaryString(String),
    /// A bit-field window that exceeds the 64-bit pattern.
    #[error("bit field at offset {offset} width {width} exceeds 64 bits")]
    FieldOutOfBounds {
        /// Field offset from the least significant bit.
        offset: u32,
        /// Field width in bits.
        width: u32,
    },
}

/// An instruction word with no defined decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("illegal instruction word {0:#010x}")]
pub struct IllegalInstruction(pub u32);

/// Errors surfaced to the simulator's caller.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// `step()` was called after the machine halted.
    #[error("the machine has halted; reset before stepping again")]
    AlreadyHalted,
    /// `step()` was called after the machine faulted.
    #[error("the machine has faulted; reset before stepping again")]
    AlreadyFaulted,
    /// `load_program()` was called while a program is running.
    #[error("cannot load a program while the machine is running")]
    LoadWhileRunning,
    /// A run exceeded the caller-supplied cycle budget.
    #[error("cycle limit of {0} exceeded without halting")]
    CycleLimitExceeded(u64),
    /// The simulated program raised a fatal fault.
    #[error("simulation fault: {0}")]
    Fault(#[from] Fault),
}
