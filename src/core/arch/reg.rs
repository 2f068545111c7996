//! Register banks with per-register write semaphores.
//!
//! This module implements the architectural register state. It provides:
//! 1. **Registers:** A 64-bit value paired with a write semaphore counting
//!    in-flight instructions that will write it.
//! 2. **Banks:** The 32-entry general-purpose and floating-point banks plus
//!    the program counter.
//! 3. **R0 hardwiring:** Reads of GPR 0 always return zero; writes and
//!    semaphore traffic against it are discarded.
//!
//! The semaphores are the machine's hazard interlock. An instruction claims
//! its destination when it leaves decode and releases it when it commits;
//! decode refuses to read a source whose semaphore is nonzero unless a
//! forwarded value is available.

use serde::Serialize;

use crate::common::bits::BitVector64;

/// Which register bank a register index refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RegBank {
    /// General-purpose integer registers R0..R31.
    Gpr,
    /// Floating-point registers F0..F31.
    Fpr,
}

/// A single architectural register.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Register {
    /// The stored 64-bit pattern.
    pub value: BitVector64,
    /// Count of in-flight instructions that will write this register.
    pub write_semaphore: u32,
}

/// The full architectural register state: two 32-entry banks and the PC.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    gpr: [Register; 32],
    fpr: [Register; 32],
    /// The program counter. Fetch reads and advances it directly.
    pub pc: u64,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with every register zeroed and PC at 0.
    pub fn new() -> Self {
        Self {
            gpr: [Register::default(); 32],
            fpr: [Register::default(); 32],
            pc: 0,
        }
    }

    /// Reads a register's value. GPR 0 always reads as zero.
    pub fn read(&self, bank: RegBank, idx: u8) -> BitVector64 {
        match bank {
            RegBank::Gpr if idx == 0 => BitVector64::ZERO,
            RegBank::Gpr => self.gpr[idx as usize].value,
            RegBank::Fpr => self.fpr[idx as usize].value,
        }
    }

    /// Writes a register's value. Writes to GPR 0 are discarded.
    pub fn write(&mut self, bank: RegBank, idx: u8, value: BitVector64) {
        match bank {
            RegBank::Gpr if idx == 0 => {}
            RegBank::Gpr => self.gpr[idx as usize].value = value,
            RegBank::Fpr => self.fpr[idx as usize].value = value,
        }
    }

    /// The write semaphore for a register. GPR 0 always reports zero, so it
    /// never appears busy to hazard checks.
    pub fn semaphore(&self, bank: RegBank, idx: u8) -> u32 {
        match bank {
            RegBank::Gpr if idx == 0 => 0,
            RegBank::Gpr => self.gpr[idx as usize].write_semaphore,
            RegBank::Fpr => self.fpr[idx as usize].write_semaphore,
        }
    }

    /// Increments a register's write semaphore when an instruction claims it
    /// as a destination. Claims against GPR 0 are discarded.
    pub fn claim(&mut self, bank: RegBank, idx: u8) {
        match bank {
            RegBank::Gpr if idx == 0 => {}
            RegBank::Gpr => self.gpr[idx as usize].write_semaphore += 1,
            RegBank::Fpr => self.fpr[idx as usize].write_semaphore += 1,
        }
    }

    /// Decrements a register's write semaphore when the claiming instruction
    /// commits or is squashed. Releases against GPR 0 are discarded.
    pub fn release(&mut self, bank: RegBank, idx: u8) {
        let reg = match bank {
            RegBank::Gpr if idx == 0 => return,
            RegBank::Gpr => &mut self.gpr[idx as usize],
            RegBank::Fpr => &mut self.fpr[idx as usize],
        };
        // Every release must pair with a prior claim. Saturate rather than
        // wrap if that invariant is ever broken.
        debug_assert!(reg.write_semaphore > 0, "semaphore release without claim");
        reg.write_semaphore = reg.write_semaphore.saturating_sub(1);
    }

    /// Raw 64-bit values of the general-purpose bank, R0 first.
    pub fn gpr_values(&self) -> [u64; 32] {
        std::array::from_fn(|i| self.gpr[i].value.as_u64())
    }

    /// Raw 64-bit patterns of the floating-point bank, F0 first.
    pub fn fpr_values(&self) -> [u64; 32] {
        std::array::from_fn(|i| self.fpr[i].value.as_u64())
    }
}
