//! Flat big-endian data memory.
//!
//! This module implements the simulated data memory. It provides:
//! 1. **Sized accesses:** Reads and writes at byte, half-word, word, and
//!    double-word widths, big-endian like the modeled machine.
//! 2. **Checking:** Natural-alignment and bounds validation on every access,
//!    surfaced as faults before any byte is touched.

use crate::common::bits::{BitVector64, Width};
use crate::common::error::Fault;

/// A flat byte-addressed memory of fixed size.
#[derive(Clone, Debug)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Creates a zero-filled memory of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// The memory size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Zeroes the entire memory, keeping its size.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Validates alignment and bounds for an access of the given width.
    ///
    /// # Errors
    ///
    /// [`Fault::Misaligned`] if `addr` is not a multiple of the access
    /// width, [`Fault::OutOfBounds`] if the access extends past the end of
    /// memory. Alignment is checked first.
    fn check(&self, addr: u64, width: Width) -> Result<usize, Fault> {
        let bytes = width.bytes();
        if addr % bytes != 0 {
            return Err(Fault::Misaligned {
                addr,
                required: bytes,
            });
        }
        let size = self.bytes.len() as u64;
        if addr.checked_add(bytes).map_or(true, |end| end > size) {
            return Err(Fault::OutOfBounds { addr, size });
        }
        Ok(addr as usize)
    }

    /// Reads a value of the given width, zero-extended into the low bits of
    /// the result. Sign extension is the caller's concern.
    ///
    /// # Errors
    ///
    /// Alignment or bounds faults per [`Memory::check`].
    pub fn read(&self, addr: u64, width: Width) -> Result<BitVector64, Fault> {
        let base = self.check(addr, width)?;
        let mut raw = 0u64;
        for i in 0..width.bytes() as usize {
            raw = (raw << 8) | u64::from(self.bytes[base + i]);
        }
        Ok(BitVector64::from_u64(raw))
    }

    /// Writes the low `width` bits of `value` at `addr`, big-endian.
    ///
    /// # Errors
    ///
    /// Alignment or bounds faults per [`Memory::check`]; a faulting write
    /// leaves memory untouched.
    pub fn write(&mut self, addr: u64, width: Width, value: BitVector64) -> Result<(), Fault> {
        let base = self.check(addr, width)?;
        let n = width.bytes() as usize;
        let raw = value.as_u64();
        for i in 0..n {
            self.bytes[base + i] = (raw >> (8 * (n - 1 - i))) as u8;
        }
        Ok(())
    }
}
