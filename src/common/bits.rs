//! Fixed-width twos-complement bit vectors.
//!
//! This module implements the 64-bit value type used for all register and
//! memory traffic in the simulator. It provides:
//! 1. **Width-aware arithmetic:** Add/subtract with twos-complement overflow
//!    detection at 8/16/32/64-bit operand widths.
//! 2. **Field windows:** Insertion and extraction of bit ranges by offset and
//!    width.
//! 3. **Textual form:** Conversion to and from 64-character binary strings.

use std::fmt;

use serde::Serialize;

use crate::common::error::BitsError;

/// Effective operand width for arithmetic and sign interpretation.
///
/// The stored value is always a full 64-bit pattern; the width selects how
/// many low-order bits participate in an operation and where the sign bit
/// sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    /// 8-bit operand.
    Byte,
    /// 16-bit operand.
    Half,
    /// 32-bit operand.
    Word,
    /// 64-bit operand.
    DoubleWord,
}

impl Width {
    /// Number of bits covered by this width.
    #[inline]
    pub fn bits(self) -> u32 {
        match self {
            Width::Byte => 8,
            Width::Half => 16,
            Width::Word => 32,
            Width::DoubleWord => 64,
        }
    }

    /// Number of bytes covered by this width (the natural alignment).
    #[inline]
    pub fn bytes(self) -> u64 {
        u64::from(self.bits() / 8)
    }

    /// Mask selecting the low `bits()` bits of a 64-bit pattern.
    #[inline]
    fn mask(self) -> u64 {
        match self {
            Width::DoubleWord => u64::MAX,
            w => (1u64 << w.bits()) - 1,
        }
    }

    /// Mask selecting the sign bit at this width.
    #[inline]
    fn sign_bit(self) -> u64 {
        1u64 << (self.bits() - 1)
    }
}

/// A 64-bit twos-complement bit vector.
///
/// Value-typed and cheap to copy. Arithmetic helpers operate on the full
/// 64-bit representation and report overflow for the requested operand
/// width by sign comparison, never by relying on native-width wraparound.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BitVector64(u64);

impl BitVector64 {
    /// The all-zero bit vector.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw 64-bit pattern.
    #[inline]
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Builds a bit vector from a signed value at the given width.
    ///
    /// The value is stored sign-extended to 64 bits.
    ///
    /// # Errors
    ///
    /// [`BitsError::OutOfRange`] if `value` does not fit in `width` bits of
    /// twos-complement.
    pub fn from_signed(value: i64, width: Width) -> Result<Self, BitsError> {
        if width != Width::DoubleWord {
            let bits = width.bits();
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(BitsError::OutOfRange { value, bits });
            }
        }
        Ok(Self(value as u64))
    }

    /// Parses a 64-character binary string, most significant bit first.
    ///
    /// # Errors
    ///
    /// [`BitsError::BadBinaryString`] if the string is not exactly 64
    /// characters of `0` and `1`.
    pub fn from_binary_str(s: &str) -> Result<Self, BitsError> {
        if s.len() != 64 || !s.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(BitsError::BadBinaryString(s.to_string()));
        }
        let mut raw = 0u64;
        for b in s.bytes() {
            raw = (raw << 1) | u64::from(b - b'0');
        }
        Ok(Self(raw))
    }

    /// Renders the 64-bit pattern as a binary string, most significant bit
    /// first.
    pub fn to_binary_string(self) -> String {
        format!("{:064b}", self.0)
    }

    /// The raw 64-bit pattern.
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Interprets the low `width` bits as a twos-complement integer,
    /// sign-extended to `i64`.
    #[inline]
    pub fn signed_value(self, width: Width) -> i64 {
        match width {
            Width::Byte => (self.0 as u8) as i8 as i64,
            Width::Half => (self.0 as u16) as i16 as i64,
            Width::Word => (self.0 as u32) as i32 as i64,
            Width::DoubleWord => self.0 as i64,
        }
    }

    /// Whether the 64-bit sign bit is set (the value is negative).
    #[inline]
    pub fn is_negative(self) -> bool {
        (self.0 >> 63) != 0
    }

    /// Width-aware twos-complement addition.
    ///
    /// Returns the width-wrapped sum sign-extended to 64 bits, and a flag
    /// reporting overflow at that width: both operands share a sign and the
    /// result does not. Callers that trap on overflow map the flag to an
    /// arithmetic fault; address arithmetic ignores it.
    pub fn checked_add(self, other: Self, width: Width) -> (Self, bool) {
        let mask = width.mask();
        let sign = width.sign_bit();
        let a = self.0 & mask;
        let b = other.0 & mask;
        let sum = a.wrapping_add(b) & mask;
        let overflow = (a & sign) == (b & sign) && (sum & sign) != (a & sign);
        (Self::sign_extend(sum, width), overflow)
    }

    /// Width-aware twos-complement subtraction.
    ///
    /// Overflow is reported when the operand signs differ and the result's
    /// sign differs from the minuend's.
    pub fn checked_sub(self, other: Self, width: Width) -> (Self, bool) {
        let mask = width.mask();
        let sign = width.sign_bit();
        let a = self.0 & mask;
        let b = other.0 & mask;
        let diff = a.wrapping_sub(b) & mask;
        let overflow = (a & sign) != (b & sign) && (diff & sign) != (a & sign);
        (Self::sign_extend(diff, width), overflow)
    }

    /// Extracts the bit range `[offset, offset + width)`, bit 0 being the
    /// least significant.
    ///
    /// # Errors
    ///
    /// [`BitsError::FieldOutOfBounds`] if the range exceeds 64 bits.
    pub fn read_field(self, offset: u32, width: u32) -> Result<u64, BitsError> {
        Self::check_field(offset, width)?;
        let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
        Ok((self.0 >> offset) & mask)
    }

    /// Overwrites the bit range `[offset, offset + width)` with the low
    /// `width` bits of `value`; the rest of the pattern is untouched.
    ///
    /// # Errors
    ///
    /// [`BitsError::FieldOutOfBounds`] if the range exceeds 64 bits.
    pub fn write_field(&mut self, offset: u32, width: u32, value: u64) -> Result<(), BitsError> {
        Self::check_field(offset, width)?;
        let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
        self.0 = (self.0 & !(mask << offset)) | ((value & mask) << offset);
        Ok(())
    }

    fn check_field(offset: u32, width: u32) -> Result<(), BitsError> {
        if width == 0 || u64::from(offset) + u64::from(width) > 64 {
            return Err(BitsError::FieldOutOfBounds { offset, width });
        }
        Ok(())
    }

    #[inline]
    fn sign_extend(raw: u64, width: Width) -> Self {
        Self(match width {
            Width::Byte => (raw as u8) as i8 as i64 as u64,
            Width::Half => (raw as u16) as i16 as i64 as u64,
            Width::Word => (raw as u32) as i32 as i64 as u64,
            Width::DoubleWord => raw,
        })
    }
}

impl fmt::Debug for BitVector64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector64({:#018x})", self.0)
    }
}

impl fmt::Display for BitVector64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for BitVector64 {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<i64> for BitVector64 {
    fn from(value: i64) -> Self {
        Self(value as u64)
    }
}
