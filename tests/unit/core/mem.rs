//! Data Memory Tests.
//!
//! Verifies big-endian byte order, natural-alignment enforcement, and
//! bounds checking of the flat data memory.

use mips64_core::common::bits::{BitVector64, Width};
use mips64_core::common::error::Fault;
use mips64_core::core::mem::Memory;
use pretty_assertions::assert_eq;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Byte order
// ══════════════════════════════════════════════════════════

#[test]
fn words_are_stored_big_endian() {
    let mut mem = Memory::new(64);
    mem.write(0, Width::Word, BitVector64::from_u64(0x1122_3344))
        .unwrap();
    assert_eq!(mem.read(0, Width::Byte).unwrap().as_u64(), 0x11);
    assert_eq!(mem.read(3, Width::Byte).unwrap().as_u64(), 0x44);
    assert_eq!(mem.read(0, Width::Half).unwrap().as_u64(), 0x1122);
}

#[test]
fn doubleword_round_trips() {
    let mut mem = Memory::new(64);
    let v = BitVector64::from_u64(0x0102_0304_0506_0708);
    mem.write(8, Width::DoubleWord, v).unwrap();
    assert_eq!(mem.read(8, Width::DoubleWord).unwrap(), v);
}

#[test]
fn narrow_write_only_touches_its_bytes() {
    let mut mem = Memory::new(64);
    mem.write(0, Width::DoubleWord, BitVector64::from_u64(u64::MAX))
        .unwrap();
    mem.write(2, Width::Half, BitVector64::ZERO).unwrap();
    assert_eq!(
        mem.read(0, Width::DoubleWord).unwrap().as_u64(),
        0xFFFF_0000_FFFF_FFFF,
    );
}

// ══════════════════════════════════════════════════════════
// 2. Alignment
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(Width::Half, 1)]
#[case(Width::Word, 2)]
#[case(Width::DoubleWord, 4)]
fn misaligned_access_faults(#[case] width: Width, #[case] addr: u64) {
    let mut mem = Memory::new(64);
    let expected = Fault::Misaligned {
        addr,
        required: width.bytes(),
    };
    assert_eq!(mem.read(addr, width), Err(expected));
    assert_eq!(mem.write(addr, width, BitVector64::ZERO), Err(expected));
}

#[test]
fn byte_access_is_never_misaligned() {
    let mem = Memory::new(64);
    for addr in 0..8 {
        assert!(mem.read(addr, Width::Byte).is_ok());
    }
}

// ══════════════════════════════════════════════════════════
// 3. Bounds
// ══════════════════════════════════════════════════════════

#[test]
fn access_past_the_end_faults() {
    let mem = Memory::new(64);
    assert_eq!(
        mem.read(64, Width::Byte),
        Err(Fault::OutOfBounds { addr: 64, size: 64 }),
    );
    // A doubleword straddling the end is out of bounds even though its
    // start address is in range.
    assert_eq!(
        mem.read(60, Width::DoubleWord),
        Err(Fault::Misaligned { addr: 60, required: 8 }),
    );
    assert_eq!(
        mem.read(56, Width::DoubleWord).map(|v| v.as_u64()),
        Ok(0),
        "last aligned doubleword is in bounds"
    );
}

#[test]
fn faulting_write_leaves_memory_unchanged() {
    let mut mem = Memory::new(64);
    mem.write(63, Width::Byte, BitVector64::from_u64(0x7F))
        .unwrap();
    assert!(mem.write(64, Width::Byte, BitVector64::from_u64(1)).is_err());
    assert_eq!(mem.read(63, Width::Byte).unwrap().as_u64(), 0x7F);
}

#[test]
fn clear_zeroes_but_keeps_size() {
    let mut mem = Memory::new(64);
    mem.write(0, Width::Byte, BitVector64::from_u64(9)).unwrap();
    mem.clear();
    assert_eq!(mem.size(), 64);
    assert_eq!(mem.read(0, Width::Byte).unwrap().as_u64(), 0);
}
