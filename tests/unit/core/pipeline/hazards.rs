//! Hazard and Stall Accounting Tests.
//!
//! Each test runs a short program twice where it matters, once with and
//! once without operand forwarding, and checks both the architectural
//! result and the exact stall counts.

use mips64_core::common::bits::{BitVector64, Width};
use mips64_core::config::Config;
use mips64_core::isa::{Instruction, Opcode};
use pretty_assertions::assert_eq;

use crate::common::TestContext;

// ══════════════════════════════════════════════════════════
// 1. RAW between ALU instructions
// ══════════════════════════════════════════════════════════

#[test]
fn adjacent_alu_dependence_stalls_twice_without_forwarding() {
    let mut ctx = TestContext::no_forwarding().load(&[
        Instruction::i_type(Opcode::Daddi, 1, 0, 5),
        Instruction::r_type(Opcode::Dadd, 2, 1, 1),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(2), 10);
    assert_eq!(ctx.sim.stats().raw_stalls, 2, "consumer waits for writeback");
    assert_eq!(ctx.sim.stats().cycles, 3 + 4 + 2);
}

#[test]
fn forwarding_removes_alu_to_alu_stalls() {
    let mut ctx = TestContext::new().load(&[
        Instruction::i_type(Opcode::Daddi, 1, 0, 5),
        Instruction::r_type(Opcode::Dadd, 2, 1, 1),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(2), 10);
    assert_eq!(ctx.sim.stats().raw_stalls, 0, "execute result is bypassed");
    assert_eq!(ctx.sim.stats().cycles, 3 + 4);
}

#[test]
fn independent_instructions_never_stall() {
    let mut ctx = TestContext::no_forwarding().load(&[
        Instruction::i_type(Opcode::Daddi, 1, 0, 1),
        Instruction::i_type(Opcode::Daddi, 2, 0, 2),
        Instruction::i_type(Opcode::Daddi, 3, 0, 3),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(ctx.sim.stats().total_stalls(), 0);
    assert_eq!(ctx.sim.stats().cycles, 4 + 4);
}

// ══════════════════════════════════════════════════════════
// 2. Load-use
// ══════════════════════════════════════════════════════════

fn load_use_program() -> [Instruction; 3] {
    [
        Instruction::i_type(Opcode::Ld, 1, 0, 0),
        Instruction::r_type(Opcode::Dadd, 2, 1, 1),
        Instruction::halt(),
    ]
}

#[test]
fn load_use_keeps_one_stall_with_forwarding() {
    let mut ctx = TestContext::new().load(&load_use_program());
    ctx.sim
        .memory_mut()
        .write(0, Width::DoubleWord, BitVector64::from_u64(7))
        .unwrap();
    ctx.run();
    assert_eq!(ctx.get_reg(2), 14);
    assert_eq!(
        ctx.sim.stats().raw_stalls,
        1,
        "loaded value only exists after the memory stage"
    );
    assert_eq!(ctx.sim.stats().cycles, 3 + 4 + 1);
}

#[test]
fn load_use_stalls_twice_without_forwarding() {
    let mut ctx = TestContext::no_forwarding().load(&load_use_program());
    ctx.sim
        .memory_mut()
        .write(0, Width::DoubleWord, BitVector64::from_u64(7))
        .unwrap();
    ctx.run();
    assert_eq!(ctx.get_reg(2), 14);
    assert_eq!(ctx.sim.stats().raw_stalls, 2);
    assert_eq!(ctx.sim.stats().cycles, 3 + 4 + 2);
}

// ══════════════════════════════════════════════════════════
// 3. WAW
// ══════════════════════════════════════════════════════════

#[test]
fn adjacent_writers_of_one_register_stall_on_waw() {
    let mut ctx = TestContext::new().load(&[
        Instruction::i_type(Opcode::Daddi, 1, 0, 1),
        Instruction::i_type(Opcode::Daddi, 1, 0, 2),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(1), 2, "younger writer commits last");
    assert_eq!(ctx.sim.stats().waw_stalls, 2);
    assert_eq!(ctx.sim.stats().raw_stalls, 0);
}

#[test]
fn forwarding_does_not_reduce_waw_stalls() {
    let program = [
        Instruction::i_type(Opcode::Daddi, 1, 0, 1),
        Instruction::i_type(Opcode::Daddi, 1, 0, 2),
        Instruction::halt(),
    ];
    let mut with_fw = TestContext::new().load(&program);
    let mut without_fw = TestContext::no_forwarding().load(&program);
    with_fw.run();
    without_fw.run();
    assert_eq!(
        with_fw.sim.stats().waw_stalls,
        without_fw.sim.stats().waw_stalls,
        "WAW orders commits; bypassing values cannot help"
    );
}

// ══════════════════════════════════════════════════════════
// 4. Structural (memory port)
// ══════════════════════════════════════════════════════════

#[test]
fn memory_latency_shows_up_as_structural_stalls() {
    let mut config = Config::default();
    config.memory.latency = 3;
    let mut ctx = TestContext::with_config(config).load(&[
        Instruction::i_type(Opcode::Ld, 1, 0, 0),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(
        ctx.sim.stats().structural_stalls,
        2,
        "each cycle beyond the first occupies the port"
    );
    assert_eq!(ctx.sim.stats().cycles, 2 + 4 + 2);
}

#[test]
fn unit_latency_memory_causes_no_structural_stalls() {
    let mut ctx = TestContext::new().load(&[
        Instruction::i_type(Opcode::Ld, 1, 0, 0),
        Instruction::i_type(Opcode::Sd, 1, 0, 8),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(ctx.sim.stats().structural_stalls, 0);
}
