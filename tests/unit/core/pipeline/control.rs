//! Control Transfer Tests.
//!
//! Branches and jumps resolve during their own fetch cycle: a taken
//! transfer redirects the PC before anything on the wrong path is
//! fetched, and an operand still in flight stalls the transfer in fetch.

use mips64_core::isa::{Instruction, Opcode};
use pretty_assertions::assert_eq;

use crate::common::TestContext;

// ══════════════════════════════════════════════════════════
// 1. Conditional branches
// ══════════════════════════════════════════════════════════

#[test]
fn taken_beq_skips_the_fallthrough_path() {
    let mut ctx = TestContext::new().load_sparse(&[
        (0, Instruction::i_type(Opcode::Daddi, 1, 0, 1)),
        // beq r0, r0 is always taken: target = 4 + 4 + 2*4 = 16.
        (4, Instruction::branch(Opcode::Beq, 0, 0, 2)),
        (8, Instruction::i_type(Opcode::Daddi, 2, 0, 99)),
        (16, Instruction::i_type(Opcode::Daddi, 2, 0, 7)),
        (20, Instruction::halt()),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(2), 7, "wrong-path daddi never executes");
    assert_eq!(ctx.sim.stats().taken_branches, 1);
    // Four committed instructions, no squash penalty: the wrong path was
    // never fetched.
    assert_eq!(ctx.sim.stats().cycles, 4 + 4);
}

#[test]
fn untaken_branch_falls_through() {
    let mut ctx = TestContext::new().load(&[
        Instruction::branch(Opcode::Bne, 0, 0, 4),
        Instruction::i_type(Opcode::Daddi, 1, 0, 5),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(1), 5);
    assert_eq!(ctx.sim.stats().taken_branches, 0);
    assert_eq!(ctx.sim.stats().inst_branch, 1, "untaken branches still commit");
}

#[test]
fn bgez_takes_on_zero_and_positive_only() {
    for (initial, expected) in [(0i64, 7u64), (5, 7), (-1, 99)] {
        let mut ctx = TestContext::new().load_sparse(&[
            (0, Instruction::branch(Opcode::Bgez, 1, 0, 2)),
            (4, Instruction::i_type(Opcode::Daddi, 2, 0, 99)),
            (8, Instruction::halt()),
            (12, Instruction::i_type(Opcode::Daddi, 2, 0, 7)),
            (16, Instruction::halt()),
        ]);
        ctx.set_reg(1, initial as u64);
        ctx.run();
        assert_eq!(ctx.get_reg(2), expected, "bgez with r1 = {initial}");
    }
}

#[test]
fn branch_waits_in_fetch_for_an_in_flight_operand() {
    let mut ctx = TestContext::new().load_sparse(&[
        (0, Instruction::i_type(Opcode::Daddi, 1, 0, 1)),
        // bne reads r1 while the daddi producing it is still in flight.
        (4, Instruction::branch(Opcode::Bne, 1, 0, 2)),
        (8, Instruction::i_type(Opcode::Daddi, 2, 0, 99)),
        (16, Instruction::i_type(Opcode::Daddi, 2, 0, 7)),
        (20, Instruction::halt()),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(2), 7);
    assert_eq!(
        ctx.sim.stats().raw_stalls,
        1,
        "one fetch-stage stall until the execute result can be bypassed"
    );
}

#[test]
fn branch_operand_stall_grows_without_forwarding() {
    let mut ctx = TestContext::no_forwarding().load_sparse(&[
        (0, Instruction::i_type(Opcode::Daddi, 1, 0, 1)),
        (4, Instruction::branch(Opcode::Bne, 1, 0, 2)),
        (8, Instruction::i_type(Opcode::Daddi, 2, 0, 99)),
        (16, Instruction::i_type(Opcode::Daddi, 2, 0, 7)),
        (20, Instruction::halt()),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(2), 7);
    assert_eq!(
        ctx.sim.stats().raw_stalls,
        3,
        "the branch waits for the producer's writeback"
    );
}

// ══════════════════════════════════════════════════════════
// 2. Jumps and links
// ══════════════════════════════════════════════════════════

#[test]
fn jal_links_the_return_address() {
    let mut ctx = TestContext::new().load_sparse(&[
        // Instruction index 3 → absolute target 12.
        (0, Instruction::jump(Opcode::Jal, 3)),
        (4, Instruction::i_type(Opcode::Daddi, 1, 0, 99)),
        (12, Instruction::halt()),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(31), 4, "link register holds the fall-through PC");
    assert_eq!(ctx.get_reg(1), 0, "skipped instruction never executes");
    assert_eq!(ctx.sim.stats().taken_branches, 1);
}

#[test]
fn jr_jumps_through_a_register() {
    let mut ctx = TestContext::new().load_sparse(&[
        (0, Instruction::i_type(Opcode::Daddi, 1, 0, 16)),
        (4, Instruction::i_type(Opcode::Jr, 0, 1, 0)),
        (8, Instruction::i_type(Opcode::Daddi, 2, 0, 99)),
        (16, Instruction::i_type(Opcode::Daddi, 2, 0, 7)),
        (20, Instruction::halt()),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(2), 7);
}

#[test]
fn jalr_links_and_jumps() {
    let mut ctx = TestContext::new().load_sparse(&[
        (0, Instruction::r_type(Opcode::Jalr, 5, 1, 0)),
        (4, Instruction::i_type(Opcode::Daddi, 2, 0, 99)),
        (16, Instruction::halt()),
    ]);
    ctx.set_reg(1, 16);
    ctx.run();
    assert_eq!(ctx.get_reg(5), 4, "jalr links into rd");
    assert_eq!(ctx.get_reg(2), 0);
}

#[test]
fn backward_branch_builds_a_counted_loop() {
    // r1 counts down from 3; r2 accumulates the trip count.
    let mut ctx = TestContext::new().load_sparse(&[
        (0, Instruction::i_type(Opcode::Daddi, 1, 0, 3)),
        (4, Instruction::i_type(Opcode::Daddi, 2, 0, 0)),
        // loop: r2 += 1; r1 -= 1; bne r1, r0, loop
        (8, Instruction::i_type(Opcode::Daddi, 2, 2, 1)),
        (12, Instruction::i_type(Opcode::Daddi, 1, 1, -1)),
        // target = 16 + 4 + (-3 * 4) = 8
        (16, Instruction::branch(Opcode::Bne, 1, 0, -3)),
        (20, Instruction::halt()),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(2), 3, "loop body runs three times");
    assert_eq!(ctx.sim.stats().taken_branches, 2, "taken twice, falls through once");
}
