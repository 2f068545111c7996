//! Machine Lifecycle Tests.
//!
//! Verifies the ready/running/halted/faulted state machine, misuse
//! rejection, reset semantics, and breakpoint behavior.

use mips64_core::common::bits::Width;
use mips64_core::common::error::SimError;
use mips64_core::isa::{Instruction, Opcode};
use mips64_core::sim::{MachineStatus, StepOutcome};
use pretty_assertions::assert_eq;

use crate::common::TestContext;

// ══════════════════════════════════════════════════════════
// 1. State machine
// ══════════════════════════════════════════════════════════

#[test]
fn first_step_moves_ready_to_running() {
    let mut ctx = TestContext::new().load(&[Instruction::halt()]);
    assert_eq!(ctx.sim.status(), MachineStatus::Ready);
    assert_eq!(ctx.sim.step().unwrap(), StepOutcome::Running);
    assert_eq!(ctx.sim.status(), MachineStatus::Running);
}

#[test]
fn stepping_a_halted_machine_is_an_error() {
    let mut ctx = TestContext::new().load(&[Instruction::halt()]);
    ctx.run();
    assert_eq!(ctx.sim.status(), MachineStatus::Halted);
    assert_eq!(ctx.sim.step(), Err(SimError::AlreadyHalted));
}

#[test]
fn loading_mid_run_is_rejected() {
    let mut ctx = TestContext::new().load(&[
        Instruction::i_type(Opcode::Daddi, 1, 0, 1),
        Instruction::halt(),
    ]);
    ctx.sim.step().unwrap();
    let err = ctx
        .sim
        .load_program(Default::default(), Default::default())
        .unwrap_err();
    assert_eq!(err, SimError::LoadWhileRunning);
}

#[test]
fn run_to_halt_enforces_the_cycle_budget() {
    // beq r0, r0, -1 branches back to itself forever.
    let mut ctx = TestContext::new().load(&[Instruction::branch(Opcode::Beq, 0, 0, -1)]);
    assert_eq!(
        ctx.sim.run_to_halt(100),
        Err(SimError::CycleLimitExceeded(100)),
    );
    assert_eq!(ctx.sim.stats().cycles, 100);
}

// ══════════════════════════════════════════════════════════
// 2. Breakpoints
// ══════════════════════════════════════════════════════════

#[test]
fn breakpoint_pauses_without_stopping_the_machine() {
    let mut ctx = TestContext::new().load(&[
        Instruction::brk(),
        Instruction::i_type(Opcode::Daddi, 1, 0, 3),
        Instruction::halt(),
    ]);
    let mut saw_breakpoint = false;
    loop {
        match ctx.sim.step().unwrap() {
            StepOutcome::Breakpoint => {
                saw_breakpoint = true;
                assert_eq!(ctx.sim.status(), MachineStatus::Running);
            }
            StepOutcome::Halted => break,
            StepOutcome::Running => {}
        }
    }
    assert!(saw_breakpoint);
    assert_eq!(ctx.get_reg(1), 3, "execution resumes past the breakpoint");
    assert_eq!(ctx.sim.stats().inst_system, 2, "break and the terminator");
}

#[test]
fn run_to_halt_steps_through_breakpoints() {
    let mut ctx = TestContext::new().load(&[
        Instruction::brk(),
        Instruction::halt(),
    ]);
    ctx.sim.run_to_halt(100).unwrap();
    assert_eq!(ctx.sim.status(), MachineStatus::Halted);
}

// ══════════════════════════════════════════════════════════
// 3. Reset
// ══════════════════════════════════════════════════════════

#[test]
fn reset_returns_a_pristine_ready_machine() {
    let mut ctx = TestContext::new().load(&[
        Instruction::i_type(Opcode::Daddi, 1, 0, 42),
        Instruction::halt(),
    ]);
    ctx.run();
    assert_eq!(ctx.get_reg(1), 42);

    ctx.sim.reset();
    assert_eq!(ctx.sim.status(), MachineStatus::Ready);
    assert_eq!(ctx.get_reg(1), 0, "registers wiped");
    assert_eq!(ctx.sim.stats().cycles, 0, "stats wiped");
    assert!(ctx.sim.symbols().is_empty(), "symbols wiped");

    // The machine is fully reusable.
    ctx.sim
        .load_program(
            [
                (0u64, Instruction::i_type(Opcode::Daddi, 2, 0, 7)),
                (4, Instruction::halt()),
            ]
            .into_iter()
            .collect(),
            Default::default(),
        )
        .unwrap();
    ctx.run();
    assert_eq!(ctx.get_reg(2), 7);
}

#[test]
fn forwarding_retoggles_across_a_reset_without_rebuilding() {
    // An adjacent dependent ALU pair: 0 RAW stalls forwarded, 2 without.
    let program = [
        Instruction::i_type(Opcode::Daddi, 1, 0, 1),
        Instruction::r_type(Opcode::Dadd, 2, 1, 1),
        Instruction::halt(),
    ];
    let mut ctx = TestContext::new().load(&program);
    ctx.run();
    assert_eq!(ctx.sim.stats().raw_stalls, 0);

    ctx.sim.reset();
    ctx.sim.config_mut().forwarding = false;
    ctx.sim
        .load_program(
            program
                .iter()
                .enumerate()
                .map(|(i, &instr)| ((i as u64) * 4, instr))
                .collect(),
            Default::default(),
        )
        .unwrap();
    ctx.run();
    assert_eq!(ctx.sim.stats().raw_stalls, 2);
    assert_eq!(ctx.get_reg(2), 2);
}

#[test]
fn rerunning_after_reset_reproduces_the_first_run_exactly() {
    let program = [
        (0u64, Instruction::i_type(Opcode::Daddi, 1, 0, 5)),
        (4, Instruction::r_type(Opcode::Dadd, 2, 1, 1)),
        (8, Instruction::i_type(Opcode::Sd, 2, 0, 32)),
        (12, Instruction::branch(Opcode::Bne, 2, 0, 1)),
        (20, Instruction::halt()),
    ];
    let read_stored = |ctx: &TestContext| {
        ctx.sim
            .memory()
            .read(32, Width::DoubleWord)
            .unwrap()
            .as_u64()
    };

    let mut ctx = TestContext::new().load_sparse(&program);
    ctx.run();
    let first_cycles = ctx.sim.stats().cycles;
    let first_stalls = ctx.sim.stats().raw_stalls;
    let first_r2 = ctx.get_reg(2);
    let first_stored = read_stored(&ctx);

    ctx.sim.reset();
    ctx.sim
        .load_program(program.into_iter().collect(), Default::default())
        .unwrap();
    ctx.run();

    assert_eq!(ctx.sim.stats().cycles, first_cycles);
    assert_eq!(ctx.sim.stats().raw_stalls, first_stalls);
    assert_eq!(ctx.get_reg(2), first_r2);
    assert_eq!(read_stored(&ctx), first_stored, "stored doubleword reproduced");
}
