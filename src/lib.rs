//! A cycle-accurate educational MIPS64 pipeline simulator.
//!
//! This crate models a classic five-stage in-order MIPS64 pipeline (fetch,
//! decode, execute, memory, writeback) at single-cycle granularity, built
//! for teaching pipeline behavior rather than raw simulation speed. Every
//! stall is attributable: read-after-write and write-after-write hazards
//! are enforced with per-register write semaphores, memory-port contention
//! is modeled with configurable access latency, and each stall cycle is
//! counted by kind.
//!
//! The machine is an explicit value. Construct a [`Simulator`], load a
//! program, and step it:
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use mips64_core::isa::{Instruction, Opcode};
//! use mips64_core::sim::SymbolTable;
//! use mips64_core::{Config, Simulator};
//!
//! let mut program = BTreeMap::new();
//! program.insert(0x0, Instruction::i_type(Opcode::Daddi, 1, 0, 40));
//! program.insert(0x4, Instruction::i_type(Opcode::Daddi, 2, 0, 2));
//! program.insert(0x8, Instruction::r_type(Opcode::Dadd, 3, 1, 2));
//! program.insert(0xC, Instruction::halt());
//!
//! let mut sim = Simulator::new(Config::default());
//! sim.load_program(program, SymbolTable::new()).unwrap();
//! sim.run_to_halt(1_000).unwrap();
//!
//! use mips64_core::core::arch::RegBank;
//! assert_eq!(sim.read_register(RegBank::Gpr, 3).as_u64(), 42);
//! ```
//!
//! Key design points:
//! - **Fetch-resolved control transfers.** Branches and jumps read their
//!   operands and redirect the PC during their own fetch cycle, stalling
//!   in fetch when an operand is still in flight.
//! - **Stage hooks report events.** Each stage returns a
//!   [`StageEvent`](common::error::StageEvent); the pipeline engine alone
//!   decides what a stall, redirect, halt, or fault means for the machine.
//! - **Maskable arithmetic exceptions.** Integer overflow and the IEEE 754
//!   fault kinds trap or fall back per the [`Config`] exception masks.

/// Shared leaf types: bit vectors, faults, events.
pub mod common;
/// Run configuration.
pub mod config;
/// Architectural state, memory, and the pipeline engine.
pub mod core;
/// The instruction set and its binary encoding.
pub mod isa;
/// The simulator facade.
pub mod sim;
/// Performance counters.
pub mod stats;

pub use config::Config;
pub use sim::{Simulator, StepOutcome};
