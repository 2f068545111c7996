//! The five-stage in-order pipeline engine.
//!
//! This module implements the cycle-accurate pipeline model. It provides:
//! 1. **Transits:** The record an instruction carries through the pipeline,
//!    with its latched operands and per-stage progress flags.
//! 2. **The engine:** One `advance` call per simulated cycle, processing
//!    stages writeback-side first so a stage empties before the one behind
//!    it tries to advance.
//! 3. **Squashing:** Removal of wrong-path instructions after a taken
//!    control transfer, releasing any register claims they hold.
//!
//! Stage hooks report [`StageEvent`]s; this module is the only place that
//! turns those events into stalls, redirects, squashes, or machine-level
//! outcomes.

/// Operand forwarding and source resolution.
pub mod hazards;
/// Per-stage instruction behavior.
pub mod stages;

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::common::bits::BitVector64;
use crate::common::error::{Fault, HazardKind, StageEvent};
use crate::config::Config;
use crate::core::arch::{RegBank, RegisterFile};
use crate::core::mem::Memory;
use crate::isa::{Instruction, OpCategory, Opcode};
use crate::stats::SimStats;

use hazards::collect_forwards;

/// A pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Instruction fetch. Control transfers resolve here.
    Fetch,
    /// Decode, operand read, and hazard checks.
    Decode,
    /// ALU and FP execution; effective address computation.
    Execute,
    /// Data memory access.
    Memory,
    /// Register commit and semaphore release.
    Writeback,
}

impl Stage {
    /// All stages, fetch first.
    pub const ALL: [Stage; 5] = [
        Stage::Fetch,
        Stage::Decode,
        Stage::Execute,
        Stage::Memory,
        Stage::Writeback,
    ];

    /// Slot index of this stage.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Fetch => "IF",
            Stage::Decode => "ID",
            Stage::Execute => "EX",
            Stage::Memory => "MEM",
            Stage::Writeback => "WB",
        }
    }
}

/// An instruction in flight.
///
/// Created at fetch and dropped the cycle after it commits. Progress flags
/// record which stage hooks have completed, so a stalled transit is retried
/// rather than re-entered.
#[derive(Clone, Debug)]
pub struct Transit {
    /// Program-order serial number, monotonically increasing per fetch.
    pub serial: u64,
    /// Address the instruction was fetched from.
    pub pc: u64,
    /// The decoded instruction.
    pub instr: Instruction,

    /// Whether the fetch hook has completed (control transfers resolved).
    pub fetch_done: bool,
    /// Whether decode latched operands and claimed the destination.
    pub decode_done: bool,
    /// Whether the memory stage has finished with this instruction.
    pub mem_done: bool,
    /// Memory port cycles still owed; `None` until the access starts.
    pub mem_cycles_left: Option<u64>,

    /// The destination claim taken at decode, released at writeback.
    pub claimed: Option<(RegBank, u8)>,
    /// First latched source operand.
    pub op_a: BitVector64,
    /// Second latched source operand (store data for stores).
    pub op_b: BitVector64,
    /// The value destined for the claimed register, once produced.
    pub result: Option<BitVector64>,
    /// Effective address, computed at execute for loads and stores.
    pub mem_addr: u64,
}

impl Transit {
    fn new(serial: u64, pc: u64, instr: Instruction) -> Self {
        Self {
            serial,
            pc,
            instr,
            fetch_done: false,
            decode_done: false,
            mem_done: false,
            mem_cycles_left: None,
            claimed: None,
            op_a: BitVector64::ZERO,
            op_b: BitVector64::ZERO,
            result: None,
            mem_addr: 0,
        }
    }
}

/// Machine-level outcome of one pipeline cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle completed with no machine-level event.
    Normal,
    /// The program terminator committed; the machine halts.
    Halted,
    /// A breakpoint committed; simulation pauses but may resume.
    Breakpoint,
    /// A fatal fault was raised; the machine transitions to faulted.
    Fault(Fault),
}

/// The pipeline: five slots, a fetch freeze flag, and a serial counter.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    slots: [Option<Transit>; 5],
    fetch_frozen: bool,
    next_serial: u64,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The transit currently occupying a stage, if any.
    pub fn slot(&self, stage: Stage) -> Option<&Transit> {
        self.slots[stage.index()].as_ref()
    }

    /// Removes transits younger than `serial`, releasing their claims.
    ///
    /// Called after a taken control transfer. Transfers resolve in their
    /// own fetch cycle before anything younger is fetched, so this usually
    /// finds nothing; it exists to keep the redirect path self-contained.
    fn squash_younger(&mut self, serial: u64, regs: &mut RegisterFile) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|t| t.serial > serial) {
                let t = slot.take().unwrap();
                trace!(pc = format_args!("{:#x}", t.pc), "squashed wrong-path instruction");
                if let Some((bank, idx)) = t.claimed {
                    regs.release(bank, idx);
                }
            }
        }
    }

    /// Advances the pipeline by one cycle.
    ///
    /// Stages are processed writeback-side first: a slot is vacated before
    /// the younger instruction behind it tries to move in, and a stalled
    /// transit is retried in place. Fetch runs last so a control transfer
    /// resolving this cycle redirects the PC before the next fetch.
    ///
    /// A fatal fault aborts the cycle immediately; the caller must stop
    /// stepping the machine. The faulting transit stays in its slot so the
    /// final snapshot still shows which instruction raised it.
    pub fn advance(
        &mut self,
        regs: &mut RegisterFile,
        mem: &mut Memory,
        program: &BTreeMap<u64, Instruction>,
        cfg: &Config,
        stats: &mut SimStats,
    ) -> CycleOutcome {
        const IF: usize = Stage::Fetch as usize;
        const ID: usize = Stage::Decode as usize;
        const EX: usize = Stage::Execute as usize;
        const MEM: usize = Stage::Memory as usize;
        const WB: usize = Stage::Writeback as usize;

        let mut outcome = CycleOutcome::Normal;

        // Writeback: last cycle's commit leaves the pipeline.
        self.slots[WB] = None;

        // Memory -> writeback: commit, release the claim, classify.
        if self.slots[MEM].as_ref().is_some_and(|t| t.mem_done) {
            let mut t = self.slots[MEM].take().unwrap();
            let ev = t.writeback_hook(regs);
            trace!(pc = format_args!("{:#x}", t.pc), instr = %t.instr, "commit");
            Self::record_commit(&t, stats);
            match ev {
                StageEvent::Halt => outcome = CycleOutcome::Halted,
                StageEvent::Breakpoint => outcome = CycleOutcome::Breakpoint,
                _ => {}
            }
            self.slots[WB] = Some(t);
        }

        // Memory: retry a pending access, or admit the executed transit.
        if self.slots[MEM].as_ref().is_some_and(|t| !t.mem_done) {
            let mut t = self.slots[MEM].take().unwrap();
            let ev = t.memory_hook(mem, cfg);
            self.slots[MEM] = Some(t);
            if let Some(fault) = Self::handle_mem_event(ev, stats) {
                return CycleOutcome::Fault(fault);
            }
        } else if self.slots[MEM].is_none() {
            if let Some(mut t) = self.slots[EX].take() {
                let ev = t.memory_hook(mem, cfg);
                self.slots[MEM] = Some(t);
                if let Some(fault) = Self::handle_mem_event(ev, stats) {
                    return CycleOutcome::Fault(fault);
                }
            }
        }

        // Execute: runs once, on entry; it never stalls.
        if self.slots[EX].is_none() && self.slots[ID].as_ref().is_some_and(|t| t.decode_done) {
            let mut t = self.slots[ID].take().unwrap();
            let ev = t.execute_hook(cfg);
            let pc = t.pc;
            self.slots[EX] = Some(t);
            if let StageEvent::Fault(fault) = ev {
                warn!(pc = format_args!("{:#x}", pc), %fault, "execute fault");
                return CycleOutcome::Fault(fault);
            }
        }

        // Decode: retry a stalled transit, or admit the fetched one.
        if self.slots[ID].as_ref().is_some_and(|t| !t.decode_done) {
            self.run_decode(ID, regs, cfg, stats);
        } else if self.slots[ID].is_none()
            && self.slots[IF].as_ref().is_some_and(|t| t.fetch_done)
        {
            let t = self.slots[IF].take().unwrap();
            self.slots[ID] = Some(t);
            self.run_decode(ID, regs, cfg, stats);
        }

        // Fetch retry: a control transfer still waiting on an operand.
        if self.slots[IF].as_ref().is_some_and(|t| !t.fetch_done) {
            self.run_fetch_hook(IF, regs, cfg, stats);
        }

        // Fetch: bring in the next instruction and resolve it immediately.
        if self.slots[IF].is_none() && !self.fetch_frozen {
            let pc = regs.pc;
            regs.pc = pc.wrapping_add(4);
            if let Some(instr) = program.get(&pc) {
                let t = Transit::new(self.next_serial, pc, *instr);
                self.next_serial += 1;
                if instr.opcode == Opcode::Syscall && instr.imm == 0 {
                    debug!(pc = format_args!("{:#x}", pc), "terminator fetched, freezing fetch");
                    self.fetch_frozen = true;
                }
                self.slots[IF] = Some(t);
                self.run_fetch_hook(IF, regs, cfg, stats);
            }
        }

        outcome
    }

    /// Runs the fetch hook on the transit in `slot`, handling stalls and
    /// taken control transfers.
    fn run_fetch_hook(
        &mut self,
        slot: usize,
        regs: &mut RegisterFile,
        cfg: &Config,
        stats: &mut SimStats,
    ) {
        let forwards = collect_forwards(&self.slots);
        let mut t = self.slots[slot].take().unwrap();
        match t.fetch_hook(regs, &forwards, cfg) {
            StageEvent::Stall(kind) => Self::record_stall(kind, stats),
            StageEvent::ControlTransfer(target) => {
                debug!(
                    pc = format_args!("{:#x}", t.pc),
                    target = format_args!("{:#x}", target),
                    "control transfer"
                );
                stats.taken_branches += 1;
                regs.pc = target;
                let serial = t.serial;
                self.slots[slot] = Some(t);
                self.squash_younger(serial, regs);
                return;
            }
            _ => {}
        }
        self.slots[slot] = Some(t);
    }

    /// Runs the decode hook on the transit in `slot`, counting stalls.
    fn run_decode(&mut self, slot: usize, regs: &mut RegisterFile, cfg: &Config, stats: &mut SimStats) {
        let forwards = collect_forwards(&self.slots);
        let mut t = self.slots[slot].take().unwrap();
        if let StageEvent::Stall(kind) = t.decode_hook(regs, &forwards, cfg) {
            trace!(pc = format_args!("{:#x}", t.pc), ?kind, "decode stall");
            Self::record_stall(kind, stats);
        }
        self.slots[slot] = Some(t);
    }

    /// Maps a memory-stage event to stall accounting or a fatal fault.
    fn handle_mem_event(ev: StageEvent, stats: &mut SimStats) -> Option<Fault> {
        match ev {
            StageEvent::Stall(kind) => {
                Self::record_stall(kind, stats);
                None
            }
            StageEvent::Fault(fault) => {
                warn!(%fault, "memory fault");
                Some(fault)
            }
            _ => None,
        }
    }

    fn record_stall(kind: HazardKind, stats: &mut SimStats) {
        match kind {
            HazardKind::Raw => stats.raw_stalls += 1,
            HazardKind::Waw => stats.waw_stalls += 1,
            HazardKind::Structural => stats.structural_stalls += 1,
        }
    }

    /// Updates commit counters for an instruction entering writeback.
    fn record_commit(t: &Transit, stats: &mut SimStats) {
        let category = t.instr.opcode.category();
        if category == OpCategory::Nop {
            return;
        }
        stats.instructions_committed += 1;
        match category {
            OpCategory::Alu => stats.inst_alu += 1,
            OpCategory::Load => stats.inst_load += 1,
            OpCategory::Store => stats.inst_store += 1,
            OpCategory::Branch => stats.inst_branch += 1,
            OpCategory::Fp => stats.inst_fp += 1,
            OpCategory::System => stats.inst_system += 1,
            OpCategory::Nop => unreachable!(),
        }
    }
}
