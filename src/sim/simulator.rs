//! The machine aggregate and its stepping API.
//!
//! This module ties the architectural state, memory, pipeline, and program
//! together into one explicit [`Simulator`] value. It provides:
//! 1. **Lifecycle:** Ready, running, halted, and faulted states with
//!    synchronous rejection of out-of-order calls.
//! 2. **Stepping:** One pipeline cycle per `step`, plus a bounded
//!    `run_to_halt` convenience loop.
//! 3. **Reset:** Return to a pristine ready machine, keeping only the
//!    configuration.
//!
//! There is no global machine: every `Simulator` is independent, and tests
//! run as many as they like side by side.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::common::bits::BitVector64;
use crate::common::error::{Fault, SimError};
use crate::config::Config;
use crate::core::arch::{RegBank, RegisterFile};
use crate::core::mem::Memory;
use crate::core::pipeline::{CycleOutcome, Pipeline, Stage, Transit};
use crate::isa::Instruction;
use crate::sim::SymbolTable;
use crate::stats::SimStats;

/// Machine lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum MachineStatus {
    /// No cycles executed since construction, reset, or program load.
    Ready,
    /// At least one cycle executed; the program has not ended.
    Running,
    /// The program terminator committed.
    Halted,
    /// A fatal fault stopped the machine.
    Faulted,
}

/// What a successful [`Simulator::step`] observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cycle completed; the machine keeps running.
    Running,
    /// A breakpoint committed this cycle; stepping may continue.
    Breakpoint,
    /// The program terminator committed; the machine is halted.
    Halted,
}

/// A complete simulated machine.
#[derive(Debug)]
pub struct Simulator {
    config: Config,
    regs: RegisterFile,
    mem: Memory,
    pipeline: Pipeline,
    program: BTreeMap<u64, Instruction>,
    symbols: SymbolTable,
    stats: SimStats,
    status: MachineStatus,
    fault: Option<Fault>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Simulator {
    /// Creates a ready machine with the given configuration and no program.
    pub fn new(config: Config) -> Self {
        Self {
            regs: RegisterFile::new(),
            mem: Memory::new(config.memory.size),
            pipeline: Pipeline::new(),
            program: BTreeMap::new(),
            symbols: SymbolTable::new(),
            stats: SimStats::default(),
            status: MachineStatus::Ready,
            fault: None,
            config,
        }
    }

    /// Loads a program image and its symbol table.
    ///
    /// Addresses are instruction-word aligned keys into the image; fetch
    /// misses between mapped addresses produce pipeline bubbles. Loading
    /// resets the PC to the lowest mapped address (0 for an empty image).
    ///
    /// # Errors
    ///
    /// [`SimError::LoadWhileRunning`] unless the machine is in the ready
    /// state; reset first to replace a program mid-run.
    pub fn load_program(
        &mut self,
        program: BTreeMap<u64, Instruction>,
        symbols: SymbolTable,
    ) -> Result<(), SimError> {
        if self.status != MachineStatus::Ready {
            return Err(SimError::LoadWhileRunning);
        }
        self.regs.pc = program.keys().next().copied().unwrap_or(0);
        info!(
            instructions = program.len(),
            entry = format_args!("{:#x}", self.regs.pc),
            "program loaded"
        );
        self.program = program;
        self.symbols = symbols;
        Ok(())
    }

    /// Executes one pipeline cycle.
    ///
    /// A ready machine transitions to running on its first step. A
    /// breakpoint outcome does not stop the machine; calling `step` again
    /// resumes past it.
    ///
    /// # Errors
    ///
    /// [`SimError::AlreadyHalted`] or [`SimError::AlreadyFaulted`] if the
    /// machine already stopped; [`SimError::Fault`] carrying the fault
    /// raised during this cycle.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        match self.status {
            MachineStatus::Halted => return Err(SimError::AlreadyHalted),
            MachineStatus::Faulted => return Err(SimError::AlreadyFaulted),
            MachineStatus::Ready => self.status = MachineStatus::Running,
            MachineStatus::Running => {}
        }

        self.stats.cycles += 1;
        match self.pipeline.advance(
            &mut self.regs,
            &mut self.mem,
            &self.program,
            &self.config,
            &mut self.stats,
        ) {
            CycleOutcome::Normal => Ok(StepOutcome::Running),
            CycleOutcome::Breakpoint => {
                debug!(cycle = self.stats.cycles, "breakpoint");
                Ok(StepOutcome::Breakpoint)
            }
            CycleOutcome::Halted => {
                info!(
                    cycles = self.stats.cycles,
                    instructions = self.stats.instructions_committed,
                    "program halted"
                );
                self.status = MachineStatus::Halted;
                Ok(StepOutcome::Halted)
            }
            CycleOutcome::Fault(fault) => {
                self.status = MachineStatus::Faulted;
                self.fault = Some(fault);
                Err(SimError::Fault(fault))
            }
        }
    }

    /// Steps until the program halts, pausing for nothing.
    ///
    /// Breakpoints are stepped through.
    ///
    /// # Errors
    ///
    /// [`SimError::CycleLimitExceeded`] if the program does not halt within
    /// `max_cycles`; any error [`Simulator::step`] reports.
    pub fn run_to_halt(&mut self, max_cycles: u64) -> Result<(), SimError> {
        for _ in 0..max_cycles {
            if let StepOutcome::Halted = self.step()? {
                return Ok(());
            }
        }
        Err(SimError::CycleLimitExceeded(max_cycles))
    }

    /// Returns the machine to a pristine ready state.
    ///
    /// Registers, memory, pipeline, statistics, program, and symbols are
    /// all cleared; only the configuration survives.
    pub fn reset(&mut self) {
        info!("machine reset");
        self.regs = RegisterFile::new();
        self.mem = Memory::new(self.config.memory.size);
        self.pipeline = Pipeline::new();
        self.program.clear();
        self.symbols = SymbolTable::new();
        self.stats = SimStats::default();
        self.status = MachineStatus::Ready;
        self.fault = None;
    }

    /// The machine's lifecycle state.
    pub fn status(&self) -> MachineStatus {
        self.status
    }

    /// The fault that stopped the machine, if it is faulted.
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the active configuration.
    ///
    /// Forwarding and exception-mask changes take effect from the next
    /// cycle; the usual pattern is to retoggle between runs, around a
    /// [`Simulator::reset`]. A memory size change only applies once a reset
    /// rebuilds the memory.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Statistics accumulated since the last reset.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// The architectural register file.
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Reads a register directly, bypassing the pipeline.
    pub fn read_register(&self, bank: RegBank, idx: u8) -> BitVector64 {
        self.regs.read(bank, idx)
    }

    /// Writes a register directly, bypassing the pipeline.
    ///
    /// Intended for test setup and frontend pokes on a ready machine.
    pub fn write_register(&mut self, bank: RegBank, idx: u8, value: BitVector64) {
        self.regs.write(bank, idx, value);
    }

    /// The data memory.
    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    /// Mutable access to data memory, for program data setup.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    /// The loaded symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The transit occupying a pipeline stage, if any.
    pub fn stage_occupant(&self, stage: Stage) -> Option<&Transit> {
        self.pipeline.slot(stage)
    }
}
