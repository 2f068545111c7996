//! Serializable machine snapshots.
//!
//! A [`Snapshot`] is a point-in-time, owned view of everything a frontend
//! renders: cycle count, lifecycle state, per-stage pipeline occupancy,
//! both register banks, and the stall counters. It serializes with
//! `serde_json` and never borrows from the machine, so a frontend can keep
//! a history of them.

use serde::Serialize;

use crate::core::pipeline::Stage;
use crate::sim::{MachineStatus, Simulator};

/// One pipeline stage's occupant, as a frontend renders it.
#[derive(Clone, Debug, Serialize)]
pub struct StageView {
    /// Stage short name (IF, ID, EX, MEM, WB).
    pub stage: &'static str,
    /// Program-order serial of the occupant.
    pub serial: u64,
    /// Address the occupant was fetched from.
    pub pc: u64,
    /// Rendered assembly of the occupant.
    pub instruction: String,
}

/// Stall totals broken down by hazard kind.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StallCounters {
    /// Read-after-write stall cycles.
    pub raw: u64,
    /// Write-after-write stall cycles.
    pub waw: u64,
    /// Memory-port contention stall cycles.
    pub structural: u64,
}

/// A complete point-in-time view of the machine.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// Cycles executed since the last reset.
    pub cycle: u64,
    /// Machine lifecycle state.
    pub status: MachineStatus,
    /// Occupied pipeline stages, fetch first.
    pub pipeline: Vec<StageView>,
    /// General-purpose register values, R0 first.
    pub gpr: [u64; 32],
    /// Floating-point register bit patterns, F0 first.
    pub fpr: [u64; 32],
    /// The program counter.
    pub pc: u64,
    /// Stall totals by kind.
    pub stalls: StallCounters,
}

impl Snapshot {
    /// Captures the machine's current state.
    pub fn capture(sim: &Simulator) -> Self {
        let pipeline = Stage::ALL
            .iter()
            .filter_map(|&stage| {
                sim.stage_occupant(stage).map(|t| StageView {
                    stage: stage.name(),
                    serial: t.serial,
                    pc: t.pc,
                    instruction: t.instr.to_string(),
                })
            })
            .collect();
        let stats = sim.stats();
        Self {
            cycle: stats.cycles,
            status: sim.status(),
            pipeline,
            gpr: sim.registers().gpr_values(),
            fpr: sim.registers().fpr_values(),
            pc: sim.registers().pc,
            stalls: StallCounters {
                raw: stats.raw_stalls,
                waw: stats.waw_stalls,
                structural: stats.structural_stalls,
            },
        }
    }

    /// Serializes the snapshot as a JSON document.
    ///
    /// # Errors
    ///
    /// Propagates the underlying `serde_json` error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Simulator {
    /// Captures a [`Snapshot`] of this machine.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
