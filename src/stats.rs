//! Simulation statistics collection and reporting.
//!
//! This module tracks the externally observable counters of a run. It
//! provides:
//! 1. **Cycle and CPI:** Total cycles, committed instructions, and derived
//!    metrics.
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch,
//!    floating point, system).
//! 3. **Stalls:** RAW, WAW, and structural stall cycles, tracked
//!    separately.

use serde::Serialize;

/// Simulation statistics tracking all performance counters.
///
/// Stall counters are the primary correctness surface of the pipeline
/// model: tests compare them cycle-for-cycle against expected hazard
/// behavior.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SimStats {
    /// Total simulated cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (bubbles and nops excluded).
    pub instructions_committed: u64,

    /// Count of integer ALU instructions committed.
    pub inst_alu: u64,
    /// Count of load instructions committed (integer and FP).
    pub inst_load: u64,
    /// Count of store instructions committed (integer and FP).
    pub inst_store: u64,
    /// Count of branch and jump instructions committed.
    pub inst_branch: u64,
    /// Count of floating-point arithmetic instructions committed.
    pub inst_fp: u64,
    /// Count of system instructions committed (syscall, break).
    pub inst_system: u64,

    /// Stall cycles caused by read-after-write hazards.
    pub raw_stalls: u64,
    /// Stall cycles caused by write-after-write hazards.
    pub waw_stalls: u64,
    /// Stall cycles caused by memory-port contention.
    pub structural_stalls: u64,

    /// Taken control transfers (branches, jumps).
    pub taken_branches: u64,
}

/// Section names accepted by [`SimStats::print_sections`].
///
/// Pass an empty slice to print every section.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "stalls"];

impl SimStats {
    /// Total stall cycles of every kind.
    pub fn total_stalls(&self) -> u64 {
        self.raw_stalls + self.waw_stalls + self.structural_stalls
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`];
    /// an empty slice prints all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let instr = if self.instructions_committed == 0 {
            1
        } else {
            self.instructions_committed
        };

        if want("summary") {
            let cpi = cyc as f64 / instr as f64;
            println!("\n==========================================================");
            println!("MIPS64 PIPELINE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_insts                {}", self.instructions_committed);
            println!("sim_cpi                  {cpi:.4}");
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            let total = instr as f64;
            let row = |name: &str, count: u64| {
                println!(
                    "  op.{:<20} {} ({:.2}%)",
                    name,
                    count,
                    (count as f64 / total) * 100.0
                );
            };
            println!("INSTRUCTION MIX");
            row("alu", self.inst_alu);
            row("load", self.inst_load);
            row("store", self.inst_store);
            row("branch", self.inst_branch);
            row("fp", self.inst_fp);
            row("system", self.inst_system);
            println!("----------------------------------------------------------");
        }
        if want("stalls") {
            let row = |name: &str, count: u64| {
                println!(
                    "  stalls.{:<16} {} ({:.2}%)",
                    name,
                    count,
                    (count as f64 / cyc as f64) * 100.0
                );
            };
            println!("STALL BREAKDOWN");
            row("raw", self.raw_stalls);
            row("waw", self.waw_stalls);
            row("structural", self.structural_stalls);
            println!("  branches.taken         {}", self.taken_branches);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
