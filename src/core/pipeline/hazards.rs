//! Operand forwarding and hazard resolution.
//!
//! This module implements the data paths that let dependent instructions
//! proceed without waiting for writeback. It provides:
//! 1. **Forward collection:** A per-cycle scan of the execute and memory
//!    slots for in-flight results.
//! 2. **Source resolution:** The single lookup used by the fetch and decode
//!    hooks to obtain an operand or report a RAW stall.

use crate::common::bits::BitVector64;
use crate::config::Config;
use crate::core::arch::{RegBank, RegisterFile};
use crate::core::pipeline::{Stage, Transit};

/// A register claim held by an in-flight instruction.
///
/// `value` is `None` while the producer has not yet computed its result
/// (a load still heading to the memory stage); a consumer that matches
/// such an entry must stall even with forwarding enabled.
#[derive(Clone, Copy, Debug)]
pub struct Forward {
    /// Claimed register bank.
    pub bank: RegBank,
    /// Claimed register index.
    pub idx: u8,
    /// The in-flight result, once produced.
    pub value: Option<BitVector64>,
}

/// Scans the execute and memory slots for in-flight register claims.
///
/// The execute slot is scanned first so a consumer always sees the
/// youngest producer of a register. Collected into an owned vector so the
/// stage hooks can borrow pipeline slots mutably while consulting it.
pub fn collect_forwards(slots: &[Option<Transit>; 5]) -> Vec<Forward> {
    let mut out = Vec::new();
    for stage in [Stage::Execute, Stage::Memory] {
        if let Some(t) = slots[stage.index()].as_ref() {
            if let Some((bank, idx)) = t.claimed {
                out.push(Forward {
                    bank,
                    idx,
                    value: t.result,
                });
            }
        }
    }
    out
}

/// Resolves one source register for a stage hook.
///
/// If no in-flight instruction claims the register, the architectural
/// value is returned. Otherwise, with forwarding enabled, the youngest
/// in-flight producer's result is bypassed if it exists yet. `None` means
/// the consumer must stall on a RAW hazard this cycle.
pub fn read_source(
    regs: &RegisterFile,
    forwards: &[Forward],
    cfg: &Config,
    bank: RegBank,
    idx: u8,
) -> Option<BitVector64> {
    if regs.semaphore(bank, idx) == 0 {
        return Some(regs.read(bank, idx));
    }
    if cfg.forwarding {
        if let Some(fw) = forwards.iter().find(|f| f.bank == bank && f.idx == idx) {
            return fw.value;
        }
    }
    None
}
