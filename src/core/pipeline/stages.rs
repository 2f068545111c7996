//! Per-stage instruction behavior.
//!
//! Each hook takes the machine state a real stage would touch and reports
//! a [`StageEvent`]; the pipeline engine decides what the event means. A
//! hook that stalls performs no mutation at all, so retrying it next cycle
//! is always safe.

use crate::common::bits::{BitVector64, Width};
use crate::common::error::{ArithmeticFault, Fault, HazardKind, StageEvent};
use crate::config::Config;
use crate::core::arch::RegisterFile;
use crate::core::mem::Memory;
use crate::core::pipeline::hazards::{read_source, Forward};
use crate::core::pipeline::Transit;
use crate::isa::Opcode;

impl Transit {
    /// Fetch-stage behavior: resolve control transfers.
    ///
    /// Non-transfer instructions complete immediately. Branches and jumps
    /// read their sources here, consulting forwards ahead of the semaphore
    /// check, and report the taken target as a [`StageEvent::ControlTransfer`].
    pub fn fetch_hook(
        &mut self,
        regs: &RegisterFile,
        forwards: &[Forward],
        cfg: &Config,
    ) -> StageEvent {
        use Opcode::*;

        if !self.instr.opcode.is_control_transfer() {
            self.fetch_done = true;
            return StageEvent::Normal;
        }

        let mut vals = [BitVector64::ZERO; 2];
        for (i, (bank, idx)) in self.instr.fetch_sources().into_iter().enumerate() {
            match read_source(regs, forwards, cfg, bank, idx) {
                Some(v) => vals[i] = v,
                None => return StageEvent::Stall(HazardKind::Raw),
            }
        }

        let rel_target = self
            .pc
            .wrapping_add(4)
            .wrapping_add(((self.instr.imm as i64) << 2) as u64);
        let abs_target =
            (self.pc & !0x0FFF_FFFF) | (((self.instr.imm as u32) as u64 & 0x03FF_FFFF) << 2);

        let target = match self.instr.opcode {
            Beq if vals[0] == vals[1] => Some(rel_target),
            Bne if vals[0] != vals[1] => Some(rel_target),
            Bgez if vals[0].signed_value(Width::DoubleWord) >= 0 => Some(rel_target),
            J | Jal => Some(abs_target),
            Jr | Jalr => Some(vals[0].as_u64()),
            _ => None,
        };

        self.fetch_done = true;
        match target {
            Some(t) => StageEvent::ControlTransfer(t),
            None => StageEvent::Normal,
        }
    }

    /// Decode-stage behavior: hazard checks, operand latch, claim.
    ///
    /// The WAW check on the destination runs first, then every source is
    /// resolved; only when nothing stalls are the operands latched and the
    /// destination semaphore claimed. Stalling therefore leaves no trace.
    pub fn decode_hook(
        &mut self,
        regs: &mut RegisterFile,
        forwards: &[Forward],
        cfg: &Config,
    ) -> StageEvent {
        if let Some((bank, idx)) = self.instr.destination() {
            // Forwarding never helps here: the older writer must commit
            // first or commits would land out of order.
            if regs.semaphore(bank, idx) > 0 {
                return StageEvent::Stall(HazardKind::Waw);
            }
        }

        let mut vals = [BitVector64::ZERO; 2];
        let sources = self.instr.decode_sources();
        for (i, &(bank, idx)) in sources.iter().enumerate() {
            match read_source(regs, forwards, cfg, bank, idx) {
                Some(v) => vals[i] = v,
                None => return StageEvent::Stall(HazardKind::Raw),
            }
        }

        if !sources.is_empty() {
            self.op_a = vals[0];
        }
        if sources.len() > 1 {
            self.op_b = vals[1];
        }
        if let Some((bank, idx)) = self.instr.destination() {
            regs.claim(bank, idx);
            self.claimed = Some((bank, idx));
        }
        self.decode_done = true;
        StageEvent::Normal
    }

    /// Execute-stage behavior: ALU and FP operations, address computation.
    ///
    /// Arithmetic faults consult the exception masks: a masked fault commits
    /// the operation's fallback value (wrapped integer, IEEE 754 default)
    /// and execution continues; an unmasked fault is fatal.
    pub fn execute_hook(&mut self, cfg: &Config) -> StageEvent {
        use Opcode::*;

        let a = self.op_a;
        let b = self.op_b;
        let imm = self.instr.imm;

        let checked = |(value, overflow): (BitVector64, bool)| {
            if overflow {
                if cfg.exceptions.is_masked(ArithmeticFault::Overflow) {
                    Ok(value)
                } else {
                    Err(Fault::Arithmetic(ArithmeticFault::Overflow))
                }
            } else {
                Ok(value)
            }
        };

        let result = match self.instr.opcode {
            Dadd => match checked(a.checked_add(b, Width::DoubleWord)) {
                Ok(v) => Some(v),
                Err(f) => return StageEvent::Fault(f),
            },
            Dsub => match checked(a.checked_sub(b, Width::DoubleWord)) {
                Ok(v) => Some(v),
                Err(f) => return StageEvent::Fault(f),
            },
            Daddi => {
                match checked(a.checked_add(BitVector64::from(i64::from(imm)), Width::DoubleWord)) {
                    Ok(v) => Some(v),
                    Err(f) => return StageEvent::Fault(f),
                }
            }
            Daddu => Some(a.checked_add(b, Width::DoubleWord).0),
            Dsubu => Some(a.checked_sub(b, Width::DoubleWord).0),
            Daddiu => Some(
                a.checked_add(BitVector64::from(i64::from(imm)), Width::DoubleWord)
                    .0,
            ),
            And => Some(BitVector64::from_u64(a.as_u64() & b.as_u64())),
            Or => Some(BitVector64::from_u64(a.as_u64() | b.as_u64())),
            Xor => Some(BitVector64::from_u64(a.as_u64() ^ b.as_u64())),
            Slt => Some(BitVector64::from_u64(u64::from(
                a.signed_value(Width::DoubleWord) < b.signed_value(Width::DoubleWord),
            ))),
            Sltu => Some(BitVector64::from_u64(u64::from(a.as_u64() < b.as_u64()))),
            Andi => Some(BitVector64::from_u64(a.as_u64() & (imm as u32 as u64))),
            Ori => Some(BitVector64::from_u64(a.as_u64() | (imm as u32 as u64))),
            Xori => Some(BitVector64::from_u64(a.as_u64() ^ (imm as u32 as u64))),
            Lui => Some(BitVector64::from(
                i64::from(((imm as u32) << 16) as i32),
            )),
            Jal | Jalr => Some(BitVector64::from_u64(self.pc.wrapping_add(4))),
            AddD | SubD | MulD | DivD => match self.execute_fp(cfg) {
                Ok(v) => Some(v),
                Err(f) => return StageEvent::Fault(f),
            },
            Lb | Lh | Lw | Lbu | Lhu | Lwu | Ld | Ldc1 | Sb | Sh | Sw | Sd | Sdc1 => {
                self.mem_addr = a.as_u64().wrapping_add(i64::from(imm) as u64);
                None
            }
            Beq | Bne | Bgez | J | Jr | Syscall | Break | Nop => None,
        };

        if result.is_some() {
            self.result = result;
        }
        StageEvent::Normal
    }

    /// Double-precision FP arithmetic with fault classification.
    ///
    /// Operands are the raw bit patterns of the FP registers. Fault kinds
    /// follow IEEE 754: an operation producing NaN from non-NaN inputs or
    /// consuming one is invalid; division of a nonzero finite value by zero
    /// is a zero divide; a finite computation landing on infinity overflows;
    /// a nonzero result below the smallest normal underflows. A masked
    /// fault keeps the IEEE default result.
    fn execute_fp(&self, cfg: &Config) -> Result<BitVector64, Fault> {
        use Opcode::*;

        let a = f64::from_bits(self.op_a.as_u64());
        let b = f64::from_bits(self.op_b.as_u64());
        let r = match self.instr.opcode {
            AddD => a + b,
            SubD => a - b,
            MulD => a * b,
            DivD => a / b,
            _ => unreachable!("not an FP arithmetic opcode"),
        };

        let kind = if a.is_nan() || b.is_nan() || r.is_nan() {
            Some(ArithmeticFault::InvalidOperation)
        } else if self.instr.opcode == DivD && b == 0.0 {
            Some(ArithmeticFault::DivideByZero)
        } else if r.is_infinite() && a.is_finite() && b.is_finite() {
            Some(ArithmeticFault::Overflow)
        } else if r != 0.0 && r.abs() < f64::MIN_POSITIVE {
            Some(ArithmeticFault::Underflow)
        } else {
            None
        };

        match kind {
            Some(k) if !cfg.exceptions.is_masked(k) => Err(Fault::Arithmetic(k)),
            _ => Ok(BitVector64::from_u64(r.to_bits())),
        }
    }

    /// Memory-stage behavior: the data access and its port occupancy.
    ///
    /// The access holds the memory port for the configured latency; every
    /// cycle beyond the first is reported as a structural stall. The actual
    /// read or write happens on the final cycle, so a faulting access has
    /// occupied the port like a successful one would.
    pub fn memory_hook(&mut self, mem: &mut Memory, cfg: &Config) -> StageEvent {
        use Opcode::*;

        let Some(width) = self.instr.opcode.mem_width() else {
            self.mem_done = true;
            return StageEvent::Normal;
        };

        let remaining = self
            .mem_cycles_left
            .get_or_insert(cfg.memory.latency.max(1));
        if *remaining > 1 {
            *remaining -= 1;
            return StageEvent::Stall(HazardKind::Structural);
        }

        let ev = match self.instr.opcode {
            Sb | Sh | Sw | Sd | Sdc1 => match mem.write(self.mem_addr, width, self.op_b) {
                Ok(()) => StageEvent::Normal,
                Err(fault) => StageEvent::Fault(fault),
            },
            _ => match mem.read(self.mem_addr, width) {
                Ok(raw) => {
                    self.result = Some(if self.instr.opcode.load_sign_extends() {
                        BitVector64::from(raw.signed_value(width))
                    } else {
                        raw
                    });
                    StageEvent::Normal
                }
                Err(fault) => StageEvent::Fault(fault),
            },
        };
        if !matches!(ev, StageEvent::Fault(_)) {
            self.mem_done = true;
        }
        ev
    }

    /// Writeback-stage behavior: commit and release.
    ///
    /// Writes the result to the claimed register, releases the claim, and
    /// reports program termination or a breakpoint.
    pub fn writeback_hook(&mut self, regs: &mut RegisterFile) -> StageEvent {
        if let Some((bank, idx)) = self.claimed.take() {
            if let Some(value) = self.result {
                regs.write(bank, idx, value);
            }
            regs.release(bank, idx);
        }
        match self.instr.opcode {
            Opcode::Syscall if self.instr.imm == 0 => StageEvent::Halt,
            Opcode::Break => StageEvent::Breakpoint,
            _ => StageEvent::Normal,
        }
    }
}
