//! Decoded instruction records.
//!
//! An [`Instruction`] is the flat, format-agnostic record the pipeline
//! carries: an opcode plus the three register fields and the immediate.
//! Floating-point register fields map onto the same slots (fs into `rs`,
//! ft into `rt`, fd into `rd`); the bank a field refers to is a property of
//! the opcode, answered by the dependency queries below.
//!
//! Immediate conventions by format:
//! - Conditional branches store the signed offset in instruction words;
//!   the branch target is `pc + 4 + imm * 4`.
//! - `j`/`jal` store the 26-bit instruction index.
//! - `daddi`/`daddiu` and memory offsets store the sign-extended 16-bit
//!   immediate; `andi`/`ori`/`xori` store it zero-extended; `lui` stores
//!   the raw 16-bit field.
//! - `syscall`/`break` store the 20-bit code field.

use std::fmt;

use crate::core::arch::RegBank;
use crate::isa::Opcode;

/// A decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The operation.
    pub opcode: Opcode,
    /// First source register field (rs, or fs for FP opcodes).
    pub rs: u8,
    /// Second source register field (rt, or ft for FP opcodes).
    pub rt: u8,
    /// Destination register field for R-format (rd, or fd for FP opcodes).
    pub rd: u8,
    /// Immediate, already extended per the opcode's convention.
    pub imm: i32,
}

impl Instruction {
    /// Builds an R-format integer instruction: `op rd, rs, rt`.
    pub fn r_type(opcode: Opcode, rd: u8, rs: u8, rt: u8) -> Self {
        Self {
            opcode,
            rs,
            rt,
            rd,
            imm: 0,
        }
    }

    /// Builds an I-format instruction: `op rt, rs, imm` or `op rt, imm(rs)`.
    pub fn i_type(opcode: Opcode, rt: u8, rs: u8, imm: i32) -> Self {
        Self {
            opcode,
            rs,
            rt,
            rd: 0,
            imm,
        }
    }

    /// Builds a conditional branch: `op rs, rt, offset` with the offset in
    /// instruction words.
    pub fn branch(opcode: Opcode, rs: u8, rt: u8, word_offset: i32) -> Self {
        Self {
            opcode,
            rs,
            rt,
            rd: 0,
            imm: word_offset,
        }
    }

    /// Builds a `j`/`jal` from a 26-bit instruction index.
    pub fn jump(opcode: Opcode, index: i32) -> Self {
        Self {
            opcode,
            rs: 0,
            rt: 0,
            rd: 0,
            imm: index,
        }
    }

    /// Builds a double-precision FP operation: `op fd, fs, ft`.
    pub fn fp_r(opcode: Opcode, fd: u8, fs: u8, ft: u8) -> Self {
        Self {
            opcode,
            rs: fs,
            rt: ft,
            rd: fd,
            imm: 0,
        }
    }

    /// The canonical pipeline filler.
    pub fn nop() -> Self {
        Self::r_type(Opcode::Nop, 0, 0, 0)
    }

    /// The program terminator, `syscall` with code 0.
    pub fn halt() -> Self {
        Self {
            opcode: Opcode::Syscall,
            rs: 0,
            rt: 0,
            rd: 0,
            imm: 0,
        }
    }

    /// A breakpoint trap.
    pub fn brk() -> Self {
        Self {
            opcode: Opcode::Break,
            rs: 0,
            rt: 0,
            rd: 0,
            imm: 0,
        }
    }

    /// The register this instruction writes, if any.
    ///
    /// `jal` links into R31; loads and immediates write `rt`; R-format and
    /// FP operations write `rd`.
    pub fn destination(&self) -> Option<(RegBank, u8)> {
        use Opcode::*;
        match self.opcode {
            Dadd | Daddu | Dsub | Dsubu | And | Or | Xor | Slt | Sltu => {
                Some((RegBank::Gpr, self.rd))
            }
            Daddi | Daddiu | Andi | Ori | Xori | Lui => Some((RegBank::Gpr, self.rt)),
            Lb | Lh | Lw | Lbu | Lhu | Lwu | Ld => Some((RegBank::Gpr, self.rt)),
            Ldc1 => Some((RegBank::Fpr, self.rt)),
            Jal => Some((RegBank::Gpr, 31)),
            Jalr => Some((RegBank::Gpr, self.rd)),
            AddD | SubD | MulD | DivD => Some((RegBank::Fpr, self.rd)),
            _ => None,
        }
    }

    /// Registers read during the decode stage.
    ///
    /// Control transfers read their sources at fetch instead and report
    /// nothing here.
    pub fn decode_sources(&self) -> Vec<(RegBank, u8)> {
        use Opcode::*;
        match self.opcode {
            Dadd | Daddu | Dsub | Dsubu | And | Or | Xor | Slt | Sltu => {
                vec![(RegBank::Gpr, self.rs), (RegBank::Gpr, self.rt)]
            }
            Daddi | Daddiu | Andi | Ori | Xori => vec![(RegBank::Gpr, self.rs)],
            Lb | Lh | Lw | Lbu | Lhu | Lwu | Ld | Ldc1 => vec![(RegBank::Gpr, self.rs)],
            Sb | Sh | Sw | Sd => vec![(RegBank::Gpr, self.rs), (RegBank::Gpr, self.rt)],
            Sdc1 => vec![(RegBank::Gpr, self.rs), (RegBank::Fpr, self.rt)],
            AddD | SubD | MulD | DivD => vec![(RegBank::Fpr, self.rs), (RegBank::Fpr, self.rt)],
            _ => Vec::new(),
        }
    }

    /// Registers read during the fetch stage to resolve a control transfer.
    pub fn fetch_sources(&self) -> Vec<(RegBank, u8)> {
        use Opcode::*;
        match self.opcode {
            Beq | Bne => vec![(RegBank::Gpr, self.rs), (RegBank::Gpr, self.rt)],
            Bgez => vec![(RegBank::Gpr, self.rs)],
            Jr | Jalr => vec![(RegBank::Gpr, self.rs)],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Opcode::*;
        let m = self.opcode.mnemonic();
        match self.opcode {
            Nop | Syscall | Break => {
                if matches!(self.opcode, Syscall | Break) && self.imm != 0 {
                    write!(f, "{m} {}", self.imm)
                } else {
                    write!(f, "{m}")
                }
            }
            Dadd | Daddu | Dsub | Dsubu | And | Or | Xor | Slt | Sltu => {
                write!(f, "{m} r{}, r{}, r{}", self.rd, self.rs, self.rt)
            }
            Daddi | Daddiu | Andi | Ori | Xori => {
                write!(f, "{m} r{}, r{}, {}", self.rt, self.rs, self.imm)
            }
            Lui => write!(f, "{m} r{}, {}", self.rt, self.imm),
            Beq | Bne => write!(f, "{m} r{}, r{}, {}", self.rs, self.rt, self.imm * 4),
            Bgez => write!(f, "{m} r{}, {}", self.rs, self.imm * 4),
            J | Jal => write!(f, "{m} {:#x}", (self.imm as u32) << 2),
            Jr => write!(f, "{m} r{}", self.rs),
            Jalr => write!(f, "{m} r{}, r{}", self.rd, self.rs),
            Lb | Lh | Lw | Lbu | Lhu | Lwu | Ld => {
                write!(f, "{m} r{}, {}(r{})", self.rt, self.imm, self.rs)
            }
            Ldc1 | Sdc1 => write!(f, "{m} f{}, {}(r{})", self.rt, self.imm, self.rs),
            Sb | Sh | Sw | Sd => write!(f, "{m} r{}, {}(r{})", self.rt, self.imm, self.rs),
            AddD | SubD | MulD | DivD => {
                write!(f, "{m} f{}, f{}, f{}", self.rd, self.rs, self.rt)
            }
        }
    }
}
