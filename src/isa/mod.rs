//! The simulated MIPS64 instruction set.
//!
//! This module defines the supported instruction roster and its static
//! metadata. It provides:
//! 1. **Opcodes:** A closed enum of every supported operation with category
//!    predicates used by the pipeline and the statistics collector.
//! 2. **Instructions:** The decoded instruction record with its register
//!    dependency queries.
//! 3. **Encoding:** Conversion between 32-bit instruction words and decoded
//!    records.

/// Binary encoding and decoding of instruction words.
pub mod encode;
/// Decoded instruction records and dependency queries.
pub mod instruction;

pub use instruction::Instruction;

use crate::common::bits::Width;

/// Broad instruction category, used for statistics and stage dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCategory {
    /// Integer ALU operation.
    Alu,
    /// Memory load, integer or floating point.
    Load,
    /// Memory store, integer or floating point.
    Store,
    /// Branch or jump.
    Branch,
    /// Floating-point arithmetic.
    Fp,
    /// System operation (syscall, break).
    System,
    /// Pipeline filler; never counted as committed work.
    Nop,
}

/// Every operation the simulator models.
///
/// The roster is a closed enum: the pipeline matches on it exhaustively and
/// adding an instruction means extending every relevant match. There is no
/// per-instruction type hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Doubleword add, traps on overflow.
    Dadd,
    /// Doubleword add, wraps on overflow.
    Daddu,
    /// Doubleword subtract, traps on overflow.
    Dsub,
    /// Doubleword subtract, wraps on overflow.
    Dsubu,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Set on signed less-than.
    Slt,
    /// Set on unsigned less-than.
    Sltu,

    /// Doubleword add immediate, traps on overflow.
    Daddi,
    /// Doubleword add immediate, wraps on overflow.
    Daddiu,
    /// AND with zero-extended immediate.
    Andi,
    /// OR with zero-extended immediate.
    Ori,
    /// XOR with zero-extended immediate.
    Xori,
    /// Load upper immediate.
    Lui,

    /// Branch if equal.
    Beq,
    /// Branch if not equal.
    Bne,
    /// Branch if greater than or equal to zero.
    Bgez,
    /// Unconditional jump.
    J,
    /// Jump and link R31.
    Jal,
    /// Jump to register.
    Jr,
    /// Jump to register and link.
    Jalr,

    /// Load byte, sign-extended.
    Lb,
    /// Load half-word, sign-extended.
    Lh,
    /// Load word, sign-extended.
    Lw,
    /// Load byte, zero-extended.
    Lbu,
    /// Load half-word, zero-extended.
    Lhu,
    /// Load word, zero-extended.
    Lwu,
    /// Load doubleword.
    Ld,
    /// Load doubleword to FP register.
    Ldc1,

    /// Store byte.
    Sb,
    /// Store half-word.
    Sh,
    /// Store word.
    Sw,
    /// Store doubleword.
    Sd,
    /// Store doubleword from FP register.
    Sdc1,

    /// Double-precision FP add.
    AddD,
    /// Double-precision FP subtract.
    SubD,
    /// Double-precision FP multiply.
    MulD,
    /// Double-precision FP divide.
    DivD,

    /// System call. Code 0 terminates the program.
    Syscall,
    /// Breakpoint trap.
    Break,
    /// No operation.
    Nop,
}

impl Opcode {
    /// The instruction's broad category.
    pub fn category(self) -> OpCategory {
        use Opcode::*;
        match self {
            Dadd | Daddu | Dsub | Dsubu | And | Or | Xor | Slt | Sltu | Daddi | Daddiu | Andi
            | Ori | Xori | Lui => OpCategory::Alu,
            Lb | Lh | Lw | Lbu | Lhu | Lwu | Ld | Ldc1 => OpCategory::Load,
            Sb | Sh | Sw | Sd | Sdc1 => OpCategory::Store,
            Beq | Bne | Bgez | J | Jal | Jr | Jalr => OpCategory::Branch,
            AddD | SubD | MulD | DivD => OpCategory::Fp,
            Syscall | Break => OpCategory::System,
            Nop => OpCategory::Nop,
        }
    }

    /// Whether this opcode is resolved during the fetch stage.
    pub fn is_control_transfer(self) -> bool {
        self.category() == OpCategory::Branch
    }

    /// Memory access width, for loads and stores only.
    pub fn mem_width(self) -> Option<Width> {
        use Opcode::*;
        match self {
            Lb | Lbu | Sb => Some(Width::Byte),
            Lh | Lhu | Sh => Some(Width::Half),
            Lw | Lwu | Sw => Some(Width::Word),
            Ld | Ldc1 | Sd | Sdc1 => Some(Width::DoubleWord),
            _ => None,
        }
    }

    /// Whether a load of this opcode sign-extends the fetched value.
    pub fn load_sign_extends(self) -> bool {
        matches!(self, Opcode::Lb | Opcode::Lh | Opcode::Lw)
    }

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Dadd => "dadd",
            Daddu => "daddu",
            Dsub => "dsub",
            Dsubu => "dsubu",
            And => "and",
            Or => "or",
            Xor => "xor",
            Slt => "slt",
            Sltu => "sltu",
            Daddi => "daddi",
            Daddiu => "daddiu",
            Andi => "andi",
            Ori => "ori",
            Xori => "xori",
            Lui => "lui",
            Beq => "beq",
            Bne => "bne",
            Bgez => "bgez",
            J => "j",
            Jal => "jal",
            Jr => "jr",
            Jalr => "jalr",
            Lb => "lb",
            Lh => "lh",
            Lw => "lw",
            Lbu => "lbu",
            Lhu => "lhu",
            Lwu => "lwu",
            Ld => "ld",
            Ldc1 => "ldc1",
            Sb => "sb",
            Sh => "sh",
            Sw => "sw",
            Sd => "sd",
            Sdc1 => "sdc1",
            AddD => "add.d",
            SubD => "sub.d",
            MulD => "mul.d",
            DivD => "div.d",
            Syscall => "syscall",
            Break => "break",
            Nop => "nop",
        }
    }
}
