//! Binary instruction encoding and decoding.
//!
//! Implements the standard MIPS64 32-bit instruction formats for the
//! supported roster. `decode` and `encode` are exact inverses over that
//! roster; the all-zero word is `nop`.

use crate::common::error::IllegalInstruction;
use crate::isa::{Instruction, Opcode};

const OP_SPECIAL: u32 = 0x00;
const OP_REGIMM: u32 = 0x01;
const OP_J: u32 = 0x02;
const OP_JAL: u32 = 0x03;
const OP_BEQ: u32 = 0x04;
const OP_BNE: u32 = 0x05;
const OP_ANDI: u32 = 0x0C;
const OP_ORI: u32 = 0x0D;
const OP_XORI: u32 = 0x0E;
const OP_LUI: u32 = 0x0F;
const OP_COP1: u32 = 0x11;
const OP_DADDI: u32 = 0x18;
const OP_DADDIU: u32 = 0x19;
const OP_LB: u32 = 0x20;
const OP_LH: u32 = 0x21;
const OP_LW: u32 = 0x23;
const OP_LBU: u32 = 0x24;
const OP_LHU: u32 = 0x25;
const OP_LWU: u32 = 0x27;
const OP_SB: u32 = 0x28;
const OP_SH: u32 = 0x29;
const OP_SW: u32 = 0x2B;
const OP_LDC1: u32 = 0x35;
const OP_LD: u32 = 0x37;
const OP_SDC1: u32 = 0x3D;
const OP_SD: u32 = 0x3F;

const FN_JR: u32 = 0x08;
const FN_JALR: u32 = 0x09;
const FN_SYSCALL: u32 = 0x0C;
const FN_BREAK: u32 = 0x0D;
const FN_AND: u32 = 0x24;
const FN_OR: u32 = 0x25;
const FN_XOR: u32 = 0x26;
const FN_SLT: u32 = 0x2A;
const FN_SLTU: u32 = 0x2B;
const FN_DADD: u32 = 0x2C;
const FN_DADDU: u32 = 0x2D;
const FN_DSUB: u32 = 0x2E;
const FN_DSUBU: u32 = 0x2F;

// COP1 fmt field for double precision, and the arithmetic functs.
const FMT_D: u32 = 0x11;
const FN_FP_ADD: u32 = 0x00;
const FN_FP_SUB: u32 = 0x01;
const FN_FP_MUL: u32 = 0x02;
const FN_FP_DIV: u32 = 0x03;

const RT_BGEZ: u32 = 0x01;

#[inline]
fn field(word: u32, offset: u32, width: u32) -> u32 {
    (word >> offset) & ((1 << width) - 1)
}

/// Decodes a 32-bit instruction word.
///
/// The all-zero word decodes to `nop`. Immediates land in the record
/// already extended per the opcode's convention.
///
/// # Errors
///
/// [`IllegalInstruction`] for any word outside the supported roster.
pub fn decode(word: u32) -> Result<Instruction, IllegalInstruction> {
    if word == 0 {
        return Ok(Instruction::nop());
    }

    let op = field(word, 26, 6);
    let rs = field(word, 21, 5) as u8;
    let rt = field(word, 16, 5) as u8;
    let rd = field(word, 11, 5) as u8;
    let sa = field(word, 6, 5) as u8;
    let funct = field(word, 0, 6);
    let simm = (word & 0xFFFF) as u16 as i16 as i32;
    let zimm = (word & 0xFFFF) as i32;

    let instr = match op {
        OP_SPECIAL => match funct {
            FN_JR => Instruction::i_type(Opcode::Jr, 0, rs, 0),
            FN_JALR => Instruction::r_type(Opcode::Jalr, rd, rs, 0),
            FN_SYSCALL => Instruction::i_type(Opcode::Syscall, 0, 0, field(word, 6, 20) as i32),
            FN_BREAK => Instruction::i_type(Opcode::Break, 0, 0, field(word, 6, 20) as i32),
            FN_AND => Instruction::r_type(Opcode::And, rd, rs, rt),
            FN_OR => Instruction::r_type(Opcode::Or, rd, rs, rt),
            FN_XOR => Instruction::r_type(Opcode::Xor, rd, rs, rt),
            FN_SLT => Instruction::r_type(Opcode::Slt, rd, rs, rt),
            FN_SLTU => Instruction::r_type(Opcode::Sltu, rd, rs, rt),
            FN_DADD => Instruction::r_type(Opcode::Dadd, rd, rs, rt),
            FN_DADDU => Instruction::r_type(Opcode::Daddu, rd, rs, rt),
            FN_DSUB => Instruction::r_type(Opcode::Dsub, rd, rs, rt),
            FN_DSUBU => Instruction::r_type(Opcode::Dsubu, rd, rs, rt),
            _ => return Err(IllegalInstruction(word)),
        },
        OP_REGIMM if u32::from(rt) == RT_BGEZ => Instruction::branch(Opcode::Bgez, rs, 0, simm),
        OP_J => Instruction::jump(Opcode::J, field(word, 0, 26) as i32),
        OP_JAL => Instruction::jump(Opcode::Jal, field(word, 0, 26) as i32),
        OP_BEQ => Instruction::branch(Opcode::Beq, rs, rt, simm),
        OP_BNE => Instruction::branch(Opcode::Bne, rs, rt, simm),
        OP_DADDI => Instruction::i_type(Opcode::Daddi, rt, rs, simm),
        OP_DADDIU => Instruction::i_type(Opcode::Daddiu, rt, rs, simm),
        OP_ANDI => Instruction::i_type(Opcode::Andi, rt, rs, zimm),
        OP_ORI => Instruction::i_type(Opcode::Ori, rt, rs, zimm),
        OP_XORI => Instruction::i_type(Opcode::Xori, rt, rs, zimm),
        OP_LUI => Instruction::i_type(Opcode::Lui, rt, 0, zimm),
        OP_COP1 if u32::from(rs) == FMT_D => {
            // COP1.D format: ft in the rt slot, fs in the rd slot, fd in
            // the shamt slot.
            let opcode = match funct {
                FN_FP_ADD => Opcode::AddD,
                FN_FP_SUB => Opcode::SubD,
                FN_FP_MUL => Opcode::MulD,
                FN_FP_DIV => Opcode::DivD,
                _ => return Err(IllegalInstruction(word)),
            };
            Instruction::fp_r(opcode, sa, rd, rt)
        }
        OP_LB => Instruction::i_type(Opcode::Lb, rt, rs, simm),
        OP_LH => Instruction::i_type(Opcode::Lh, rt, rs, simm),
        OP_LW => Instruction::i_type(Opcode::Lw, rt, rs, simm),
        OP_LBU => Instruction::i_type(Opcode::Lbu, rt, rs, simm),
        OP_LHU => Instruction::i_type(Opcode::Lhu, rt, rs, simm),
        OP_LWU => Instruction::i_type(Opcode::Lwu, rt, rs, simm),
        OP_LD => Instruction::i_type(Opcode::Ld, rt, rs, simm),
        OP_LDC1 => Instruction::i_type(Opcode::Ldc1, rt, rs, simm),
        OP_SB => Instruction::i_type(Opcode::Sb, rt, rs, simm),
        OP_SH => Instruction::i_type(Opcode::Sh, rt, rs, simm),
        OP_SW => Instruction::i_type(Opcode::Sw, rt, rs, simm),
        OP_SD => Instruction::i_type(Opcode::Sd, rt, rs, simm),
        OP_SDC1 => Instruction::i_type(Opcode::Sdc1, rt, rs, simm),
        _ => return Err(IllegalInstruction(word)),
    };
    Ok(instr)
}

/// Encodes an instruction back to its 32-bit word.
///
/// Inverse of [`decode`] over the supported roster.
pub fn encode(instr: &Instruction) -> u32 {
    use Opcode::*;

    let rs = u32::from(instr.rs);
    let rt = u32::from(instr.rt);
    let rd = u32::from(instr.rd);
    let imm16 = (instr.imm as u32) & 0xFFFF;

    let r_format = |funct: u32| (rs << 21) | (rt << 16) | (rd << 11) | funct;
    let i_format = |op: u32| (op << 26) | (rs << 21) | (rt << 16) | imm16;
    let fp_format = |funct: u32| {
        (OP_COP1 << 26) | (FMT_D << 21) | (rt << 16) | (rs << 11) | (rd << 6) | funct
    };

    match instr.opcode {
        Nop => 0,
        Dadd => r_format(FN_DADD),
        Daddu => r_format(FN_DADDU),
        Dsub => r_format(FN_DSUB),
        Dsubu => r_format(FN_DSUBU),
        And => r_format(FN_AND),
        Or => r_format(FN_OR),
        Xor => r_format(FN_XOR),
        Slt => r_format(FN_SLT),
        Sltu => r_format(FN_SLTU),
        Jr => (rs << 21) | FN_JR,
        Jalr => (rs << 21) | (rd << 11) | FN_JALR,
        Syscall => ((instr.imm as u32 & 0xFFFFF) << 6) | FN_SYSCALL,
        Break => ((instr.imm as u32 & 0xFFFFF) << 6) | FN_BREAK,
        Daddi => i_format(OP_DADDI),
        Daddiu => i_format(OP_DADDIU),
        Andi => i_format(OP_ANDI),
        Ori => i_format(OP_ORI),
        Xori => i_format(OP_XORI),
        // LUI has no rs operand; the field is always zero in the word.
        Lui => (OP_LUI << 26) | (rt << 16) | imm16,
        Beq => i_format(OP_BEQ),
        Bne => i_format(OP_BNE),
        Bgez => (OP_REGIMM << 26) | (rs << 21) | (RT_BGEZ << 16) | imm16,
        J => (OP_J << 26) | (instr.imm as u32 & 0x03FF_FFFF),
        Jal => (OP_JAL << 26) | (instr.imm as u32 & 0x03FF_FFFF),
        Lb => i_format(OP_LB),
        Lh => i_format(OP_LH),
        Lw => i_format(OP_LW),
        Lbu => i_format(OP_LBU),
        Lhu => i_format(OP_LHU),
        Lwu => i_format(OP_LWU),
        Ld => i_format(OP_LD),
        Ldc1 => i_format(OP_LDC1),
        Sb => i_format(OP_SB),
        Sh => i_format(OP_SH),
        Sw => i_format(OP_SW),
        Sd => i_format(OP_SD),
        Sdc1 => i_format(OP_SDC1),
        AddD => fp_format(FN_FP_ADD),
        SubD => fp_format(FN_FP_SUB),
        MulD => fp_format(FN_FP_MUL),
        DivD => fp_format(FN_FP_DIV),
    }
}
