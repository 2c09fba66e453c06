//! Instruction disassembly in the assembler's notation.
//!
//! A trailing `'` marks the `u` variant of an opcode (`ADD'` adds the carry,
//! `MUL'`/`DIV'` are unsigned, `FAD'` converts an integer). A trailing `"`
//! on `FAD`/`FSB` marks the `v` variant that truncates to an integer.

use std::fmt;

use crate::decoder::{BranchTarget, DecodedInstruction, Decoder, Operand};
use crate::encoding::{Condition, Opcode};
use crate::state::GeneralRegister;

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Byte address of the instruction.
    pub addr: u32,
    /// Raw instruction word.
    pub raw: u32,
    /// Mnemonic, e.g. `ADD`, `LDR`, `BNE`.
    pub mnemonic: String,
    /// Formatted operands, e.g. `R1, R2, 4`.
    pub operands: String,
}

struct Reg(GeneralRegister);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0.index())
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn immediate_value(imm: u16, v: bool) -> i32 {
    if v {
        (0xFFFF_0000 | imm as u32) as i32
    } else {
        imm as i32
    }
}

fn format_operand(operand: Operand, v: bool) -> String {
    match operand {
        Operand::Register(c) => Reg(c).to_string(),
        Operand::Immediate(imm) => immediate_value(imm, v).to_string(),
    }
}

fn register_parts(
    op: Opcode,
    a: GeneralRegister,
    b: GeneralRegister,
    operand: Operand,
    u: bool,
    v: bool,
) -> (String, String) {
    if op == Opcode::Mov {
        return match (u, operand) {
            (false, _) => (
                "MOV".to_owned(),
                format!("{}, {}", Reg(a), format_operand(operand, v)),
            ),
            (true, Operand::Immediate(imm)) => {
                ("MOV'".to_owned(), format!("{}, {imm:#06X}", Reg(a)))
            }
            (true, Operand::Register(_)) if v => ("MOV".to_owned(), format!("{}, FLAGS", Reg(a))),
            (true, Operand::Register(_)) => ("MOV".to_owned(), format!("{}, H", Reg(a))),
        };
    }

    let mut mnemonic = op.mnemonic().to_owned();
    if u {
        mnemonic.push('\'');
    }
    if v && matches!(op, Opcode::Fad | Opcode::Fsb) {
        mnemonic.push('"');
    }
    (
        mnemonic,
        format!("{}, {}, {}", Reg(a), Reg(b), format_operand(operand, v)),
    )
}

fn branch_mnemonic(condition: Condition, invert: bool, link: bool) -> String {
    if condition == Condition::Always && invert {
        return "NOP".to_owned();
    }
    let link = if link { "L" } else { "" };
    format!("B{link}{}", condition.mnemonic(invert))
}

/// Splits a decoded instruction into mnemonic and operand text.
#[must_use]
pub fn instruction_parts(instruction: &DecodedInstruction) -> (String, String) {
    match *instruction {
        DecodedInstruction::Register {
            op,
            a,
            b,
            operand,
            u,
            v,
        } => register_parts(op, a, b, operand, u, v),
        DecodedInstruction::Memory { op, a, b, offset } => (
            op.mnemonic().to_owned(),
            format!("{}, {}, {offset}", Reg(a), Reg(b)),
        ),
        DecodedInstruction::Branch {
            condition,
            invert,
            link,
            target,
        } => {
            let mnemonic = branch_mnemonic(condition, invert, link);
            if mnemonic == "NOP" {
                return (mnemonic, String::new());
            }
            let operands = match target {
                BranchTarget::Register(c) => Reg(c).to_string(),
                BranchTarget::Relative(offset) => offset.to_string(),
            };
            (mnemonic, operands)
        }
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mnemonic, operands) = instruction_parts(self);
        if operands.is_empty() {
            f.write_str(&mnemonic)
        } else {
            write!(f, "{mnemonic} {operands}")
        }
    }
}

/// Disassembles one instruction word located at word index `pc`.
#[must_use]
pub fn disassemble_one(pc: u32, word: u32) -> DisassemblyRow {
    let (mnemonic, operands) = instruction_parts(&Decoder::decode(word));
    DisassemblyRow {
        addr: pc.wrapping_mul(4),
        raw: word,
        mnemonic,
        operands,
    }
}

/// Disassembles `before` instructions before `center_pc`, the center, and
/// `after` instructions following it.
///
/// `fetch` resolves a word index to its instruction word; rows it cannot
/// resolve are omitted.
#[must_use]
pub fn disassemble_window(
    center_pc: u32,
    before: u32,
    after: u32,
    fetch: impl Fn(u32) -> Option<u32>,
) -> Vec<DisassemblyRow> {
    let first = center_pc.saturating_sub(before);
    let last = center_pc.saturating_add(after);
    (first..=last)
        .filter_map(|pc| fetch(pc).map(|word| disassemble_one(pc, word)))
        .collect()
}
