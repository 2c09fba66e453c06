//! Instruction decoder for the RISC instruction set.
//!
//! Every 32-bit word decodes to exactly one instruction: register and
//! condition fields are four and three bits wide and all of their values are
//! assigned, so there is no illegal-encoding path.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use crate::encoding::{
    Condition, InstructionFormat, Opcode, INVERT_BIT, P_BIT, Q_BIT, U_BIT, V_BIT,
};
use crate::state::GeneralRegister;

/// Second source operand of a register-format instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Register `c` (bits 0..3).
    Register(GeneralRegister),
    /// Raw 16-bit immediate (bits 0..15); widened according to the `v` bit.
    Immediate(u16),
}

/// Load/store variant of a memory-format instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    /// `LDR`: 32-bit load.
    LoadWord,
    /// `LDB`: zero-extended byte load.
    LoadByte,
    /// `STR`: 32-bit store.
    StoreWord,
    /// `STB`: byte store.
    StoreByte,
}

impl MemoryOp {
    const fn from_bits(store: bool, byte: bool) -> Self {
        match (store, byte) {
            (false, false) => Self::LoadWord,
            (false, true) => Self::LoadByte,
            (true, false) => Self::StoreWord,
            (true, true) => Self::StoreByte,
        }
    }

    /// True for `STR` and `STB`.
    #[must_use]
    pub const fn is_store(self) -> bool {
        matches!(self, Self::StoreWord | Self::StoreByte)
    }

    /// True for `LDB` and `STB`.
    #[must_use]
    pub const fn is_byte(self) -> bool {
        matches!(self, Self::LoadByte | Self::StoreByte)
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::LoadWord => "LDR",
            Self::LoadByte => "LDB",
            Self::StoreWord => "STR",
            Self::StoreByte => "STB",
        }
    }
}

/// Where a taken branch goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchTarget {
    /// Byte address held in a register; the new PC is that address divided by four.
    Register(GeneralRegister),
    /// Signed word offset added to the already incremented PC.
    Relative(i32),
}

/// Decoded instruction with all fields extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedInstruction {
    /// Register format (`P=0`).
    Register {
        /// Operation.
        op: Opcode,
        /// Destination register.
        a: GeneralRegister,
        /// First source register.
        b: GeneralRegister,
        /// Second source.
        operand: Operand,
        /// Opcode modifier bit 29.
        u: bool,
        /// Modifier bit 28 (ones-extended immediate, flags read for `MOV`).
        v: bool,
    },
    /// Memory format (`P=1, Q=0`).
    Memory {
        /// Load or store, word or byte.
        op: MemoryOp,
        /// Data register.
        a: GeneralRegister,
        /// Base address register.
        b: GeneralRegister,
        /// Sign-extended 20-bit byte offset.
        offset: i32,
    },
    /// Branch format (`P=1, Q=1`).
    Branch {
        /// Condition before inversion.
        condition: Condition,
        /// Bit 27: branch when the condition is false.
        invert: bool,
        /// Bit 28: store the return address into `R15`.
        link: bool,
        /// Destination.
        target: BranchTarget,
    },
}

/// Sign-extends the low 20 bits of a memory-format word.
#[must_use]
pub const fn memory_offset(word: u32) -> i32 {
    ((word & 0x000F_FFFF) ^ 0x0008_0000) as i32 - 0x0008_0000
}

/// Sign-extends the low 24 bits of a branch-format word.
#[must_use]
pub const fn branch_offset(word: u32) -> i32 {
    ((word & 0x00FF_FFFF) ^ 0x0080_0000) as i32 - 0x0080_0000
}

impl DecodedInstruction {
    /// Re-encodes this decoded instruction into its canonical 32-bit word.
    ///
    /// Bits the decoder ignores are emitted as zero.
    #[must_use]
    pub const fn encode(self) -> u32 {
        match self {
            Self::Register {
                op,
                a,
                b,
                operand,
                u,
                v,
            } => {
                let mut word =
                    ((a as u32) << 24) | ((b as u32) << 20) | ((op as u32) << 16);
                if u {
                    word |= U_BIT;
                }
                if v {
                    word |= V_BIT;
                }
                match operand {
                    Operand::Register(c) => word | c as u32,
                    Operand::Immediate(imm) => word | Q_BIT | imm as u32,
                }
            }
            Self::Memory { op, a, b, offset } => {
                let mut word = P_BIT
                    | ((a as u32) << 24)
                    | ((b as u32) << 20)
                    | (offset as u32 & 0x000F_FFFF);
                if op.is_store() {
                    word |= U_BIT;
                }
                if op.is_byte() {
                    word |= V_BIT;
                }
                word
            }
            Self::Branch {
                condition,
                invert,
                link,
                target,
            } => {
                let mut word = P_BIT | Q_BIT | ((condition as u32) << 24);
                if invert {
                    word |= INVERT_BIT;
                }
                if link {
                    word |= V_BIT;
                }
                match target {
                    BranchTarget::Register(c) => word | c as u32,
                    BranchTarget::Relative(off) => word | U_BIT | (off as u32 & 0x00FF_FFFF),
                }
            }
        }
    }
}

/// Instruction decoder for the RISC instruction set.
pub struct Decoder;

impl Decoder {
    /// Decodes a 32-bit instruction word. Total over all inputs.
    #[must_use]
    pub const fn decode(word: u32) -> DecodedInstruction {
        let a = GeneralRegister::from_bits(word >> 24);
        let b = GeneralRegister::from_bits(word >> 20);
        let u = word & U_BIT != 0;
        let v = word & V_BIT != 0;

        match InstructionFormat::of(word) {
            InstructionFormat::Register => {
                let operand = if word & Q_BIT == 0 {
                    Operand::Register(GeneralRegister::from_bits(word))
                } else {
                    Operand::Immediate((word & 0xFFFF) as u16)
                };
                DecodedInstruction::Register {
                    op: Opcode::from_word(word),
                    a,
                    b,
                    operand,
                    u,
                    v,
                }
            }
            InstructionFormat::Memory => DecodedInstruction::Memory {
                op: MemoryOp::from_bits(u, v),
                a,
                b,
                offset: memory_offset(word),
            },
            InstructionFormat::Branch => DecodedInstruction::Branch {
                condition: Condition::from_bits(word >> 24),
                invert: word & INVERT_BIT != 0,
                link: v,
                target: if u {
                    BranchTarget::Relative(branch_offset(word))
                } else {
                    BranchTarget::Register(GeneralRegister::from_bits(word))
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_register_immediate_add() {
        // ADD R1, R2, 5
        let decoded = Decoder::decode(0x4128_0005);
        assert_eq!(
            decoded,
            DecodedInstruction::Register {
                op: Opcode::Add,
                a: GeneralRegister::R1,
                b: GeneralRegister::R2,
                operand: Operand::Immediate(5),
                u: false,
                v: false,
            }
        );
    }

    #[test]
    fn decode_register_register_ignores_unused_c_bits() {
        let decoded = Decoder::decode(0x0123_FFF4);
        assert_eq!(
            decoded,
            DecodedInstruction::Register {
                op: Opcode::Ror,
                a: GeneralRegister::R1,
                b: GeneralRegister::R2,
                operand: Operand::Register(GeneralRegister::R4),
                u: false,
                v: false,
            }
        );
    }

    #[test]
    fn decode_memory_variants_follow_u_and_v_bits() {
        let cases = [
            (0x8000_0000, MemoryOp::LoadWord),
            (0x9000_0000, MemoryOp::LoadByte),
            (0xA000_0000, MemoryOp::StoreWord),
            (0xB000_0000, MemoryOp::StoreByte),
        ];
        for (word, expected) in cases {
            let DecodedInstruction::Memory { op, .. } = Decoder::decode(word) else {
                panic!("{word:#010x} should decode as memory format");
            };
            assert_eq!(op, expected);
        }
    }

    #[test]
    fn memory_offset_sign_extends_20_bits() {
        assert_eq!(memory_offset(0x0007_FFFF), 0x7_FFFF);
        assert_eq!(memory_offset(0x0008_0000), -0x8_0000);
        assert_eq!(memory_offset(0x000F_FFFC), -4);
        assert_eq!(memory_offset(0xFFF0_0010), 16);
    }

    #[test]
    fn branch_offset_sign_extends_24_bits() {
        assert_eq!(branch_offset(0x00FF_FFFF), -1);
        assert_eq!(branch_offset(0x007F_FFFF), 0x7F_FFFF);
        assert_eq!(branch_offset(0x0080_0000), -0x80_0000);
    }

    #[test]
    fn decode_branch_fields() {
        // BL -1 (relative, link, always)
        let decoded = Decoder::decode(0xF7FF_FFFF);
        assert_eq!(
            decoded,
            DecodedInstruction::Branch {
                condition: Condition::Always,
                invert: false,
                link: true,
                target: BranchTarget::Relative(-1),
            }
        );

        // BNE R3 (register target)
        let decoded = Decoder::decode(0xC900_0003);
        assert_eq!(
            decoded,
            DecodedInstruction::Branch {
                condition: Condition::Zero,
                invert: true,
                link: false,
                target: BranchTarget::Register(GeneralRegister::R3),
            }
        );
    }

    #[test]
    fn canonical_words_reencode_to_themselves() {
        for word in [
            0x4128_0005_u32,
            0x5008_FFFF,
            0x2000_0000,
            0x000A_0003,
            0x8120_FFFC,
            0xB3E0_0001,
            0xE7FF_FFFF,
            0xCF00_000F,
            0xDC00_0002,
        ] {
            assert_eq!(Decoder::decode(word).encode(), word, "{word:#010x}");
        }
    }
}
