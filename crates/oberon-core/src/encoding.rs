use crate::state::Flags;

/// Format bit: clear for register instructions.
pub const P_BIT: u32 = 0x8000_0000;
/// Format bit: immediate operand (register format), branch (when `P` is set).
pub const Q_BIT: u32 = 0x4000_0000;
/// Modifier bit: opcode variant, store, or PC-relative branch.
pub const U_BIT: u32 = 0x2000_0000;
/// Modifier bit: ones-extended immediate, byte access, or branch-and-link.
pub const V_BIT: u32 = 0x1000_0000;
/// Branch condition inversion bit.
pub const INVERT_BIT: u32 = 0x0800_0000;

/// Instruction format selected by the two high bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionFormat {
    /// `P=0`: register/immediate ALU and FPU operations.
    Register,
    /// `P=1, Q=0`: load and store.
    Memory,
    /// `P=1, Q=1`: conditional branch.
    Branch,
}

impl InstructionFormat {
    /// Classifies an instruction word by its format bits.
    #[must_use]
    pub const fn of(word: u32) -> Self {
        if word & P_BIT == 0 {
            Self::Register
        } else if word & Q_BIT == 0 {
            Self::Memory
        } else {
            Self::Branch
        }
    }
}

/// Register-format operation selected by bits 16..19.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Mov = 0x0,
    Lsl = 0x1,
    Asr = 0x2,
    Ror = 0x3,
    And = 0x4,
    Ann = 0x5,
    Ior = 0x6,
    Xor = 0x7,
    Add = 0x8,
    Sub = 0x9,
    Mul = 0xA,
    Div = 0xB,
    Fad = 0xC,
    Fsb = 0xD,
    Fml = 0xE,
    Fdv = 0xF,
}

impl Opcode {
    /// Every opcode in encoding order.
    pub const ALL: [Self; 16] = [
        Self::Mov,
        Self::Lsl,
        Self::Asr,
        Self::Ror,
        Self::And,
        Self::Ann,
        Self::Ior,
        Self::Xor,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Fad,
        Self::Fsb,
        Self::Fml,
        Self::Fdv,
    ];

    /// Converts a 4-bit opcode value.
    #[must_use]
    pub const fn from_u4(op: u8) -> Option<Self> {
        if op < 16 {
            Some(Self::ALL[op as usize])
        } else {
            None
        }
    }

    /// Extracts the opcode from bits 16..19 of a register-format word.
    ///
    /// # Panics
    ///
    /// Never in practice: the field is masked to four bits and all sixteen
    /// values are assigned.
    #[must_use]
    pub const fn from_word(word: u32) -> Self {
        match Self::from_u4(((word >> 16) & 0xF) as u8) {
            Some(op) => op,
            None => unreachable!(),
        }
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Mov => "MOV",
            Self::Lsl => "LSL",
            Self::Asr => "ASR",
            Self::Ror => "ROR",
            Self::And => "AND",
            Self::Ann => "ANN",
            Self::Ior => "IOR",
            Self::Xor => "XOR",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Fad => "FAD",
            Self::Fsb => "FSB",
            Self::Fml => "FML",
            Self::Fdv => "FDV",
        }
    }
}

/// Branch condition selected by bits 24..26.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Condition {
    /// `N`.
    Negative = 0,
    /// `Z`.
    Zero = 1,
    /// `C`.
    Carry = 2,
    /// `V`.
    Overflow = 3,
    /// `C | Z`.
    CarryOrZero = 4,
    /// `N != V`.
    Less = 5,
    /// `(N != V) | Z`.
    LessOrEqual = 6,
    /// Always true.
    Always = 7,
}

impl Condition {
    /// Every condition in encoding order.
    pub const ALL: [Self; 8] = [
        Self::Negative,
        Self::Zero,
        Self::Carry,
        Self::Overflow,
        Self::CarryOrZero,
        Self::Less,
        Self::LessOrEqual,
        Self::Always,
    ];

    /// Selects a condition from the low three bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self::ALL[(bits & 0x7) as usize]
    }

    /// Evaluates the condition against the flags, before any inversion.
    #[must_use]
    pub const fn evaluate(self, flags: Flags) -> bool {
        match self {
            Self::Negative => flags.negative,
            Self::Zero => flags.zero,
            Self::Carry => flags.carry,
            Self::Overflow => flags.overflow,
            Self::CarryOrZero => flags.carry || flags.zero,
            Self::Less => flags.negative != flags.overflow,
            Self::LessOrEqual => (flags.negative != flags.overflow) || flags.zero,
            Self::Always => true,
        }
    }

    /// Branch mnemonic suffix, taking the inversion bit into account.
    #[must_use]
    pub const fn mnemonic(self, invert: bool) -> &'static str {
        match (self, invert) {
            (Self::Negative, false) => "MI",
            (Self::Zero, false) => "EQ",
            (Self::Carry, false) => "CS",
            (Self::Overflow, false) => "VS",
            (Self::CarryOrZero, false) => "LS",
            (Self::Less, false) => "LT",
            (Self::LessOrEqual, false) => "LE",
            (Self::Always, false) => "",
            (Self::Negative, true) => "PL",
            (Self::Zero, true) => "NE",
            (Self::Carry, true) => "CC",
            (Self::Overflow, true) => "VC",
            (Self::CarryOrZero, true) => "HI",
            (Self::Less, true) => "GE",
            (Self::LessOrEqual, true) => "GT",
            (Self::Always, true) => "NOP",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{Condition, InstructionFormat, Opcode};
    use crate::state::Flags;

    #[test]
    fn opcode_table_is_closed_and_ordered() {
        for (value, op) in (0_u8..).zip(Opcode::ALL) {
            assert_eq!(op as u8, value);
            assert_eq!(Opcode::from_u4(value), Some(op));
        }
        assert_eq!(Opcode::from_u4(16), None);
    }

    #[test]
    fn opcode_is_taken_from_bits_16_to_19() {
        assert_eq!(Opcode::from_word(0x0008_0000), Opcode::Add);
        assert_eq!(Opcode::from_word(0xFFFF_FFFF), Opcode::Fdv);
        assert_eq!(Opcode::from_word(0x0000_FFFF), Opcode::Mov);
    }

    #[test]
    fn mnemonics_are_unique() {
        let names: HashSet<_> = Opcode::ALL.iter().map(|op| op.mnemonic()).collect();
        assert_eq!(names.len(), Opcode::ALL.len());
    }

    #[test]
    fn format_follows_p_and_q_bits() {
        assert_eq!(InstructionFormat::of(0x0000_0000), InstructionFormat::Register);
        assert_eq!(InstructionFormat::of(0x4000_0000), InstructionFormat::Register);
        assert_eq!(InstructionFormat::of(0x8000_0000), InstructionFormat::Memory);
        assert_eq!(InstructionFormat::of(0xC000_0000), InstructionFormat::Branch);
    }

    #[test]
    fn signed_conditions_compare_negative_with_overflow() {
        let n_only = Flags {
            negative: true,
            ..Flags::default()
        };
        let n_and_v = Flags {
            negative: true,
            overflow: true,
            ..Flags::default()
        };
        assert!(Condition::Less.evaluate(n_only));
        assert!(!Condition::Less.evaluate(n_and_v));
        assert!(Condition::LessOrEqual.evaluate(Flags {
            zero: true,
            ..n_and_v
        }));
        assert!(Condition::Always.evaluate(Flags::default()));
    }

    #[test]
    fn inverted_always_is_nop() {
        assert_eq!(Condition::Always.mnemonic(true), "NOP");
        assert_eq!(Condition::Zero.mnemonic(true), "NE");
        assert_eq!(Condition::from_bits(0xF), Condition::Always);
    }
}
