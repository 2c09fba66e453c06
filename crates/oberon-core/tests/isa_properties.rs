//! Decoder, ALU and branch-condition properties.

#![allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]

use oberon_core::alu;
use oberon_core::{
    disassemble_one, BranchTarget, Condition, DecodedInstruction, Decoder, Flags,
    InstructionFormat, MemoryOp, Opcode,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const fn flags(negative: bool, zero: bool, carry: bool, overflow: bool) -> Flags {
    Flags {
        zero,
        negative,
        carry,
        overflow,
    }
}

#[rstest]
#[case(Condition::Negative, flags(true, false, false, false), flags(false, true, true, true))]
#[case(Condition::Zero, flags(false, true, false, false), flags(true, false, true, true))]
#[case(Condition::Carry, flags(false, false, true, false), flags(true, true, false, true))]
#[case(Condition::Overflow, flags(false, false, false, true), flags(true, true, true, false))]
#[case(Condition::CarryOrZero, flags(false, true, false, false), flags(true, false, false, true))]
#[case(Condition::Less, flags(true, false, false, false), flags(true, false, false, true))]
#[case(Condition::LessOrEqual, flags(false, true, false, true), flags(true, false, true, true))]
#[case(Condition::Always, flags(false, false, false, false), flags(true, true, true, true))]
fn condition_table(
    #[case] condition: Condition,
    #[case] holds: Flags,
    #[case] fails: Flags,
    #[values(false, true)] invert: bool,
) {
    if condition == Condition::Always {
        assert!(condition.evaluate(holds) && condition.evaluate(fails));
        return;
    }
    assert_eq!(condition.evaluate(holds) != invert, !invert);
    assert_eq!(condition.evaluate(fails) != invert, invert);
}

#[rstest]
#[case(Opcode::Mov, "MOV")]
#[case(Opcode::Lsl, "LSL")]
#[case(Opcode::Asr, "ASR")]
#[case(Opcode::Ror, "ROR")]
#[case(Opcode::And, "AND")]
#[case(Opcode::Ann, "ANN")]
#[case(Opcode::Ior, "IOR")]
#[case(Opcode::Xor, "XOR")]
#[case(Opcode::Add, "ADD")]
#[case(Opcode::Sub, "SUB")]
#[case(Opcode::Mul, "MUL")]
#[case(Opcode::Div, "DIV")]
#[case(Opcode::Fad, "FAD")]
#[case(Opcode::Fsb, "FSB")]
#[case(Opcode::Fml, "FML")]
#[case(Opcode::Fdv, "FDV")]
fn opcode_table(#[case] op: Opcode, #[case] mnemonic: &str) {
    let word = (op as u32) << 16;
    assert_eq!(Opcode::from_word(word), op);
    assert_eq!(op.mnemonic(), mnemonic);
    assert_eq!(disassemble_one(0, word).mnemonic, mnemonic);
}

#[rstest]
#[case(0x4128_0005, "ADD R1, R2, 5")]
#[case(0x0123_0004, "ROR R1, R2, R4")]
#[case(0x8120_0004, "LDR R1, R2, 4")]
#[case(0xA3EF_FFF8, "STR R3, R14, -8")]
#[case(0xF7FF_FFF0, "BL -16")]
#[case(0xC600_000F, "BLE R15")]
fn disassembly_text(#[case] word: u32, #[case] text: &str) {
    assert_eq!(Decoder::decode(word).to_string(), text);
}

proptest! {
    #[test]
    fn decode_is_total_and_format_consistent(word in any::<u32>()) {
        let decoded = Decoder::decode(word);
        let consistent = matches!(
            (InstructionFormat::of(word), decoded),
            (InstructionFormat::Register, DecodedInstruction::Register { .. })
                | (InstructionFormat::Memory, DecodedInstruction::Memory { .. })
                | (InstructionFormat::Branch, DecodedInstruction::Branch { .. })
        );
        prop_assert!(consistent);
    }

    #[test]
    fn canonical_encoding_decodes_identically(word in any::<u32>()) {
        let decoded = Decoder::decode(word);
        prop_assert_eq!(Decoder::decode(decoded.encode()), decoded);
    }

    #[test]
    fn memory_fields_follow_bit_positions(word in any::<u32>()) {
        let word = (word & 0x3FFF_FFFF) | 0x8000_0000;
        let DecodedInstruction::Memory { op, offset, .. } = Decoder::decode(word) else {
            unreachable!("P=1, Q=0 is memory format");
        };
        prop_assert_eq!(op.is_store(), word & 0x2000_0000 != 0);
        prop_assert_eq!(op.is_byte(), word & 0x1000_0000 != 0);
        prop_assert_eq!(op == MemoryOp::LoadWord, word & 0x3000_0000 == 0);
        prop_assert_eq!(offset as u32 & 0x000F_FFFF, word & 0x000F_FFFF);
        prop_assert!((-0x8_0000..0x8_0000).contains(&offset));
    }

    #[test]
    fn branch_offsets_sign_extend(offset in -0x80_0000_i32..0x80_0000) {
        let word = 0xE700_0000 | (offset as u32 & 0x00FF_FFFF);
        let DecodedInstruction::Branch { target, .. } = Decoder::decode(word) else {
            unreachable!("P=1, Q=1 is branch format");
        };
        prop_assert_eq!(target, BranchTarget::Relative(offset));
    }

    #[test]
    fn add_then_sub_restores_operand(b in any::<u32>(), c in any::<u32>()) {
        let sum = alu::add(b, c, false);
        prop_assert_eq!(alu::sub(sum.value, c, false).value, b);
        prop_assert_eq!(sum.carry, u64::from(b) + u64::from(c) > u64::from(u32::MAX));
        prop_assert_eq!(sum.overflow, (b as i32).checked_add(c as i32).is_none());
    }

    #[test]
    fn sub_flags_match_host_comparisons(b in any::<u32>(), c in any::<u32>()) {
        let diff = alu::sub(b, c, false);
        prop_assert_eq!(diff.value, b.wrapping_sub(c));
        prop_assert_eq!(diff.carry, b < c);
        prop_assert_eq!(diff.overflow, (b as i32).checked_sub(c as i32).is_none());
    }

    #[test]
    fn multiply_matches_wide_host_product(b in any::<u32>(), c in any::<u32>()) {
        let (lo, hi) = alu::mul(b, c, true);
        prop_assert_eq!((u64::from(hi) << 32) | u64::from(lo), u64::from(b) * u64::from(c));
        let (lo, hi) = alu::mul(b, c, false);
        let signed = i64::from(b as i32) * i64::from(c as i32);
        prop_assert_eq!(((u64::from(hi) << 32) | u64::from(lo)) as i64, signed);
    }

    #[test]
    fn signed_division_reconstructs_dividend(b in any::<i32>(), c in 1_i32..=i32::MAX) {
        let (q, r) = alu::div(b as u32, c as u32, false).expect("positive divisor");
        let (q, r) = (q as i32, r as i32);
        prop_assert!((0..c).contains(&r));
        prop_assert_eq!(i64::from(q) * i64::from(c) + i64::from(r), i64::from(b));
    }

    #[test]
    fn non_positive_signed_divisor_is_rejected(b in any::<u32>(), c in i32::MIN..=0) {
        prop_assert_eq!(alu::div(b, c as u32, false), None);
    }

    #[test]
    fn rotate_by_register_matches_host(b in any::<u32>(), c in any::<u32>()) {
        prop_assert_eq!(alu::ror(b, c), b.rotate_right(c % 32));
        prop_assert_eq!(alu::lsl(b, c), b << (c % 32));
    }
}
