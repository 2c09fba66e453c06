//! Operand, address and branch-target computation.

use crate::decoder::{BranchTarget, Operand};
use crate::state::{ArchitecturalState, GeneralRegister, LINK_REGISTER};

/// Widens a raw 16-bit immediate: ones-filled high half when `v` is set.
#[must_use]
pub const fn widen_immediate(imm: u16, v: bool) -> u32 {
    if v {
        0xFFFF_0000 | imm as u32
    } else {
        imm as u32
    }
}

/// Value of the second source operand.
#[must_use]
pub const fn operand_value(operand: Operand, v: bool, arch: &ArchitecturalState) -> u32 {
    match operand {
        Operand::Register(c) => arch.gpr(c),
        Operand::Immediate(imm) => widen_immediate(imm, v),
    }
}

/// `R[b] + offset`, wrapping.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn effective_address(base: GeneralRegister, offset: i32, arch: &ArchitecturalState) -> u32 {
    arch.gpr(base).wrapping_add(offset as u32)
}

/// New PC of a taken branch.
///
/// `link` is the return address about to be written to `R15`; a register
/// target naming `R15` observes it, since the link write happens first.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn branch_target(target: BranchTarget, link: Option<u32>, arch: &ArchitecturalState) -> u32 {
    match target {
        BranchTarget::Relative(offset) => arch.pc().wrapping_add(offset as u32),
        BranchTarget::Register(c) => {
            let addr = match link {
                Some(value) if c.index() == LINK_REGISTER.index() => value,
                _ => arch.gpr(c),
            };
            addr / 4
        }
    }
}
