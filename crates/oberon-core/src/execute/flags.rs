//! Carry/overflow updates layered on top of the register write path.

use crate::alu::AluResult;
use crate::state::Flags;

/// How `C` and `V` change after an instruction executes.
///
/// `Z` and `N` are never described here: every register write recomputes
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// `C` and `V` keep their values.
    #[default]
    None,
    /// `ADD`/`SUB` result flags.
    CarryOverflow {
        /// Carry or borrow out.
        carry: bool,
        /// Signed overflow.
        overflow: bool,
    },
}

impl FlagsUpdate {
    /// Carry and overflow taken from an adder result.
    #[must_use]
    pub const fn from_alu(result: AluResult) -> Self {
        Self::CarryOverflow {
            carry: result.carry,
            overflow: result.overflow,
        }
    }

    /// Applies the update to `flags`.
    pub const fn apply(self, flags: &mut Flags) {
        if let Self::CarryOverflow { carry, overflow } = self {
            flags.carry = carry;
            flags.overflow = overflow;
        }
    }
}
