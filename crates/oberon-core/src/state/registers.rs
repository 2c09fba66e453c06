/// Number of architecturally visible general-purpose registers (`R0..R15`).
pub const GENERAL_REGISTER_COUNT: usize = 16;
/// Register written by branch-and-link.
pub const LINK_REGISTER: GeneralRegister = GeneralRegister::R15;
/// Constant low bits of the packed flags word read by `MOV` with `u=1, q=0, v=1`.
pub const FLAGS_WORD_TAG: u32 = 0xD0;

/// Architecturally visible general-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl GeneralRegister {
    /// Ordered list of all architectural general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
        Self::R15,
    ];

    /// Returns the array index for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Selects a register from the low four bits of an instruction field.
    ///
    /// Higher bits are ignored, so every input maps to a register.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self::ALL[(bits & 0xF) as usize]
    }
}

/// Condition flags updated by register writes and `ADD`/`SUB`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct Flags {
    /// Last written register value was zero.
    pub zero: bool,
    /// Last written register value had bit 31 set.
    pub negative: bool,
    /// Carry out of `ADD`, borrow out of `SUB`.
    pub carry: bool,
    /// Signed overflow of `ADD`/`SUB`.
    pub overflow: bool,
}

impl Flags {
    /// Packs the flags as `N<<31 | Z<<30 | C<<29 | V<<28 | 0xD0`.
    #[must_use]
    pub const fn packed(self) -> u32 {
        ((self.negative as u32) << 31)
            | ((self.zero as u32) << 30)
            | ((self.carry as u32) << 29)
            | ((self.overflow as u32) << 28)
            | FLAGS_WORD_TAG
    }
}

/// Full architectural register state of the RISC core.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: [u32; GENERAL_REGISTER_COUNT],
    pc: u32,
    aux: u32,
    flags: Flags,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self {
            gpr: [0; GENERAL_REGISTER_COUNT],
            pc: 0,
            aux: 0,
            flags: Flags::default(),
        }
    }
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: GeneralRegister) -> u32 {
        self.gpr[reg.index()]
    }

    /// Stores a register value without touching flags.
    ///
    /// Instruction execution goes through [`Self::write_register`] instead.
    pub const fn set_gpr(&mut self, reg: GeneralRegister, value: u32) {
        self.gpr[reg.index()] = value;
    }

    /// Architectural register write: stores `value` and recomputes `Z` and `N`.
    pub const fn write_register(&mut self, reg: GeneralRegister, value: u32) {
        self.gpr[reg.index()] = value;
        self.flags.zero = value == 0;
        self.flags.negative = value & 0x8000_0000 != 0;
    }

    /// Returns a copy of the whole register file.
    #[must_use]
    pub const fn registers(&self) -> [u32; GENERAL_REGISTER_COUNT] {
        self.gpr
    }

    /// Reads the program counter (word index).
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Writes the program counter (word index).
    pub const fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }

    /// Reads the auxiliary `H` register (product high word or remainder).
    #[must_use]
    pub const fn aux(&self) -> u32 {
        self.aux
    }

    /// Writes the auxiliary `H` register; flags are unaffected.
    pub const fn set_aux(&mut self, value: u32) {
        self.aux = value;
    }

    /// Reads the condition flags.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Mutable access to the condition flags.
    pub const fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    /// Replaces the condition flags.
    pub const fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchitecturalState, Flags, GeneralRegister, GENERAL_REGISTER_COUNT};

    #[test]
    fn register_count_and_decode_match_architecture() {
        assert_eq!(GENERAL_REGISTER_COUNT, 16);

        for bits in 0_u32..16 {
            let reg = GeneralRegister::from_bits(bits);
            assert_eq!(reg.index(), bits as usize);
        }

        assert_eq!(GeneralRegister::from_bits(0x13), GeneralRegister::R3);
        assert_eq!(GeneralRegister::from_bits(u32::MAX), GeneralRegister::R15);
    }

    #[test]
    fn general_register_file_tracks_each_register_independently() {
        let mut state = ArchitecturalState::default();

        for (offset, reg) in (0_u32..).zip(GeneralRegister::ALL) {
            state.set_gpr(reg, 0x1000_0000 + offset);
        }

        for (offset, reg) in (0_u32..).zip(GeneralRegister::ALL) {
            assert_eq!(state.gpr(reg), 0x1000_0000 + offset);
        }
        assert_eq!(state.registers()[15], 0x1000_000F);
    }

    #[test]
    fn register_write_path_updates_zero_and_negative_only() {
        let mut state = ArchitecturalState::default();
        state.flags_mut().carry = true;
        state.flags_mut().overflow = true;

        state.write_register(GeneralRegister::R1, 0);
        assert!(state.flags().zero);
        assert!(!state.flags().negative);

        state.write_register(GeneralRegister::R1, 0x8000_0001);
        assert!(!state.flags().zero);
        assert!(state.flags().negative);

        state.write_register(GeneralRegister::R1, 5);
        assert!(!state.flags().zero);
        assert!(!state.flags().negative);
        assert!(state.flags().carry);
        assert!(state.flags().overflow);
    }

    #[test]
    fn raw_and_aux_writes_leave_flags_alone() {
        let mut state = ArchitecturalState::default();
        state.set_gpr(GeneralRegister::R2, 0);
        state.set_aux(0xFFFF_FFFF);

        assert_eq!(state.flags(), Flags::default());
        assert_eq!(state.aux(), 0xFFFF_FFFF);
    }

    #[test]
    fn packed_flags_follow_nzcv_layout() {
        assert_eq!(Flags::default().packed(), 0xD0);
        let all = Flags {
            zero: true,
            negative: true,
            carry: true,
            overflow: true,
        };
        assert_eq!(all.packed(), 0xF000_00D0);
        let negative_carry = Flags {
            negative: true,
            carry: true,
            ..Flags::default()
        };
        assert_eq!(negative_carry.packed(), 0xA000_00D0);
    }
}
