//! Runtime diagnostics counters.

use crate::FaultCode;

/// Saturating counters of retired instructions and recoverable faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiagCounters {
    /// The last fault code that occurred, if any.
    pub last_fault_code: Option<FaultCode>,
    /// Word index of the instruction that faulted last.
    pub last_fault_pc: u32,
    /// Instructions fetched and executed.
    pub instructions_retired: u64,
    /// Fetches outside RAM and ROM that reset the core.
    pub invalid_fetch_count: u32,
    /// `DIV` instructions with a rejected divisor.
    pub division_fault_count: u32,
    /// Stores dropped because they targeted ROM.
    pub rom_write_count: u32,
}

impl DiagCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fault occurrence, updating the last fault info and its counter.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_fault(&mut self, code: FaultCode, pc: u32) {
        self.last_fault_code = Some(code);
        self.last_fault_pc = pc;
        let counter = self.counter_mut(code);
        *counter = counter.saturating_add(1);
    }

    /// Increments the retired instruction counter.
    #[allow(clippy::missing_const_for_fn)]
    pub fn increment_instruction_count(&mut self) {
        self.instructions_retired = self.instructions_retired.saturating_add(1);
    }

    /// Occurrences of one fault class.
    #[must_use]
    pub const fn count_of(&self, code: FaultCode) -> u32 {
        match code {
            FaultCode::InvalidFetch => self.invalid_fetch_count,
            FaultCode::NonPositiveDivisor => self.division_fault_count,
            FaultCode::RomWrite => self.rom_write_count,
        }
    }

    const fn counter_mut(&mut self, code: FaultCode) -> &mut u32 {
        match code {
            FaultCode::InvalidFetch => &mut self.invalid_fetch_count,
            FaultCode::NonPositiveDivisor => &mut self.division_fault_count,
            FaultCode::RomWrite => &mut self.rom_write_count,
        }
    }

    /// Total recoverable faults across all classes.
    #[must_use]
    pub fn fault_count(&self) -> u64 {
        FaultCode::ALL
            .iter()
            .map(|&code| u64::from(self.count_of(code)))
            .sum()
    }

    /// Resets all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
