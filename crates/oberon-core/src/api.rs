//! Public host-facing API contracts for embedding the emulator core.

use crate::fault::ConfigError;
use crate::memory::{DISPLAY_START, MEM_SIZE};
use crate::FaultCode;

/// Default framebuffer width in pixels.
pub const DEFAULT_FRAMEBUFFER_WIDTH: u32 = 1024;
/// Default framebuffer height in pixels.
pub const DEFAULT_FRAMEBUFFER_HEIGHT: u32 = 768;
/// Default number of stall signals tolerated per `run` call.
pub const DEFAULT_PROGRESS_BUDGET: u32 = 20;
/// First word of the framebuffer header (`"fziS"` as little-endian bytes).
pub const FRAMEBUFFER_MAGIC: u32 = 0x5369_7A66;

/// Top-level immutable configuration for a machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Framebuffer width in pixels; a non-zero multiple of 32.
    pub framebuffer_width: u32,
    /// Framebuffer height in scanlines.
    pub framebuffer_height: u32,
    /// Stall signals allowed before `run` returns early.
    pub progress_budget: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            framebuffer_width: DEFAULT_FRAMEBUFFER_WIDTH,
            framebuffer_height: DEFAULT_FRAMEBUFFER_HEIGHT,
            progress_budget: DEFAULT_PROGRESS_BUDGET,
        }
    }
}

impl MachineConfig {
    /// Framebuffer row length in 32-bit words.
    #[must_use]
    pub const fn framebuffer_words_per_row(&self) -> u32 {
        self.framebuffer_width / 32
    }

    /// Checks that the framebuffer fits the display region and the budget is usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] that applies.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        let width = self.framebuffer_width;
        let height = self.framebuffer_height;
        if width == 0 || width % 32 != 0 {
            return Err(ConfigError::FramebufferWidth(width));
        }
        if height == 0 {
            return Err(ConfigError::FramebufferHeight);
        }
        let bytes = (width / 32) as u64 * height as u64 * 4;
        if DISPLAY_START as u64 + bytes > MEM_SIZE as u64 {
            return Err(ConfigError::FramebufferTooLarge { width, height });
        }
        if self.progress_budget == 0 {
            return Err(ConfigError::ZeroProgressBudget);
        }
        Ok(())
    }
}

/// Serial line backend (e.g. a host pipe or PTY).
pub trait Serial {
    /// Status word; bit 0 means receive data available, bit 1 transmit ready.
    fn read_status(&mut self) -> u32;
    /// Receives one data word.
    fn read_data(&mut self) -> u32;
    /// Transmits one data word.
    fn write_data(&mut self, value: u32);
}

/// SPI peripheral attached to one of the selectable lines (SD card, network).
pub trait Spi {
    /// Reads the byte or word shifted in by the last transfer.
    fn read_data(&mut self) -> u32;
    /// Shifts a value out to the device.
    fn write_data(&mut self, value: u32);
}

/// Host clipboard bridge.
pub trait Clipboard {
    /// Starts a transfer; the value carries direction and length.
    fn write_control(&mut self, value: u32);
    /// Reports the pending transfer length.
    fn read_control(&mut self) -> u32;
    /// Sends one character to the host clipboard.
    fn write_data(&mut self, value: u32);
    /// Receives one character from the host clipboard.
    fn read_data(&mut self) -> u32;
}

/// Result of a data store on the memory bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryWriteResult {
    /// Store reached RAM or an I/O register.
    Applied,
    /// Store targeted ROM and was dropped.
    IgnoredRom,
    /// Store targeted an address with nothing behind it and was dropped.
    IgnoredUnmapped,
}

/// Output status from one instruction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction executed normally.
    Retired,
    /// Instruction executed but hit a recoverable fault (bad divisor, ROM store).
    RetiredWithFault {
        /// Fault that was recorded.
        cause: FaultCode,
    },
    /// Program counter pointed outside RAM and ROM; the core reset itself.
    InvalidFetch {
        /// Word index that could not be fetched.
        pc: u32,
    },
}

/// Aggregated outcome of a `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of steps executed.
    pub steps: u32,
    /// True when the progress budget ran out before the cycle budget.
    pub stalled: bool,
}

#[cfg(test)]
mod tests {
    use super::{MachineConfig, DEFAULT_PROGRESS_BUDGET};
    use crate::fault::ConfigError;

    #[test]
    fn default_config_is_valid() {
        let config = MachineConfig::default();
        assert_eq!(config.framebuffer_width, 1024);
        assert_eq!(config.framebuffer_height, 768);
        assert_eq!(config.progress_budget, DEFAULT_PROGRESS_BUDGET);
        assert_eq!(config.framebuffer_words_per_row(), 32);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn width_must_be_a_non_zero_multiple_of_32() {
        for width in [0, 33, 1000] {
            let config = MachineConfig {
                framebuffer_width: width,
                ..MachineConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::FramebufferWidth(width)));
        }
    }

    #[test]
    fn framebuffer_must_fit_in_ram() {
        let config = MachineConfig {
            framebuffer_width: 4096,
            framebuffer_height: 2048,
            ..MachineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::FramebufferTooLarge {
                width: 4096,
                height: 2048
            })
        );

        let flat = MachineConfig {
            framebuffer_height: 0,
            ..MachineConfig::default()
        };
        assert_eq!(flat.validate(), Err(ConfigError::FramebufferHeight));
    }

    #[test]
    fn zero_progress_budget_is_rejected() {
        let config = MachineConfig {
            progress_budget: 0,
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroProgressBudget));
    }
}
