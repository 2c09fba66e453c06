use thiserror::Error;

/// Recoverable runtime conditions recorded by diagnostics.
///
/// None of these stop the machine; they are reported through `tracing` and
/// counted in [`crate::DiagCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Program counter resolved outside RAM and ROM; the core reset itself.
    #[error("instruction fetch outside ram and rom")]
    InvalidFetch = 0x01,
    /// Signed `DIV` with a divisor that is zero or negative, or unsigned `DIV` by zero.
    #[error("division by a non-positive divisor")]
    NonPositiveDivisor = 0x02,
    /// Store targeted the read-only boot ROM and was dropped.
    #[error("store to read-only memory ignored")]
    RomWrite = 0x03,
}

impl FaultCode {
    /// All fault codes in stable code order.
    pub const ALL: [Self; 3] = [Self::InvalidFetch, Self::NonPositiveDivisor, Self::RomWrite];

    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether the fault rewinds the program counter to the ROM entry point.
    #[must_use]
    pub const fn resets_core(self) -> bool {
        matches!(self, Self::InvalidFetch)
    }
}

/// Host configuration rejected at construction or device attachment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Framebuffer width must be a non-zero multiple of 32 pixels.
    #[error("framebuffer width {0} is not a non-zero multiple of 32")]
    FramebufferWidth(u32),
    /// Framebuffer height must be non-zero.
    #[error("framebuffer height must be non-zero")]
    FramebufferHeight,
    /// Framebuffer does not fit in RAM above the display base.
    #[error("framebuffer of {width}x{height} pixels does not fit in ram")]
    FramebufferTooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// `run` would stop before executing anything.
    #[error("progress budget must be non-zero")]
    ZeroProgressBudget,
    /// Boot image holds more words than the ROM.
    #[error("boot image of {len} words exceeds rom capacity")]
    BootImageTooLarge {
        /// Length of the rejected image in words.
        len: usize,
    },
    /// SPI devices may only be attached to lines 1 and 2.
    #[error("spi slot {0} is not assignable")]
    InvalidSpiSlot(usize),
}

/// Host input that the machine could not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InputError {
    /// Keyboard FIFO lacks room for the whole scancode sequence.
    #[error("keyboard queue has room for {free} bytes, {requested} requested")]
    KeyboardQueueFull {
        /// Bytes still free in the queue.
        free: usize,
        /// Bytes the host tried to enqueue.
        requested: usize,
    },
}
