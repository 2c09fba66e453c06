//! Memory-mapped I/O register block.
//!
//! Sixteen word registers at `IO_START`; the offsets below are bytes from
//! the block base. Internal registers live here, external devices are
//! reached through the trait objects attached by the host.

use std::collections::VecDeque;
use std::fmt;

use tracing::{event, Level};

use crate::api::{Clipboard, Serial, Spi};
use crate::fault::{ConfigError, InputError};

/// Millisecond timer (read) register offset.
pub const IO_TIMER: u32 = 0;
/// Switches (read) / LEDs (write) register offset.
pub const IO_SWITCHES_LEDS: u32 = 4;
/// Serial data register offset.
pub const IO_SERIAL_DATA: u32 = 8;
/// Serial status register offset.
pub const IO_SERIAL_STATUS: u32 = 12;
/// SPI data register offset.
pub const IO_SPI_DATA: u32 = 16;
/// SPI status (read) / control (write) register offset.
pub const IO_SPI_CONTROL: u32 = 20;
/// Mouse position, buttons and keyboard-ready register offset.
pub const IO_MOUSE: u32 = 24;
/// Keyboard scancode FIFO register offset.
pub const IO_KEYBOARD: u32 = 28;
/// Clipboard control register offset.
pub const IO_CLIPBOARD_CONTROL: u32 = 40;
/// Clipboard data register offset.
pub const IO_CLIPBOARD_DATA: u32 = 44;

/// Bytes the keyboard FIFO holds.
pub const KEYBOARD_QUEUE_CAPACITY: usize = 16;
/// Number of SPI line slots addressable by the control register.
pub const SPI_SLOTS: usize = 4;
/// Value read from the SPI data register when no device is selected.
pub const SPI_IDLE_DATA: u32 = 255;

const MOUSE_KEYBOARD_READY: u32 = 0x1000_0000;
const MOUSE_X_MASK: u32 = 0x0000_0FFF;
const MOUSE_Y_MASK: u32 = 0x00FF_F000;
const MOUSE_COORD_LIMIT: i32 = 4096;

/// Internal I/O registers plus attached device backends.
pub struct IoBlock {
    timer_ms: u32,
    switches: u32,
    leds: u32,
    mouse: u32,
    keyboard: VecDeque<u8>,
    spi_selected: usize,
    progress: u32,
    serial: Option<Box<dyn Serial>>,
    spi: [Option<Box<dyn Spi>>; SPI_SLOTS],
    clipboard: Option<Box<dyn Clipboard>>,
}

impl fmt::Debug for IoBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoBlock")
            .field("timer_ms", &self.timer_ms)
            .field("switches", &self.switches)
            .field("leds", &self.leds)
            .field("mouse", &format_args!("{:#010x}", self.mouse))
            .field("keyboard", &self.keyboard)
            .field("spi_selected", &self.spi_selected)
            .field("progress", &self.progress)
            .field("serial", &self.serial.is_some())
            .field(
                "spi",
                &self.spi.iter().map(Option::is_some).collect::<Vec<_>>(),
            )
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}

impl Default for IoBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBlock {
    /// Creates an I/O block with no devices attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timer_ms: 0,
            switches: 0,
            leds: 0,
            mouse: 0,
            keyboard: VecDeque::with_capacity(KEYBOARD_QUEUE_CAPACITY),
            spi_selected: 0,
            progress: 0,
            serial: None,
            spi: std::array::from_fn(|_| None),
            clipboard: None,
        }
    }

    /// Reads the register at byte `offset` from the block base.
    ///
    /// Timer reads, and mouse reads with an empty keyboard FIFO, count as
    /// stall signals and consume progress.
    pub fn read(&mut self, offset: u32) -> u32 {
        match offset {
            IO_TIMER => {
                self.stall();
                self.timer_ms
            }
            IO_SWITCHES_LEDS => self.switches,
            IO_SERIAL_DATA => self.serial.as_mut().map_or(0, |serial| serial.read_data()),
            IO_SERIAL_STATUS => self
                .serial
                .as_mut()
                .map_or(0, |serial| serial.read_status()),
            IO_SPI_DATA => self.spi[self.spi_selected]
                .as_mut()
                .map_or(SPI_IDLE_DATA, |spi| spi.read_data()),
            // receive always ready
            IO_SPI_CONTROL => 1,
            IO_MOUSE => {
                if self.keyboard.is_empty() {
                    self.stall();
                    self.mouse
                } else {
                    self.mouse | MOUSE_KEYBOARD_READY
                }
            }
            IO_KEYBOARD => self.keyboard.pop_front().map_or(0, u32::from),
            IO_CLIPBOARD_CONTROL => self
                .clipboard
                .as_mut()
                .map_or(0, |clipboard| clipboard.read_control()),
            IO_CLIPBOARD_DATA => self
                .clipboard
                .as_mut()
                .map_or(0, |clipboard| clipboard.read_data()),
            _ => 0,
        }
    }

    /// Writes `value` to the register at byte `offset` from the block base.
    pub fn write(&mut self, offset: u32, value: u32) {
        match offset {
            IO_SWITCHES_LEDS => {
                self.leds = value;
                event!(Level::INFO, leds = format_args!("{value:08b}"), "LEDs changed");
            }
            IO_SERIAL_DATA => {
                if let Some(serial) = self.serial.as_mut() {
                    serial.write_data(value);
                }
            }
            IO_SPI_DATA => {
                if let Some(spi) = self.spi[self.spi_selected].as_mut() {
                    spi.write_data(value);
                }
            }
            IO_SPI_CONTROL => {
                self.spi_selected = (value & 3) as usize;
                event!(Level::DEBUG, line = self.spi_selected, "SPI line selected");
            }
            IO_CLIPBOARD_CONTROL => {
                if let Some(clipboard) = self.clipboard.as_mut() {
                    clipboard.write_control(value);
                }
            }
            IO_CLIPBOARD_DATA => {
                if let Some(clipboard) = self.clipboard.as_mut() {
                    clipboard.write_data(value);
                }
            }
            _ => {}
        }
    }

    const fn stall(&mut self) {
        self.progress = self.progress.saturating_sub(1);
    }

    /// Remaining stall signals before `run` yields to the host.
    #[must_use]
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    /// Refills the stall budget.
    pub const fn set_progress(&mut self, budget: u32) {
        self.progress = budget;
    }

    /// Sets the millisecond timer value reported to the guest.
    pub const fn set_time(&mut self, ms: u32) {
        self.timer_ms = ms;
    }

    /// Sets the switch bits reported to the guest.
    pub const fn set_switches(&mut self, bits: u32) {
        self.switches = bits;
    }

    /// Last value the guest wrote to the LED register.
    #[must_use]
    pub const fn leds(&self) -> u32 {
        self.leds
    }

    /// Raw mouse register value.
    #[must_use]
    pub const fn mouse(&self) -> u32 {
        self.mouse
    }

    /// Selected SPI line (`0..4`).
    #[must_use]
    pub const fn spi_selected(&self) -> usize {
        self.spi_selected
    }

    /// Updates the mouse position; each coordinate is kept only when in `0..4096`.
    #[allow(clippy::cast_sign_loss)]
    pub const fn mouse_moved(&mut self, x: i32, y: i32) {
        if 0 <= x && x < MOUSE_COORD_LIMIT {
            self.mouse = (self.mouse & !MOUSE_X_MASK) | x as u32;
        }
        if 0 <= y && y < MOUSE_COORD_LIMIT {
            self.mouse = (self.mouse & !MOUSE_Y_MASK) | ((y as u32) << 12);
        }
    }

    /// Presses or releases mouse button 1, 2 or 3 (bits 26, 25, 24). Other buttons are ignored.
    pub const fn mouse_button(&mut self, button: u32, down: bool) {
        if !matches!(button, 1..=3) {
            return;
        }
        let bit = 1 << (27 - button);
        if down {
            self.mouse |= bit;
        } else {
            self.mouse &= !bit;
        }
    }

    /// Appends PS/2 scancodes to the keyboard FIFO, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::KeyboardQueueFull`] when the whole sequence does not fit.
    pub fn keyboard_input(&mut self, scancodes: &[u8]) -> Result<(), InputError> {
        let free = KEYBOARD_QUEUE_CAPACITY - self.keyboard.len();
        if scancodes.len() > free {
            return Err(InputError::KeyboardQueueFull {
                free,
                requested: scancodes.len(),
            });
        }
        self.keyboard.extend(scancodes.iter().copied());
        Ok(())
    }

    /// Scancodes waiting in the keyboard FIFO.
    #[must_use]
    pub fn pending_keys(&self) -> usize {
        self.keyboard.len()
    }

    /// Attaches the serial backend.
    pub fn set_serial(&mut self, serial: Box<dyn Serial>) {
        self.serial = Some(serial);
    }

    /// Attaches an SPI device to line 1 or 2.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSpiSlot`] for any other line.
    pub fn set_spi(&mut self, slot: usize, spi: Box<dyn Spi>) -> Result<(), ConfigError> {
        if !matches!(slot, 1 | 2) {
            return Err(ConfigError::InvalidSpiSlot(slot));
        }
        self.spi[slot] = Some(spi);
        Ok(())
    }

    /// Attaches the clipboard bridge.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = Some(clipboard);
    }
}
