//! Memory-mapped peripherals.

/// I/O register block at the top of the address space.
pub mod io;

pub use io::{
    IoBlock, IO_CLIPBOARD_CONTROL, IO_CLIPBOARD_DATA, IO_KEYBOARD, IO_MOUSE, IO_SERIAL_DATA,
    IO_SERIAL_STATUS, IO_SPI_CONTROL, IO_SPI_DATA, IO_SWITCHES_LEDS, IO_TIMER,
    KEYBOARD_QUEUE_CAPACITY, SPI_IDLE_DATA, SPI_SLOTS,
};
