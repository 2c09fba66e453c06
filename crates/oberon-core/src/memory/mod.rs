//! Memory model: fixed address map and the bus that routes accesses over it.

/// RAM/ROM/I/O routing and framebuffer damage marking.
pub mod bus;
/// Fixed memory-region map and address decoder.
pub mod map;

pub use bus::MemoryBus;
pub use map::{
    decode_fetch, decode_memory_region, FetchSource, MemoryRegion, DISPLAY_START, IO_START,
    MEM_SIZE, MEM_WORDS, RESET_PC, ROM_START, ROM_WORDS,
};
