//! Fixed architectural memory map and address decoding helpers.

/// Size in bytes of main RAM.
pub const MEM_SIZE: u32 = 0x0018_0000;
/// Number of 32-bit words of main RAM.
pub const MEM_WORDS: u32 = MEM_SIZE / 4;
/// Byte address where the display region (framebuffer header and pixels) begins.
pub const DISPLAY_START: u32 = 0x000E_7F00;
/// Byte address of the first ROM word.
pub const ROM_START: u32 = 0xFFFF_F800;
/// Number of 32-bit words of boot ROM.
pub const ROM_WORDS: u32 = 512;
/// Byte address of the first memory-mapped I/O register.
pub const IO_START: u32 = 0xFFFF_FFC0;

/// Word index the program counter is set to on reset.
pub const RESET_PC: u32 = ROM_START / 4;

/// Region classification for data accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// Main RAM (`0x0000_0000..0x0018_0000`).
    Ram,
    /// Boot ROM below the I/O block (`0xFFFF_F800..0xFFFF_FFC0`).
    Rom,
    /// Memory-mapped I/O (`0xFFFF_FFC0..=0xFFFF_FFFF`).
    Io,
    /// Anything else; reads return zero and writes are dropped.
    Unmapped,
}

/// Location an instruction word is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchSource {
    /// Word index into RAM.
    Ram(usize),
    /// Word index into ROM.
    Rom(usize),
}

const _: () = assert_fixed_layout();

const fn assert_fixed_layout() {
    assert!(MEM_SIZE % 4 == 0, "ram must be word sized");
    assert!(
        DISPLAY_START < MEM_SIZE && DISPLAY_START % 4 == 0,
        "display region must be word aligned inside ram"
    );
    assert!(MEM_SIZE <= ROM_START, "ram and rom must not overlap");
    assert!(ROM_START < IO_START, "rom must start below the io block");
    assert!(
        ROM_START as u64 + ROM_WORDS as u64 * 4 == 1 << 32,
        "rom must extend to the top of the address space"
    );
}

/// Decodes a byte address into the region that serves data accesses.
///
/// The I/O block overlays the last sixteen ROM words, so it wins over ROM.
#[must_use]
pub const fn decode_memory_region(addr: u32) -> MemoryRegion {
    if addr < MEM_SIZE {
        MemoryRegion::Ram
    } else if addr >= IO_START {
        MemoryRegion::Io
    } else if addr >= ROM_START {
        MemoryRegion::Rom
    } else {
        MemoryRegion::Unmapped
    }
}

/// Resolves a program counter (word index) into an executable location.
///
/// Returns `None` when the word is neither in RAM nor in ROM.
#[must_use]
pub const fn decode_fetch(pc: u32) -> Option<FetchSource> {
    if pc < MEM_WORDS {
        Some(FetchSource::Ram(pc as usize))
    } else if pc >= RESET_PC && pc - RESET_PC < ROM_WORDS {
        Some(FetchSource::Rom((pc - RESET_PC) as usize))
    } else {
        None
    }
}
