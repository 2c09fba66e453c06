//! Memory bus routing word and byte accesses to RAM, ROM and I/O.

use tracing::{event, Level};

use super::map::{
    decode_fetch, decode_memory_region, FetchSource, MemoryRegion, DISPLAY_START, IO_START,
    MEM_WORDS, ROM_START, ROM_WORDS,
};
use crate::api::{MachineConfig, MemoryWriteResult, FRAMEBUFFER_MAGIC};
use crate::damage::Damage;
use crate::fault::ConfigError;
use crate::peripherals::IoBlock;

const DISPLAY_WORD: usize = (DISPLAY_START / 4) as usize;

/// Owns RAM, ROM, the I/O block and the damage tracker.
#[derive(Debug)]
pub struct MemoryBus {
    ram: Box<[u32]>,
    rom: Box<[u32]>,
    io: IoBlock,
    damage: Damage,
    fb_width: u32,
    fb_height: u32,
}

impl MemoryBus {
    /// Builds a bus with zeroed RAM, the boot image in ROM and the framebuffer
    /// header (magic, pixel width, pixel height) at `DISPLAY_START`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid or the boot
    /// image is larger than the ROM.
    pub fn new(config: &MachineConfig, boot_image: &[u32]) -> Result<Self, ConfigError> {
        config.validate()?;
        if boot_image.len() > ROM_WORDS as usize {
            return Err(ConfigError::BootImageTooLarge {
                len: boot_image.len(),
            });
        }

        let mut rom = vec![0; ROM_WORDS as usize].into_boxed_slice();
        rom[..boot_image.len()].copy_from_slice(boot_image);

        let mut ram = vec![0; MEM_WORDS as usize].into_boxed_slice();
        ram[DISPLAY_WORD] = FRAMEBUFFER_MAGIC;
        ram[DISPLAY_WORD + 1] = config.framebuffer_width;
        ram[DISPLAY_WORD + 2] = config.framebuffer_height;

        let fb_width = config.framebuffer_words_per_row();
        Ok(Self {
            ram,
            rom,
            io: IoBlock::new(),
            damage: Damage::new(fb_width, config.framebuffer_height),
            fb_width,
            fb_height: config.framebuffer_height,
        })
    }

    /// Fetches the instruction at word index `pc`, or `None` outside RAM and ROM.
    #[must_use]
    pub fn fetch_instruction(&self, pc: u32) -> Option<u32> {
        match decode_fetch(pc)? {
            FetchSource::Ram(index) => Some(self.ram[index]),
            FetchSource::Rom(index) => Some(self.rom[index]),
        }
    }

    /// Loads the aligned word containing `addr`. I/O reads may have side effects.
    pub fn load_word(&mut self, addr: u32) -> u32 {
        let addr = addr & !3;
        match decode_memory_region(addr) {
            MemoryRegion::Ram => self.ram[(addr / 4) as usize],
            MemoryRegion::Rom => self.rom[((addr - ROM_START) / 4) as usize],
            MemoryRegion::Io => self.io.read(addr - IO_START),
            MemoryRegion::Unmapped => 0,
        }
    }

    /// Loads the byte at `addr`, zero-extended.
    pub fn load_byte(&mut self, addr: u32) -> u32 {
        let word = self.load_word(addr);
        (word >> ((addr & 3) * 8)) & 0xFF
    }

    /// Stores a word at the aligned address containing `addr`.
    pub fn store_word(&mut self, addr: u32, value: u32) -> MemoryWriteResult {
        let addr = addr & !3;
        match decode_memory_region(addr) {
            MemoryRegion::Ram => {
                self.write_ram_word(addr / 4, value);
                MemoryWriteResult::Applied
            }
            MemoryRegion::Io => {
                self.io.write(addr - IO_START, value);
                MemoryWriteResult::Applied
            }
            MemoryRegion::Rom => {
                event!(
                    Level::DEBUG,
                    addr = format_args!("{addr:#010x}"),
                    value = format_args!("{value:#010x}"),
                    "store to ROM ignored"
                );
                MemoryWriteResult::IgnoredRom
            }
            MemoryRegion::Unmapped => MemoryWriteResult::IgnoredUnmapped,
        }
    }

    /// Stores one byte. RAM bytes are merged into their word; I/O registers
    /// receive the byte zero-extended.
    pub fn store_byte(&mut self, addr: u32, value: u8) -> MemoryWriteResult {
        match decode_memory_region(addr) {
            MemoryRegion::Ram => {
                let index = addr / 4;
                let shift = (addr & 3) * 8;
                let word = self.ram[index as usize];
                let merged = (word & !(0xFF << shift)) | (u32::from(value) << shift);
                self.write_ram_word(index, merged);
                MemoryWriteResult::Applied
            }
            _ => self.store_word(addr, u32::from(value)),
        }
    }

    fn write_ram_word(&mut self, index: u32, value: u32) {
        self.ram[index as usize] = value;
        if index as usize >= DISPLAY_WORD {
            let w = index - DISPLAY_WORD as u32;
            self.damage.mark(w % self.fb_width, w / self.fb_width);
        }
    }

    /// Copies `words` into memory starting at byte address `addr`, through the
    /// normal store path (ROM stays untouched, display stores mark damage).
    pub fn write_words(&mut self, addr: u32, words: &[u32]) {
        let mut target = addr;
        for &word in words {
            let _ = self.store_word(target, word);
            target = target.wrapping_add(4);
        }
    }

    /// Main RAM contents.
    #[must_use]
    pub fn ram(&self) -> &[u32] {
        &self.ram
    }

    /// Boot ROM contents.
    #[must_use]
    pub fn rom(&self) -> &[u32] {
        &self.rom
    }

    /// Display words, row-major, `fb_width` words per scanline.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        let len = (self.fb_width * self.fb_height) as usize;
        &self.ram[DISPLAY_WORD..DISPLAY_WORD + len]
    }

    /// Framebuffer row length in words.
    #[must_use]
    pub const fn framebuffer_words_per_row(&self) -> u32 {
        self.fb_width
    }

    /// Damage tracker.
    #[must_use]
    pub const fn damage(&self) -> &Damage {
        &self.damage
    }

    /// Mutable damage tracker, for consumers that take the rectangle.
    pub const fn damage_mut(&mut self) -> &mut Damage {
        &mut self.damage
    }

    /// I/O register block.
    #[must_use]
    pub const fn io(&self) -> &IoBlock {
        &self.io
    }

    /// Mutable I/O register block, for host input and device attachment.
    pub const fn io_mut(&mut self) -> &mut IoBlock {
        &mut self.io
    }
}
