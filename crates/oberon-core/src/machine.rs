//! The machine aggregate the host drives.

use crate::api::{Clipboard, MachineConfig, RunOutcome, Serial, Spi, StepOutcome};
use crate::damage::DamageRect;
use crate::diag::DiagCounters;
use crate::disasm::{disassemble_window, DisassemblyRow};
use crate::execute;
use crate::fault::{ConfigError, InputError};
use crate::memory::{MemoryBus, RESET_PC};
use crate::state::ArchitecturalState;

/// Registers, memory, I/O devices and diagnostics of one RISC machine.
#[derive(Debug)]
pub struct Machine {
    config: MachineConfig,
    arch: ArchitecturalState,
    bus: MemoryBus,
    diag: DiagCounters,
}

impl Machine {
    /// Builds a machine: ROM loaded from `boot_image`, RAM zeroed apart from
    /// the framebuffer header, registers zeroed, PC at the ROM entry point.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` is invalid or the boot image does
    /// not fit in ROM.
    pub fn new(config: MachineConfig, boot_image: &[u32]) -> Result<Self, ConfigError> {
        let bus = MemoryBus::new(&config, boot_image)?;
        let mut arch = ArchitecturalState::default();
        arch.set_pc(RESET_PC);
        Ok(Self {
            config,
            arch,
            bus,
            diag: DiagCounters::new(),
        })
    }

    /// Rewinds the PC to the ROM entry point. Nothing else changes.
    pub const fn reset(&mut self) {
        self.arch.set_pc(RESET_PC);
    }

    /// Executes one instruction.
    pub fn step(&mut self) -> StepOutcome {
        execute::step_one(&mut self.arch, &mut self.bus, &mut self.diag)
    }

    /// Executes up to `cycles` instructions, stopping early when the guest
    /// exhausts the progress budget by polling the timer or mouse.
    pub fn run(&mut self, cycles: u32) -> RunOutcome {
        execute::run(
            &mut self.arch,
            &mut self.bus,
            &mut self.diag,
            self.config.progress_budget,
            cycles,
        )
    }

    /// Configuration the machine was built with.
    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Architectural register state.
    #[must_use]
    pub const fn arch(&self) -> &ArchitecturalState {
        &self.arch
    }

    /// Mutable architectural register state, for debuggers and tests.
    pub const fn arch_mut(&mut self) -> &mut ArchitecturalState {
        &mut self.arch
    }

    /// Memory bus.
    #[must_use]
    pub const fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    /// Mutable memory bus.
    pub const fn bus_mut(&mut self) -> &mut MemoryBus {
        &mut self.bus
    }

    /// Diagnostic counters.
    #[must_use]
    pub const fn diagnostics(&self) -> &DiagCounters {
        &self.diag
    }

    /// Clears the diagnostic counters.
    pub fn reset_diagnostics(&mut self) {
        self.diag.reset();
    }

    /// Attaches the serial line backend.
    pub fn set_serial(&mut self, serial: Box<dyn Serial>) {
        self.bus.io_mut().set_serial(serial);
    }

    /// Attaches an SPI device to line 1 (storage) or 2 (network).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSpiSlot`] for any other line.
    pub fn set_spi(&mut self, slot: usize, spi: Box<dyn Spi>) -> Result<(), ConfigError> {
        self.bus.io_mut().set_spi(slot, spi)
    }

    /// Attaches the host clipboard bridge.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.bus.io_mut().set_clipboard(clipboard);
    }

    /// Sets the millisecond timer.
    pub const fn set_time(&mut self, ms: u32) {
        self.bus.io_mut().set_time(ms);
    }

    /// Sets the switch bits.
    pub const fn set_switches(&mut self, bits: u32) {
        self.bus.io_mut().set_switches(bits);
    }

    /// Last LED value written by the guest.
    #[must_use]
    pub const fn leds(&self) -> u32 {
        self.bus.io().leds()
    }

    /// Moves the mouse; out-of-range coordinates are ignored per axis.
    pub const fn mouse_moved(&mut self, x: i32, y: i32) {
        self.bus.io_mut().mouse_moved(x, y);
    }

    /// Presses or releases mouse button 1, 2 or 3.
    pub const fn mouse_button(&mut self, button: u32, down: bool) {
        self.bus.io_mut().mouse_button(button, down);
    }

    /// Queues PS/2 scancodes for the guest.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::KeyboardQueueFull`] if the scancodes do not all
    /// fit; nothing is queued in that case.
    pub fn keyboard_input(&mut self, scancodes: &[u8]) -> Result<(), InputError> {
        self.bus.io_mut().keyboard_input(scancodes)
    }

    /// Display words, row-major.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.bus.framebuffer()
    }

    /// Framebuffer row length in words.
    #[must_use]
    pub const fn framebuffer_words_per_row(&self) -> u32 {
        self.bus.framebuffer_words_per_row()
    }

    /// Current damage rectangle, without resetting it.
    #[must_use]
    pub const fn damage(&self) -> DamageRect {
        self.bus.damage().rect()
    }

    /// Returns the damage rectangle and resets it to empty.
    pub const fn take_damage(&mut self) -> DamageRect {
        self.bus.damage_mut().take()
    }

    /// Copies `words` into memory starting at byte address `addr` through
    /// the store path.
    pub fn write_ram(&mut self, addr: u32, words: &[u32]) {
        self.bus.write_words(addr, words);
    }

    /// Disassembles instructions around the current PC.
    #[must_use]
    pub fn disassemble_around_pc(&self, before: u32, after: u32) -> Vec<DisassemblyRow> {
        disassemble_window(self.arch.pc(), before, after, |pc| {
            self.bus.fetch_instruction(pc)
        })
    }
}
