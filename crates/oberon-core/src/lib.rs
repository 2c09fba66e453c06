//! Core emulator for the Project Oberon RISC machine.
//!
//! The crate models the CPU (registers, flags, ALU, bit-exact FPU), the
//! memory bus over RAM, boot ROM and memory-mapped I/O, and the framebuffer
//! damage tracker. Devices with a host side (serial, SPI, clipboard) are
//! attached as trait objects; rendering and scheduling stay with the host.

/// Integer arithmetic-logic operations.
pub mod alu;

/// Bit-exact floating-point add, multiply and divide.
pub mod fpu;

/// Framebuffer damage rectangle.
pub mod damage;
pub use damage::{Damage, DamageRect};

/// Memory model primitives and the bus.
pub mod memory;
pub use memory::{
    decode_fetch, decode_memory_region, FetchSource, MemoryBus, MemoryRegion, DISPLAY_START,
    IO_START, MEM_SIZE, MEM_WORDS, RESET_PC, ROM_START, ROM_WORDS,
};

/// Memory-mapped I/O registers.
pub mod peripherals;
pub use peripherals::IoBlock;

/// Runtime diagnostics counters.
pub mod diag;
pub use diag::DiagCounters;

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    Clipboard, MachineConfig, MemoryWriteResult, RunOutcome, Serial, Spi, StepOutcome,
    DEFAULT_FRAMEBUFFER_HEIGHT, DEFAULT_FRAMEBUFFER_WIDTH, DEFAULT_PROGRESS_BUDGET,
    FRAMEBUFFER_MAGIC,
};

/// Architectural CPU state.
pub mod state;
pub use state::{ArchitecturalState, Flags, GeneralRegister, GENERAL_REGISTER_COUNT, LINK_REGISTER};

/// Instruction formats, opcodes and branch conditions.
pub mod encoding;
pub use encoding::{Condition, InstructionFormat, Opcode};

/// Instruction word decoder.
pub mod decoder;
pub use decoder::{BranchTarget, DecodedInstruction, Decoder, MemoryOp, Operand};

/// Fault and error taxonomy.
pub mod fault;
pub use fault::{ConfigError, FaultCode, InputError};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, step_one, ExecuteOutcome, ExecuteState, FlagsUpdate,
};

/// Assembly-notation disassembler.
pub mod disasm;
pub use disasm::{disassemble_one, disassemble_window, DisassemblyRow};

/// Machine aggregate driven by the host.
pub mod machine;
pub use machine::Machine;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
