//! Fetch, decode and execute.
//!
//! An instruction is executed in two phases. [`execute_instruction`] reads
//! operands, performs memory accesses and computes every register, `H`,
//! flag and PC change into an [`ExecuteState`]; [`commit_execution`] then
//! applies them in architectural order:
//!
//! 1. destination register write (recomputes `Z` and `N`)
//! 2. carry/overflow update
//! 3. `H` write
//! 4. PC change
//!
//! A rejected divisor produces an empty state, so nothing is committed.

#![allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]

mod flags;
mod helpers;

pub use flags::FlagsUpdate;
pub use helpers::{branch_target, effective_address, operand_value, widen_immediate};

use tracing::{event, Level};

use crate::alu;
use crate::api::{MemoryWriteResult, RunOutcome, StepOutcome};
use crate::decoder::{BranchTarget, DecodedInstruction, Decoder, MemoryOp, Operand};
use crate::diag::DiagCounters;
use crate::encoding::{Condition, Opcode};
use crate::fault::FaultCode;
use crate::fpu;
use crate::memory::{MemoryBus, RESET_PC};
use crate::state::{ArchitecturalState, GeneralRegister, LINK_REGISTER};

const SIGN_BIT: u32 = 0x8000_0000;

/// Outcome of executing a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Instruction retired.
    Retired,
    /// Instruction retired but raised a recoverable fault.
    Fault {
        /// Fault code.
        cause: FaultCode,
    },
}

/// Side effects accumulated by [`execute_instruction`], applied by
/// [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Register write through the flag-updating path.
    pub dest: Option<(GeneralRegister, u32)>,
    /// Carry/overflow change.
    pub flags_update: FlagsUpdate,
    /// New value of `H`.
    pub aux: Option<u32>,
    /// New PC, when a branch is taken.
    pub next_pc: Option<u32>,
}

/// Executes one decoded instruction against `arch` and `bus`.
///
/// `arch.pc()` must already point at the following instruction. Loads and
/// stores reach the bus here; all register-side effects are returned in the
/// [`ExecuteState`] for [`commit_execution`].
pub fn execute_instruction(
    instr: &DecodedInstruction,
    arch: &ArchitecturalState,
    bus: &mut MemoryBus,
) -> (ExecuteOutcome, ExecuteState) {
    match *instr {
        DecodedInstruction::Register {
            op,
            a,
            b,
            operand,
            u,
            v,
        } => execute_register(op, a, b, operand, u, v, arch),
        DecodedInstruction::Memory { op, a, b, offset } => {
            execute_memory(op, a, effective_address(b, offset, arch), arch, bus)
        }
        DecodedInstruction::Branch {
            condition,
            invert,
            link,
            target,
        } => (
            ExecuteOutcome::Retired,
            execute_branch(condition, invert, link, target, arch),
        ),
    }
}

/// Applies a computed [`ExecuteState`] to the architectural state.
pub fn commit_execution(arch: &mut ArchitecturalState, exec: &ExecuteState) {
    if let Some((reg, value)) = exec.dest {
        arch.write_register(reg, value);
    }
    exec.flags_update.apply(arch.flags_mut());
    if let Some(aux) = exec.aux {
        arch.set_aux(aux);
    }
    if let Some(pc) = exec.next_pc {
        arch.set_pc(pc);
    }
}

const fn write(reg: GeneralRegister, value: u32) -> ExecuteState {
    ExecuteState {
        dest: Some((reg, value)),
        flags_update: FlagsUpdate::None,
        aux: None,
        next_pc: None,
    }
}

fn execute_register(
    op: Opcode,
    a: GeneralRegister,
    b: GeneralRegister,
    operand: Operand,
    u: bool,
    v: bool,
    arch: &ArchitecturalState,
) -> (ExecuteOutcome, ExecuteState) {
    let b_val = arch.gpr(b);
    let c_val = operand_value(operand, v, arch);
    let carry_in = u && arch.flags().carry;

    let exec = match op {
        Opcode::Mov => write(a, mov_value(operand, c_val, u, v, arch)),
        Opcode::Lsl => write(a, alu::lsl(b_val, c_val)),
        Opcode::Asr => write(a, alu::asr(b_val, c_val)),
        Opcode::Ror => write(a, alu::ror(b_val, c_val)),
        Opcode::And => write(a, b_val & c_val),
        Opcode::Ann => write(a, b_val & !c_val),
        Opcode::Ior => write(a, b_val | c_val),
        Opcode::Xor => write(a, b_val ^ c_val),
        Opcode::Add | Opcode::Sub => {
            let result = if op == Opcode::Add {
                alu::add(b_val, c_val, carry_in)
            } else {
                alu::sub(b_val, c_val, carry_in)
            };
            ExecuteState {
                flags_update: FlagsUpdate::from_alu(result),
                ..write(a, result.value)
            }
        }
        Opcode::Mul => {
            let (lo, hi) = alu::mul(b_val, c_val, u);
            ExecuteState {
                aux: Some(hi),
                ..write(a, lo)
            }
        }
        Opcode::Div => {
            let Some((quotient, remainder)) = alu::div(b_val, c_val, u) else {
                event!(
                    Level::WARN,
                    pc = format_args!("{:#010x}", arch.pc().wrapping_sub(1).wrapping_mul(4)),
                    dividend = b_val as i32,
                    divisor = c_val as i32,
                    unsigned = u,
                    "division by a non-positive divisor ignored"
                );
                return (
                    ExecuteOutcome::Fault {
                        cause: FaultCode::NonPositiveDivisor,
                    },
                    ExecuteState::default(),
                );
            };
            ExecuteState {
                aux: Some(remainder),
                ..write(a, quotient)
            }
        }
        Opcode::Fad => write(a, fpu::fp_add(b_val, c_val, u, v)),
        Opcode::Fsb => write(a, fpu::fp_add(b_val, c_val ^ SIGN_BIT, u, v)),
        Opcode::Fml => write(a, fpu::fp_mul(b_val, c_val)),
        Opcode::Fdv => write(a, fpu::fp_div(b_val, c_val)),
    };
    (ExecuteOutcome::Retired, exec)
}

const fn mov_value(operand: Operand, c_val: u32, u: bool, v: bool, arch: &ArchitecturalState) -> u32 {
    match (u, operand) {
        (false, _) => c_val,
        (true, Operand::Immediate(_)) => c_val << 16,
        (true, Operand::Register(_)) if v => arch.flags().packed(),
        (true, Operand::Register(_)) => arch.aux(),
    }
}

fn execute_memory(
    op: MemoryOp,
    a: GeneralRegister,
    addr: u32,
    arch: &ArchitecturalState,
    bus: &mut MemoryBus,
) -> (ExecuteOutcome, ExecuteState) {
    let stored = match op {
        MemoryOp::LoadWord => return (ExecuteOutcome::Retired, write(a, bus.load_word(addr))),
        MemoryOp::LoadByte => return (ExecuteOutcome::Retired, write(a, bus.load_byte(addr))),
        MemoryOp::StoreWord => bus.store_word(addr, arch.gpr(a)),
        MemoryOp::StoreByte => bus.store_byte(addr, arch.gpr(a) as u8),
    };
    let outcome = match stored {
        MemoryWriteResult::IgnoredRom => ExecuteOutcome::Fault {
            cause: FaultCode::RomWrite,
        },
        MemoryWriteResult::Applied | MemoryWriteResult::IgnoredUnmapped => ExecuteOutcome::Retired,
    };
    (outcome, ExecuteState::default())
}

fn execute_branch(
    condition: Condition,
    invert: bool,
    link: bool,
    target: BranchTarget,
    arch: &ArchitecturalState,
) -> ExecuteState {
    if condition.evaluate(arch.flags()) == invert {
        return ExecuteState::default();
    }
    let link_value = link.then_some(arch.pc().wrapping_mul(4));
    ExecuteState {
        dest: link_value.map(|value| (LINK_REGISTER, value)),
        flags_update: FlagsUpdate::None,
        aux: None,
        next_pc: Some(branch_target(target, link_value, arch)),
    }
}

/// Fetches, decodes and executes one instruction.
///
/// A PC outside RAM and ROM rewinds the core to [`RESET_PC`] and reports
/// [`StepOutcome::InvalidFetch`]; every other instruction retires.
pub fn step_one(
    arch: &mut ArchitecturalState,
    bus: &mut MemoryBus,
    diag: &mut DiagCounters,
) -> StepOutcome {
    let pc = arch.pc();
    let Some(word) = bus.fetch_instruction(pc) else {
        event!(
            Level::WARN,
            pc = format_args!("{:#010x}", pc.wrapping_mul(4)),
            "branched into the void, resetting"
        );
        record_fault(arch, diag, FaultCode::InvalidFetch, pc);
        return StepOutcome::InvalidFetch { pc };
    };

    arch.set_pc(pc.wrapping_add(1));
    let instruction = Decoder::decode(word);
    event!(
        Level::TRACE,
        pc = format_args!("{:#010x}", pc.wrapping_mul(4)),
        word = format_args!("{word:#010x}"),
        %instruction,
        "execute"
    );
    diag.increment_instruction_count();

    let (outcome, exec) = execute_instruction(&instruction, arch, bus);
    commit_execution(arch, &exec);
    match outcome {
        ExecuteOutcome::Retired => StepOutcome::Retired,
        ExecuteOutcome::Fault { cause } => {
            record_fault(arch, diag, cause, pc);
            StepOutcome::RetiredWithFault { cause }
        }
    }
}

fn record_fault(
    arch: &mut ArchitecturalState,
    diag: &mut DiagCounters,
    cause: FaultCode,
    pc: u32,
) {
    diag.record_fault(cause, pc);
    if cause.resets_core() {
        arch.set_pc(RESET_PC);
    }
}

/// Steps up to `cycles` instructions after refilling the progress budget,
/// stopping early once the guest has used it up.
pub fn run(
    arch: &mut ArchitecturalState,
    bus: &mut MemoryBus,
    diag: &mut DiagCounters,
    progress_budget: u32,
    cycles: u32,
) -> RunOutcome {
    bus.io_mut().set_progress(progress_budget);
    let mut steps = 0;
    while steps < cycles && bus.io().progress() != 0 {
        let _ = step_one(arch, bus, diag);
        steps += 1;
    }
    RunOutcome {
        steps,
        stalled: bus.io().progress() == 0,
    }
}
