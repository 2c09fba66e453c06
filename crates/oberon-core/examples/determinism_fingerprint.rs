//! Deterministic run fingerprint used for cross-host comparison.

use oberon_core::{FaultCode, Machine, MachineConfig};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

/// `MOV R0, 0 ; B R0`
const BOOT_STUB: [u32; 2] = [0x4000_0000, 0xC700_0000];

const PROGRAM: [u32; 11] = [
    0x4000_0001, // MOV R0, 1
    0x6100_3F80, // MOV' R1, 0x3F80
    0x4200_0064, // MOV R2, 100
    0x400A_006D, // MUL R0, R0, 109
    0x4008_3039, // ADD R0, R0, 12345
    0x031C_0001, // FAD R3, R1, R1
    0x013E_0001, // FML R1, R3, R1
    0x440B_0000, // DIV R4, R0, 0
    0x4229_0001, // SUB R2, R2, 1
    0xE9FF_FFF9, // BNE -7
    0xE7FF_FFFF, // B -1
];

fn hash_words(hash: &mut u64, words: &[u32]) {
    for word in words {
        for byte in word.to_le_bytes() {
            *hash ^= u64::from(byte);
            *hash = hash.wrapping_mul(0x1000_0000_01B3);
        }
    }
}

fn fingerprint() -> String {
    let mut machine = Machine::new(MachineConfig::default(), &BOOT_STUB)
        .expect("default configuration is valid");
    machine.write_ram(0, &PROGRAM);
    let outcome = machine.run(1_000);

    let arch = machine.arch();
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_words(&mut hash, &[outcome.steps, u32::from(outcome.stalled)]);
    hash_words(&mut hash, &[arch.pc(), arch.aux(), arch.flags().packed()]);
    hash_words(&mut hash, &arch.registers());
    hash_words(&mut hash, &machine.bus().ram()[..PROGRAM.len()]);
    hash_words(&mut hash, &machine.framebuffer()[..3]);

    let diag = machine.diagnostics();
    let last_fault = diag.last_fault_code.map_or(0, FaultCode::as_u8);
    hash_words(&mut hash, &[u32::from(last_fault), diag.last_fault_pc]);
    hash_words(&mut hash, &FaultCode::ALL.map(|code| diag.count_of(code)));

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
