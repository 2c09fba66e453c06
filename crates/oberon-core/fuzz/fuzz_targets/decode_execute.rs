#![no_main]

use libfuzzer_sys::fuzz_target;
use oberon_core::{disassemble_one, Decoder, Machine, MachineConfig};

fuzz_target!(|data: &[u8]| {
    let words: Vec<u32> = data
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .take(64)
        .collect();
    let Some((&first, program)) = words.split_first() else {
        return;
    };

    let decoded = Decoder::decode(first);
    assert_eq!(Decoder::decode(decoded.encode()), decoded);
    let _ = disassemble_one(0, first);

    // MOV R0, 0 ; B R0
    let Ok(mut machine) = Machine::new(MachineConfig::default(), &[0x4000_0000, 0xC700_0000])
    else {
        return;
    };
    machine.write_ram(0, &words);
    let _ = machine.run(u32::try_from(program.len()).unwrap_or(0) * 4 + 8);
});
