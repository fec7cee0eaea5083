//! Table-driven single-instruction tests.
//!
//! Each case in `tests/data/single_step.json` gives a starting state, the
//! state after exactly one `step()`, and the cycles that step must report.
//! Registers left out of `initial` keep their cold-boot value; registers left
//! out of `final` are not checked.

use std::fs;
use std::path::Path;

use emu_core::{Clock, CycleCounter, Cycles, Memory, Ram};
use serde::Deserialize;
use zilog_z80::{Reg8, Reg16, Z80};

#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: u64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CpuState {
    pc: Option<u16>,
    sp: Option<u16>,
    a: Option<u8>,
    f: Option<u8>,
    b: Option<u8>,
    c: Option<u8>,
    d: Option<u8>,
    e: Option<u8>,
    h: Option<u8>,
    l: Option<u8>,
    i: Option<u8>,
    r: Option<u8>,
    ix: Option<u16>,
    iy: Option<u16>,
    #[serde(rename = "af_")]
    af_alt: Option<u16>,
    #[serde(rename = "bc_")]
    bc_alt: Option<u16>,
    #[serde(rename = "de_")]
    de_alt: Option<u16>,
    #[serde(rename = "hl_")]
    hl_alt: Option<u16>,
    ram: Vec<(u16, u8)>,
}

const BYTE_REGS: [(&str, Reg8); 10] = [
    ("A", Reg8::A),
    ("F", Reg8::F),
    ("B", Reg8::B),
    ("C", Reg8::C),
    ("D", Reg8::D),
    ("E", Reg8::E),
    ("H", Reg8::H),
    ("L", Reg8::L),
    ("I", Reg8::I),
    ("R", Reg8::R),
];

fn byte_fields(state: &CpuState) -> [Option<u8>; 10] {
    [
        state.a, state.f, state.b, state.c, state.d, state.e, state.h, state.l, state.i, state.r,
    ]
}

fn word_fields(state: &CpuState) -> [(&'static str, Reg16, Option<u16>); 4] {
    [
        ("PC", Reg16::Pc, state.pc),
        ("SP", Reg16::Sp, state.sp),
        ("IX", Reg16::Ix, state.ix),
        ("IY", Reg16::Iy, state.iy),
    ]
}

fn shadow_fields(state: &CpuState) -> [(&'static str, Reg16, Option<u16>); 4] {
    [
        ("AF'", Reg16::Af, state.af_alt),
        ("BC'", Reg16::Bc, state.bc_alt),
        ("DE'", Reg16::De, state.de_alt),
        ("HL'", Reg16::Hl, state.hl_alt),
    ]
}

fn setup(cpu: &mut Z80, ram: &mut Ram, state: &CpuState) {
    for &(addr, value) in &state.ram {
        ram.write(addr, value).expect("64K RAM accepts every address");
    }
    let regs = cpu.registers_mut();
    for ((_, reg), value) in BYTE_REGS.iter().zip(byte_fields(state)) {
        if let Some(value) = value {
            regs.set8(*reg, value);
        }
    }
    for (_, reg, value) in word_fields(state) {
        if let Some(value) = value {
            regs.set16(reg, value);
        }
    }
    for (_, reg, value) in shadow_fields(state) {
        if let Some(value) = value {
            regs.set_shadow(reg, value);
        }
    }
}

fn compare(cpu: &Z80, ram: &Ram, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();
    let regs = emu_core::Cpu::registers(cpu);

    for ((name, reg), want) in BYTE_REGS.iter().zip(byte_fields(expected)) {
        let got = regs.get8(*reg);
        if let Some(want) = want.filter(|&want| want != got) {
            errors.push(format!("{name}: got ${got:02X}, want ${want:02X}"));
        }
    }
    for (name, reg, want) in word_fields(expected) {
        let got = regs.get16(reg);
        if let Some(want) = want.filter(|&want| want != got) {
            errors.push(format!("{name}: got ${got:04X}, want ${want:04X}"));
        }
    }
    for (name, reg, want) in shadow_fields(expected) {
        let got = regs.shadow(reg).map_or(0, |pair| pair.get());
        if let Some(want) = want.filter(|&want| want != got) {
            errors.push(format!("{name}: got ${got:04X}, want ${want:04X}"));
        }
    }
    for &(addr, want) in &expected.ram {
        let got = ram.read(addr);
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }
    errors
}

#[test]
fn single_step_cases() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/single_step.json");
    let data = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    let tests: Vec<TestCase> = serde_json::from_str(&data)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));
    assert!(!tests.is_empty());

    let mut failures = Vec::new();
    for test in &tests {
        let mut cpu = Z80::new();
        let mut ram = Ram::default();
        let mut clock = CycleCounter::new();
        setup(&mut cpu, &mut ram, &test.initial);

        let mut errors = match cpu.step(&mut ram, &mut clock) {
            Ok(cost) if cost == Cycles::new(test.cycles) => compare(&cpu, &ram, &test.final_state),
            Ok(cost) => vec![format!("cycles: got {cost}, want {}", test.cycles)],
            Err(err) => vec![format!("step failed: {err}")],
        };
        if clock.elapsed() != Cycles::new(test.cycles) {
            errors.push(format!("clock: got {}, want {}", clock.elapsed(), test.cycles));
        }
        if !errors.is_empty() {
            failures.push(format!("  FAIL [{}]: {}", test.name, errors.join(", ")));
        }
    }

    assert!(failures.is_empty(), "{} of {} failed:\n{}", failures.len(), tests.len(), failures.join("\n"));
}
