//! Property tests for the register model and the engine.

use emu_core::{Cpu, CycleCounter, Memory, Ram};
use proptest::prelude::*;
use zilog_z80::{CF, Prefix, Register8, RegisterPair, Registers, Z80, implemented_count, is_implemented};

fn run(program: &[u8], steps: usize, prepare: impl FnOnce(&mut Registers)) -> (Z80, Ram) {
    let mut ram = Ram::default();
    ram.load(0, program).expect("program fits");
    let mut cpu = Z80::new();
    prepare(cpu.registers_mut());
    let mut clock = CycleCounter::new();
    for _ in 0..steps {
        cpu.step(&mut ram, &mut clock).expect("step");
    }
    (cpu, ram)
}

proptest! {
    /// Property: a pair is its two halves, upper byte first
    #[test]
    fn prop_pair_aliases_halves(hi: u8, lo: u8, word: u16) {
        let mut regs = Registers::new();
        regs.set_b(hi);
        regs.set_c(lo);
        prop_assert_eq!(regs.bc(), (u16::from(hi) << 8) | u16::from(lo));

        regs.set_hl(word);
        prop_assert_eq!(regs.h(), (word >> 8) as u8);
        prop_assert_eq!(regs.l(), word as u8);
    }

    /// Property: 8- and 16-bit cells wrap
    #[test]
    fn prop_cells_wrap(byte: u8, delta: u8, word: u16, step: u16) {
        let mut cell = Register8::new(byte);
        cell.add(delta);
        prop_assert_eq!(cell.get(), byte.wrapping_add(delta));
        cell.sub(delta);
        prop_assert_eq!(cell.get(), byte);

        let mut pair = RegisterPair::new(word);
        pair.add(step);
        prop_assert_eq!(pair.get(), word.wrapping_add(step));
        pair.sub(step);
        prop_assert_eq!(pair.get(), word);
    }

    /// Property: every exchange undoes itself
    #[test]
    fn prop_exchanges_are_involutions(af: u16, bc: u16, de: u16, hl: u16) {
        let mut regs = Registers::new();
        regs.set_af(af);
        regs.set_bc(bc);
        regs.set_de(de);
        regs.set_hl(hl);
        let before = regs.snapshot();

        regs.exchange_accumulator_bank();
        regs.exchange_accumulator_bank();
        prop_assert_eq!(regs.snapshot(), before);

        regs.exchange_general_bank();
        regs.exchange_general_bank();
        prop_assert_eq!(regs.snapshot(), before);

        regs.exchange_all_banks();
        prop_assert_eq!(regs.snapshot().af_alt, af);
        prop_assert_eq!(regs.snapshot().hl_alt, hl);
        regs.exchange_all_banks();
        prop_assert_eq!(regs.snapshot(), before);
    }

    /// Property: PUSH then POP returns the value and restores SP
    #[test]
    fn prop_stack_round_trip(value: u16, sp in 0x1000u16..=0xFFFF) {
        // PUSH BC; POP DE
        let (cpu, ram) = run(&[0xC5, 0xD1], 2, |regs| {
            regs.set_bc(value);
            regs.set_sp(sp);
        });
        prop_assert_eq!(cpu.registers().de(), value);
        prop_assert_eq!(cpu.registers().sp(), sp);
        prop_assert_eq!(ram.read_word(sp.wrapping_sub(2)), value);
    }

    /// Property: INC and DEC never touch carry
    #[test]
    fn prop_inc_dec_keep_carry(a: u8, carry: bool) {
        // INC A; DEC A
        let (cpu, _) = run(&[0x3C, 0x3D], 2, |regs| {
            regs.set_a(a);
            regs.set_f(if carry { CF } else { 0 });
        });
        prop_assert_eq!(cpu.registers().a(), a);
        prop_assert_eq!(cpu.registers().flags().carry(), carry);
    }

    /// Property: ADD then SUB of the same operand restores A
    #[test]
    fn prop_add_sub_inverse(a: u8, n: u8) {
        // ADD A,n; SUB n
        let (cpu, _) = run(&[0xC6, n, 0xD6, n], 2, |regs| regs.set_a(a));
        prop_assert_eq!(cpu.registers().a(), a);
    }

    /// Property: a relative jump lands at PC + 2 + d
    #[test]
    fn prop_jr_target(d: i8, origin in 0x0100u16..0xFF00) {
        let mut ram = Ram::default();
        ram.load(origin, &[0x18, d as u8]).expect("fits");
        let mut cpu = Z80::new();
        cpu.registers_mut().set_pc(origin);
        cpu.step(&mut ram, &mut CycleCounter::new()).expect("JR");
        prop_assert_eq!(cpu.pc(), origin.wrapping_add(2).wrapping_add_signed(i16::from(d)));
    }
}

#[test]
fn prefix_tables_agree_on_index_forms() {
    for op in 0..=0xFFu8 {
        assert_eq!(is_implemented(Prefix::Dd, op), is_implemented(Prefix::Fd, op), "{op:#04X}");
        assert_eq!(is_implemented(Prefix::DdCb, op), is_implemented(Prefix::FdCb, op), "{op:#04X}");
    }
    let total: usize = Prefix::ALL.into_iter().map(implemented_count).sum();
    assert_eq!(total, 250 + 256 + 39 + 36 + 39 + 32 + 32);
}
