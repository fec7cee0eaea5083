//! 8- and 16-bit arithmetic and the accumulator specials.

use crate::alu;
use crate::decode::Flow;
use crate::error::CpuError;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};

use super::Exec;

/// INC r / INC (HL) / INC (IX+d). Carry is untouched.
pub(crate) fn inc_r(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let result = alu::inc8(e.operand8(e.y()));
    e.store8(e.y(), result.value)?;
    e.regs.flags_mut().merge(!CF, result.flags);
    Ok(Flow::Continue)
}

/// DEC r / DEC (HL) / DEC (IX+d). Carry is untouched.
pub(crate) fn dec_r(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let result = alu::dec8(e.operand8(e.y()));
    e.store8(e.y(), result.value)?;
    e.regs.flags_mut().merge(!CF, result.flags);
    Ok(Flow::Continue)
}

/// INC rr. No flags.
pub(crate) fn inc_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let reg = e.rp(e.p());
    e.regs.pair_mut(reg).increment();
    Ok(Flow::Continue)
}

/// DEC rr. No flags.
pub(crate) fn dec_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let reg = e.rp(e.p());
    e.regs.pair_mut(reg).decrement();
    Ok(Flow::Continue)
}

/// ADD HL,rr / ADD IX,rr. S, Z and P/V are kept.
pub(crate) fn add_hl_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let target = e.index_pair();
    let (value, flags) = alu::add16(e.regs.get16(target), e.regs.get16(e.rp(e.p())));
    e.regs.set16(target, value);
    e.regs.flags_mut().merge(HF | NF | CF | YF | XF, flags);
    Ok(Flow::Continue)
}

pub(crate) fn adc_hl_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let carry = e.regs.flags().carry();
    let (value, flags) = alu::adc16(e.regs.hl(), e.regs.get16(e.rp(e.p())), carry);
    e.regs.set_hl(value);
    e.regs.set_f(flags);
    Ok(Flow::Continue)
}

pub(crate) fn sbc_hl_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let carry = e.regs.flags().carry();
    let (value, flags) = alu::sbc16(e.regs.hl(), e.regs.get16(e.rp(e.p())), carry);
    e.regs.set_hl(value);
    e.regs.set_f(flags);
    Ok(Flow::Continue)
}

fn accumulate(e: &mut Exec<'_>, operand: u8) {
    let op = e.y();
    let result = alu::alu8(op, e.regs.a(), operand, e.regs.flags().carry());
    if op != 7 {
        e.regs.set_a(result.value);
    }
    e.regs.set_f(result.flags);
}

/// ADD/ADC/SUB/SBC/AND/XOR/OR/CP with a register or memory operand.
pub(crate) fn alu_a_r(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let operand = e.operand8(e.z());
    accumulate(e, operand);
    Ok(Flow::Continue)
}

/// The same eight operations with an immediate byte.
pub(crate) fn alu_a_n(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let operand = e.byte();
    accumulate(e, operand);
    Ok(Flow::Continue)
}

pub(crate) fn neg(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let result = alu::neg8(e.regs.a());
    e.regs.set_a(result.value);
    e.regs.set_f(result.flags);
    Ok(Flow::Continue)
}

pub(crate) fn daa(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let result = alu::daa(e.regs.a(), e.regs.f());
    e.regs.set_a(result.value);
    e.regs.set_f(result.flags);
    Ok(Flow::Continue)
}

pub(crate) fn cpl(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let a = !e.regs.a();
    e.regs.set_a(a);
    e.regs
        .flags_mut()
        .merge(HF | NF | YF | XF, HF | NF | (a & (YF | XF)));
    Ok(Flow::Continue)
}

pub(crate) fn scf(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let a = e.regs.a();
    e.regs
        .flags_mut()
        .merge(HF | NF | CF | YF | XF, CF | (a & (YF | XF)));
    Ok(Flow::Continue)
}

/// CCF moves the old carry into H.
pub(crate) fn ccf(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let a = e.regs.a();
    let f = e.regs.f();
    let carried = if f & CF != 0 { HF } else { CF };
    e.regs.set_f((f & (SF | ZF | PF)) | carried | (a & (YF | XF)));
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use emu_core::Ram;

    use super::*;
    use crate::decode::{Fetched, Index};
    use crate::registers::Registers;

    fn exec<'a>(regs: &'a mut Registers, ram: &'a mut Ram, opcode: u8) -> Exec<'a> {
        Exec {
            regs,
            memory: ram,
            opcode,
            index: Index::Hl,
            operand: Fetched::None,
        }
    }

    #[test]
    fn inc_keeps_carry() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set_b(0xFF);
        regs.set_f(CF);
        inc_r(&mut exec(&mut regs, &mut ram, 0x04)).expect("ok");
        assert_eq!(regs.b(), 0x00);
        assert_eq!(regs.f(), ZF | HF | CF);
    }

    #[test]
    fn cp_leaves_accumulator() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set_a(0x10);
        regs.set_b(0x10);
        alu_a_r(&mut exec(&mut regs, &mut ram, 0xB8)).expect("ok");
        assert_eq!(regs.a(), 0x10);
        assert!(regs.flags().zero());
    }

    #[test]
    fn ccf_moves_carry_into_half_carry() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set_a(0x00);
        regs.set_f(CF | NF);
        ccf(&mut exec(&mut regs, &mut ram, 0x3F)).expect("ok");
        assert_eq!(regs.f(), HF);
    }

    #[test]
    fn add_hl_keeps_sign_zero_parity() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set_hl(0xFFFF);
        regs.set_bc(0x0001);
        regs.set_f(SF | ZF | PF);
        add_hl_rp(&mut exec(&mut regs, &mut ram, 0x09)).expect("ok");
        assert_eq!(regs.hl(), 0x0000);
        assert_eq!(regs.f(), SF | ZF | PF | HF | CF);
    }

    #[test]
    fn neg_of_0x80_overflows() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set_a(0x80);
        neg(&mut exec(&mut regs, &mut ram, 0x44)).expect("ok");
        assert_eq!(regs.a(), 0x80);
        assert_eq!(regs.f() & (PF | CF | NF), PF | CF | NF);
    }
}
