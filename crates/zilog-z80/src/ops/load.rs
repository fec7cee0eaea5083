//! 8- and 16-bit loads.

use crate::decode::Flow;
use crate::error::CpuError;
use crate::flags::{CF, PF, sz53};
use crate::registers::Reg8;

use super::Exec;

pub(crate) fn nop(_: &mut Exec<'_>) -> Result<Flow, CpuError> {
    Ok(Flow::Continue)
}

/// LD r,r' / LD r,(HL) / LD (HL),r and the `(IX+d)` forms.
///
/// Under an index prefix only the memory side is redirected; H and L stay
/// H and L.
pub(crate) fn ld_r_r(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.operand8(e.z());
    e.store8(e.y(), value)?;
    Ok(Flow::Continue)
}

/// LD r,n / LD (HL),n / LD (IX+d),n.
pub(crate) fn ld_r_n(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let n = e.byte();
    e.store8(e.y(), n)?;
    Ok(Flow::Continue)
}

/// LD rr,nn (including LD IX,nn).
pub(crate) fn ld_rp_nn(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let nn = e.word();
    e.regs.set16(e.rp(e.p()), nn);
    Ok(Flow::Continue)
}

fn bc_or_de(e: &Exec<'_>) -> u16 {
    if e.p() == 0 { e.regs.bc() } else { e.regs.de() }
}

/// LD (BC),A / LD (DE),A.
pub(crate) fn ld_ind_a(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let addr = bc_or_de(e);
    e.memory.write(addr, e.regs.a())?;
    Ok(Flow::Continue)
}

/// LD A,(BC) / LD A,(DE).
pub(crate) fn ld_a_ind(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.memory.read(bc_or_de(e));
    e.regs.set_a(value);
    Ok(Flow::Continue)
}

/// LD (nn),HL / LD (nn),IX.
pub(crate) fn ld_nn_hl(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.regs.get16(e.index_pair());
    e.memory.write_word(e.word(), value)?;
    Ok(Flow::Continue)
}

/// LD HL,(nn) / LD IX,(nn).
pub(crate) fn ld_hl_nn(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.memory.read_word(e.word());
    e.regs.set16(e.index_pair(), value);
    Ok(Flow::Continue)
}

pub(crate) fn ld_nn_a(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.memory.write(e.word(), e.regs.a())?;
    Ok(Flow::Continue)
}

pub(crate) fn ld_a_nn(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.memory.read(e.word());
    e.regs.set_a(value);
    Ok(Flow::Continue)
}

/// LD SP,HL / LD SP,IX.
pub(crate) fn ld_sp_hl(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.regs.get16(e.index_pair());
    e.regs.set_sp(value);
    Ok(Flow::Continue)
}

/// ED: LD (nn),rr.
pub(crate) fn ld_nn_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.regs.get16(e.rp(e.p()));
    e.memory.write_word(e.word(), value)?;
    Ok(Flow::Continue)
}

/// ED: LD rr,(nn).
pub(crate) fn ld_rp_ind_nn(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.memory.read_word(e.word());
    e.regs.set16(e.rp(e.p()), value);
    Ok(Flow::Continue)
}

pub(crate) fn ld_i_a(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let a = e.regs.a();
    e.regs.set_i(a);
    Ok(Flow::Continue)
}

pub(crate) fn ld_r_a(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let a = e.regs.a();
    e.regs.set_r(a);
    Ok(Flow::Continue)
}

/// LD A,I and LD A,R copy IFF2 into P/V.
fn ld_a_special(e: &mut Exec<'_>, source: Reg8) {
    let value = e.regs.get8(source);
    let mut flags = sz53(value) | (e.regs.f() & CF);
    if e.regs.iff2 {
        flags |= PF;
    }
    e.regs.set_a(value);
    e.regs.set_f(flags);
}

pub(crate) fn ld_a_i(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    ld_a_special(e, Reg8::I);
    Ok(Flow::Continue)
}

pub(crate) fn ld_a_r(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    ld_a_special(e, Reg8::R);
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use emu_core::{Memory, Ram};

    use super::*;
    use crate::decode::{Fetched, Index};
    use crate::registers::Registers;

    fn run(
        handler: fn(&mut Exec<'_>) -> Result<Flow, CpuError>,
        regs: &mut Registers,
        ram: &mut Ram,
        opcode: u8,
        index: Index,
        operand: Fetched,
    ) {
        let mut e = Exec {
            regs,
            memory: ram,
            opcode,
            index,
            operand,
        };
        handler(&mut e).expect("handler succeeds");
    }

    #[test]
    fn ld_h_from_index_keeps_h() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set_ix(0x4000);
        regs.set_hl(0x0000);
        ram.write(0x3FFE, 0x5A).expect("in range");
        // LD H,(IX-2)
        run(ld_r_r, &mut regs, &mut ram, 0x66, Index::Ix, Fetched::Displacement(-2));
        assert_eq!(regs.h(), 0x5A);
        assert_eq!(regs.ix(), 0x4000);
    }

    #[test]
    fn ld_nn_hl_is_little_endian() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set_hl(0xBEEF);
        run(ld_nn_hl, &mut regs, &mut ram, 0x22, Index::Hl, Fetched::Word(0x8000));
        assert_eq!(ram.read(0x8000), 0xEF);
        assert_eq!(ram.read(0x8001), 0xBE);
    }

    #[test]
    fn ld_a_i_reports_iff2() {
        let mut regs = Registers::new();
        let mut ram = Ram::default();
        regs.set8(Reg8::I, 0x80);
        regs.iff2 = true;
        regs.set_f(CF);
        run(ld_a_i, &mut regs, &mut ram, 0x57, Index::Hl, Fetched::None);
        assert_eq!(regs.a(), 0x80);
        assert_eq!(regs.f(), crate::flags::SF | PF | CF);
    }
}
