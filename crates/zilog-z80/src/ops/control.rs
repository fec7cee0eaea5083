//! Jumps, HALT and interrupt control.

use crate::decode::Flow;
use crate::error::CpuError;

use super::Exec;

fn jump_relative(e: &mut Exec<'_>) {
    let pc = e.regs.pc().wrapping_add_signed(i16::from(e.displacement()));
    e.regs.set_pc(pc);
}

pub(crate) fn jr(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    jump_relative(e);
    Ok(Flow::Continue)
}

/// JR NZ/Z/NC/C. Only the first four conditions exist here.
pub(crate) fn jr_cc(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let taken = e.condition(e.y() - 4);
    if taken {
        jump_relative(e);
    }
    Ok(Flow::Branch(taken))
}

pub(crate) fn djnz(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let b = e.regs.b().wrapping_sub(1);
    e.regs.set_b(b);
    let taken = b != 0;
    if taken {
        jump_relative(e);
    }
    Ok(Flow::Branch(taken))
}

pub(crate) fn jp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.regs.set_pc(e.word());
    Ok(Flow::Continue)
}

/// JP cc,nn. Costs the same either way.
pub(crate) fn jp_cc(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let taken = e.condition(e.y());
    if taken {
        e.regs.set_pc(e.word());
    }
    Ok(Flow::Branch(taken))
}

/// JP (HL) / JP (IX). Jumps to the register value, not through memory.
pub(crate) fn jp_hl(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let target = e.regs.get16(e.index_pair());
    e.regs.set_pc(target);
    Ok(Flow::Continue)
}

pub(crate) fn halt(_: &mut Exec<'_>) -> Result<Flow, CpuError> {
    Ok(Flow::Halt)
}

pub(crate) fn di(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.regs.iff1 = false;
    e.regs.iff2 = false;
    Ok(Flow::Continue)
}

pub(crate) fn ei(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.regs.iff1 = true;
    e.regs.iff2 = true;
    Ok(Flow::Continue)
}

/// IM 0 / IM 1 / IM 2 (ED 46, 56, 5E).
pub(crate) fn im(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.regs.im = match e.y() & 3 {
        0 | 1 => 0,
        2 => 1,
        _ => 2,
    };
    Ok(Flow::Continue)
}
