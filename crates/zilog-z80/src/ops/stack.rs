//! PUSH, POP, calls and returns.

use crate::decode::Flow;
use crate::error::CpuError;

use super::Exec;

pub(crate) fn push_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.regs.get16(e.rp2(e.p()));
    e.push(value)?;
    Ok(Flow::Continue)
}

pub(crate) fn pop_rp(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.pop();
    e.regs.set16(e.rp2(e.p()), value);
    Ok(Flow::Continue)
}

fn call_to(e: &mut Exec<'_>, target: u16) -> Result<(), CpuError> {
    let ret = e.regs.pc();
    e.push(ret)?;
    e.regs.set_pc(target);
    Ok(())
}

pub(crate) fn call(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let target = e.word();
    call_to(e, target)?;
    Ok(Flow::Continue)
}

pub(crate) fn call_cc(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let taken = e.condition(e.y());
    if taken {
        let target = e.word();
        call_to(e, target)?;
    }
    Ok(Flow::Branch(taken))
}

pub(crate) fn ret(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let target = e.pop();
    e.regs.set_pc(target);
    Ok(Flow::Continue)
}

pub(crate) fn ret_cc(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let taken = e.condition(e.y());
    if taken {
        ret(e)?;
    }
    Ok(Flow::Branch(taken))
}

/// RETN and RETI: return and restore IFF1 from IFF2.
pub(crate) fn retn(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.regs.iff1 = e.regs.iff2;
    ret(e)
}

/// RST p: call one of the eight page-zero vectors.
pub(crate) fn rst(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let vector = u16::from(e.y()) * 8;
    call_to(e, vector)?;
    Ok(Flow::Continue)
}
