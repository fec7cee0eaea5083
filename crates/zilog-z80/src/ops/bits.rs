//! Rotates, shifts and single-bit operations (the CB and DDCB tables).

use crate::alu;
use crate::decode::Flow;
use crate::error::CpuError;
use crate::flags::{CF, sz53p};

use super::Exec;

/// RLCA / RRCA / RLA / RRA.
pub(crate) fn rotate_acc(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let result = alu::rotate_a(e.y(), e.regs.a(), e.regs.f());
    e.regs.set_a(result.value);
    e.regs.set_f(result.flags);
    Ok(Flow::Continue)
}

/// RLC RRC RL RR SLA SRA SLL SRL, selected by `y`.
pub(crate) fn shift(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let result = alu::shift8(e.y(), e.operand8(e.z()), e.regs.flags().carry());
    e.store8(e.z(), result.value)?;
    e.regs.set_f(result.flags);
    Ok(Flow::Continue)
}

pub(crate) fn bit(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let flags = alu::bit(e.y(), e.operand8(e.z()), e.regs.f());
    e.regs.set_f(flags);
    Ok(Flow::Continue)
}

pub(crate) fn res(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.operand8(e.z()) & !(1 << e.y());
    e.store8(e.z(), value)?;
    Ok(Flow::Continue)
}

pub(crate) fn set(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let value = e.operand8(e.z()) | (1 << e.y());
    e.store8(e.z(), value)?;
    Ok(Flow::Continue)
}

/// RLD: rotate the low nibble of A and the byte at (HL) left by a nibble.
pub(crate) fn rld(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let addr = e.regs.hl();
    let m = e.memory.read(addr);
    let a = e.regs.a();
    e.memory.write(addr, (m << 4) | (a & 0x0F))?;
    nibble_result(e, (a & 0xF0) | (m >> 4));
    Ok(Flow::Continue)
}

/// RRD: the same rotation to the right.
pub(crate) fn rrd(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let addr = e.regs.hl();
    let m = e.memory.read(addr);
    let a = e.regs.a();
    e.memory.write(addr, (a << 4) | (m >> 4))?;
    nibble_result(e, (a & 0xF0) | (m & 0x0F));
    Ok(Flow::Continue)
}

fn nibble_result(e: &mut Exec<'_>, a: u8) {
    let carry = e.regs.f() & CF;
    e.regs.set_a(a);
    e.regs.set_f(sz53p(a) | carry);
}
