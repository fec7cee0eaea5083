//! Block transfer and search (LDI, CPI and their repeating forms).
//!
//! A repeating form runs one iteration per step. While it has more to do it
//! rewinds PC onto its own ED prefix and reports a taken branch, so the
//! next step fetches it again.

use crate::alu;
use crate::decode::Flow;
use crate::error::CpuError;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};

use super::Exec;

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

fn step_pair(value: u16, direction: Direction) -> u16 {
    match direction {
        Direction::Up => value.wrapping_add(1),
        Direction::Down => value.wrapping_sub(1),
    }
}

/// One LDI/LDD iteration. Returns true while BC is non-zero.
fn transfer(e: &mut Exec<'_>, direction: Direction) -> Result<bool, CpuError> {
    let hl = e.regs.hl();
    let de = e.regs.de();
    let value = e.memory.read(hl);
    e.memory.write(de, value)?;
    e.regs.set_hl(step_pair(hl, direction));
    e.regs.set_de(step_pair(de, direction));
    let bc = e.regs.bc().wrapping_sub(1);
    e.regs.set_bc(bc);

    let n = value.wrapping_add(e.regs.a());
    let mut flags = (e.regs.f() & (SF | ZF | CF)) | (n & XF) | ((n << 4) & YF);
    if bc != 0 {
        flags |= PF;
    }
    e.regs.set_f(flags);
    Ok(bc != 0)
}

/// One CPI/CPD iteration. Returns (BC non-zero, match found).
fn compare(e: &mut Exec<'_>, direction: Direction) -> (bool, bool) {
    let hl = e.regs.hl();
    let a = e.regs.a();
    let value = e.memory.read(hl);
    e.regs.set_hl(step_pair(hl, direction));
    let bc = e.regs.bc().wrapping_sub(1);
    e.regs.set_bc(bc);

    let diff = alu::cp8(a, value);
    let half = diff.flags & HF;
    let n = a.wrapping_sub(value).wrapping_sub(u8::from(half != 0));
    let mut flags = (diff.flags & (SF | ZF | HF)) | NF | (e.regs.f() & CF) | (n & XF) | ((n << 4) & YF);
    if bc != 0 {
        flags |= PF;
    }
    e.regs.set_f(flags);
    (bc != 0, a == value)
}

fn repeat(e: &mut Exec<'_>, again: bool) -> Flow {
    if again {
        let pc = e.regs.pc().wrapping_sub(2);
        e.regs.set_pc(pc);
    }
    Flow::Branch(again)
}

pub(crate) fn ldi(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    transfer(e, Direction::Up)?;
    Ok(Flow::Continue)
}

pub(crate) fn ldd(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    transfer(e, Direction::Down)?;
    Ok(Flow::Continue)
}

pub(crate) fn ldir(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let more = transfer(e, Direction::Up)?;
    Ok(repeat(e, more))
}

pub(crate) fn lddr(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let more = transfer(e, Direction::Down)?;
    Ok(repeat(e, more))
}

pub(crate) fn cpi(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    compare(e, Direction::Up);
    Ok(Flow::Continue)
}

pub(crate) fn cpd(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    compare(e, Direction::Down);
    Ok(Flow::Continue)
}

pub(crate) fn cpir(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let (more, found) = compare(e, Direction::Up);
    Ok(repeat(e, more && !found))
}

pub(crate) fn cpdr(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let (more, found) = compare(e, Direction::Down);
    Ok(repeat(e, more && !found))
}
