use crate::decode::Flow;
use crate::error::CpuError;
use crate::registers::Reg16;

use super::Exec;

pub(crate) fn ex_af(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.regs.exchange_accumulator_bank();
    Ok(Flow::Continue)
}

/// EXX swaps BC, DE and HL with their shadows. AF stays put.
pub(crate) fn exx(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    e.regs.exchange_general_bank();
    Ok(Flow::Continue)
}

/// EX DE,HL ignores any index prefix.
pub(crate) fn ex_de_hl(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let de = e.regs.de();
    let hl = e.regs.hl();
    e.regs.set_de(hl);
    e.regs.set_hl(de);
    Ok(Flow::Continue)
}

/// EX (SP),HL / EX (SP),IX.
pub(crate) fn ex_sp_hl(e: &mut Exec<'_>) -> Result<Flow, CpuError> {
    let sp = e.regs.sp();
    let pair: Reg16 = e.index_pair();
    let stacked = e.memory.read_word(sp);
    e.memory.write_word(sp, e.regs.get16(pair))?;
    e.regs.set16(pair, stacked);
    Ok(Flow::Continue)
}
