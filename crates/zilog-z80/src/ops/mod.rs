//! Instruction handlers, grouped by family.
//!
//! Each handler sees one [`Exec`]: the register file, memory, the opcode
//! byte and its fetched operand. Handlers read opcode fields instead of
//! being specialised per register, so one function covers a whole row of
//! the table.

pub(crate) mod arith;
pub(crate) mod bits;
pub(crate) mod block;
pub(crate) mod control;
pub(crate) mod exchange;
pub(crate) mod load;
pub(crate) mod stack;

use emu_core::{Memory, MemoryError};

use crate::decode::{Fetched, Index};
use crate::error::CpuError;
use crate::flags::{CF, PF, SF, ZF};
use crate::registers::{Reg8, Reg16, Registers};

/// Execution context for one instruction.
pub struct Exec<'a> {
    pub regs: &'a mut Registers,
    pub memory: &'a mut dyn Memory,
    pub opcode: u8,
    pub index: Index,
    pub operand: Fetched,
}

impl Exec<'_> {
    // === Opcode fields ===

    pub(crate) fn y(&self) -> u8 {
        (self.opcode >> 3) & 7
    }

    pub(crate) fn z(&self) -> u8 {
        self.opcode & 7
    }

    pub(crate) fn p(&self) -> u8 {
        (self.opcode >> 4) & 3
    }

    // === Operands ===

    pub(crate) fn byte(&self) -> u8 {
        match self.operand {
            Fetched::Byte(n) | Fetched::DisplacementByte(_, n) => n,
            _ => 0,
        }
    }

    pub(crate) fn word(&self) -> u16 {
        match self.operand {
            Fetched::Word(nn) => nn,
            _ => 0,
        }
    }

    pub(crate) fn displacement(&self) -> i8 {
        match self.operand {
            Fetched::Displacement(d) | Fetched::DisplacementByte(d, _) => d,
            _ => 0,
        }
    }

    // === Registers ===

    /// HL, IX or IY, whichever the prefix selected.
    pub(crate) fn index_pair(&self) -> Reg16 {
        self.index.pair()
    }

    /// Address of the `(HL)` operand, or `(IX+d)` under an index prefix.
    pub(crate) fn indirect_address(&self) -> u16 {
        let base = self.regs.get16(self.index_pair());
        match self.index {
            Index::Hl => base,
            Index::Ix | Index::Iy => base.wrapping_add_signed(i16::from(self.displacement())),
        }
    }

    /// 16-bit register from the `p` field: BC, DE, HL/IX/IY, SP.
    pub(crate) fn rp(&self, p: u8) -> Reg16 {
        match p & 3 {
            0 => Reg16::Bc,
            1 => Reg16::De,
            2 => self.index_pair(),
            _ => Reg16::Sp,
        }
    }

    /// As [`Exec::rp`] but with AF in place of SP, for PUSH and POP.
    pub(crate) fn rp2(&self, p: u8) -> Reg16 {
        match p & 3 {
            3 => Reg16::Af,
            _ => self.rp(p),
        }
    }

    /// 8-bit operand by register code; code 6 reads memory.
    pub(crate) fn operand8(&self, code: u8) -> u8 {
        match Reg8::from_code(code) {
            Some(reg) => self.regs.get8(reg),
            None => self.memory.read(self.indirect_address()),
        }
    }

    /// Store to a register code; code 6 writes memory.
    pub(crate) fn store8(&mut self, code: u8, value: u8) -> Result<(), CpuError> {
        match Reg8::from_code(code) {
            Some(reg) => self.regs.set8(reg, value),
            None => {
                let addr = self.indirect_address();
                self.memory.write(addr, value)?;
            }
        }
        Ok(())
    }

    /// Branch condition from a 3-bit field: NZ Z NC C PO PE P M.
    pub(crate) fn condition(&self, cc: u8) -> bool {
        let f = self.regs.f();
        let (mask, want_set) = match cc & 7 {
            0 => (ZF, false),
            1 => (ZF, true),
            2 => (CF, false),
            3 => (CF, true),
            4 => (PF, false),
            5 => (PF, true),
            6 => (SF, false),
            _ => (SF, true),
        };
        (f & mask != 0) == want_set
    }

    // === Stack ===

    /// Push high byte then low byte, so the word sits little-endian at SP.
    ///
    /// Both target bytes are checked before either is written.
    pub(crate) fn push(&mut self, value: u16) -> Result<(), CpuError> {
        let [lo, hi] = value.to_le_bytes();
        let hi_address = self.regs.sp().wrapping_sub(1);
        let lo_address = hi_address.wrapping_sub(1);
        let size = self.memory.size();
        for address in [hi_address, lo_address] {
            if usize::from(address) >= size {
                return Err(MemoryError::AddressOutOfRange { address, size }.into());
            }
        }
        self.memory.write(hi_address, hi)?;
        self.memory.write(lo_address, lo)?;
        self.regs.set_sp(lo_address);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> u16 {
        let sp = self.regs.sp();
        let lo = self.memory.read(sp);
        let hi = self.memory.read(sp.wrapping_add(1));
        self.regs.set_sp(sp.wrapping_add(2));
        u16::from_le_bytes([lo, hi])
    }
}
