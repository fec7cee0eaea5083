//! Conditions that stop a step short of a normal completion.

use emu_core::MemoryError;
use thiserror::Error;

use crate::decode::Prefix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The fetched opcode has no handler in the selected table. PC and R
    /// have advanced past the fetched bytes; nothing else changed.
    #[error("unimplemented opcode {opcode:#04X} ({prefix}) at {pc:#06X}")]
    UnimplementedOpcode { prefix: Prefix, opcode: u8, pc: u16 },

    /// HALT executed, or the CPU is still halted. `pc` is the address after
    /// the HALT opcode.
    #[error("halted at {pc:#06X}")]
    HaltRequested { pc: u16 },

    /// A handler's memory write was rejected.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
