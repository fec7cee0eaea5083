//! Instruction-stepped Zilog Z80 CPU emulator.
//!
//! Each call to [`Z80::step`] runs one whole instruction against a borrowed
//! [`emu_core::Memory`] and reports its cost to a borrowed
//! [`emu_core::Clock`]. Decoding is table-driven: every prefix has a
//! 256-entry table of [`Descriptor`]s, and an empty slot surfaces as
//! [`CpuError::UnimplementedOpcode`] instead of a panic.
//!
//! [`Machine`] binds a CPU to its memory and clock for hosts that want a run
//! loop, and [`Worker`] runs that loop on a background thread.

pub mod alu;
mod cpu;
mod decode;
mod error;
pub mod flags;
mod machine;
mod ops;
mod registers;

pub use cpu::{CpuConfig, HaltPolicy, Z80};
pub use decode::{
    BranchTiming, CycleCost, Decoded, Descriptor, Fetched, Flow, Handler, Index, Operand, Prefix,
    decode, descriptor, implemented_count, is_implemented,
};
pub use error::CpuError;
pub use flags::{CF, Flag, Flags, FlagsMut, HF, NF, PF, SF, XF, YF, ZF};
pub use machine::{Machine, RunExit, StopSignal, Worker};
pub use ops::Exec;
pub use registers::{Reg8, Reg16, Register8, RegisterPair, Registers, Snapshot};
