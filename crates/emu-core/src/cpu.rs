//! CPU core trait.

use crate::{Clock, Cycles, Memory};

/// An instruction-stepped CPU core.
///
/// The memory and clock are passed in, not owned, so a host can share them
/// with other components and swap them out between steps. A step always
/// runs a whole instruction; there is no mid-instruction state to observe.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Conditions that end a step without completing an instruction.
    type Error;

    /// Execute one instruction and report its cost to `clock`.
    ///
    /// Returns the cost that was reported.
    fn step<M: Memory, C: Clock>(&mut self, memory: &mut M, clock: &mut C) -> Result<Cycles, Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns the live register file.
    fn registers(&self) -> &Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Reset the CPU to its cold-boot state.
    fn reset(&mut self);
}
