//! Core contracts for instruction-level CPU emulation.
//!
//! A CPU core never owns its memory or its clock. It borrows a [`Memory`]
//! port for every access and reports the cost of each instruction to a
//! [`Clock`] port. Both ports are plain traits so hosts can plug in banked
//! memory, memory-mapped devices, or real-time pacing without the core
//! knowing.

mod clock;
mod cpu;
mod cycles;
mod memory;
mod observable;

pub use clock::{Clock, CycleCounter, MasterClock, PacedClock};
pub use cpu::Cpu;
pub use cycles::Cycles;
pub use memory::{Memory, MemoryError, Ram};
pub use observable::{Observable, Value};
