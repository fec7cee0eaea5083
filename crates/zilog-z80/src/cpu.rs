//! Z80 execution engine.
//!
//! `step()` runs exactly one instruction: it walks the prefix bytes, looks
//! the opcode up in the table for that prefix, fetches the operand bytes the
//! descriptor asks for, runs the handler and reports the cost to the clock.

use emu_core::{Clock, Cpu, Cycles, Memory, Observable, Value};

use crate::decode::{self, BranchTiming, Fetch, Fetched, Flow, Operand};
use crate::error::CpuError;
use crate::flags::Flag;
use crate::ops::Exec;
use crate::registers::{Reg16, Registers};

/// T-states burned by each step while halted.
const HALT_CYCLES: u64 = 4;

/// What the run loop does when the CPU halts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HaltPolicy {
    /// Return from `run()` with [`RunExit::Halted`](crate::RunExit::Halted).
    #[default]
    Stop,
    /// Keep stepping the halted CPU until a stop is requested.
    Spin,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CpuConfig {
    pub halt: HaltPolicy,
    pub branch_timing: BranchTiming,
}

/// The Z80 CPU.
#[derive(Debug, Clone, Default)]
pub struct Z80 {
    regs: Registers,
    config: CpuConfig,
    /// Instructions completed since the last reset.
    instructions: u64,
}

impl Z80 {
    /// A CPU in its cold-boot state with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            regs: Registers::new(),
            config,
            instructions: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> CpuConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CpuConfig) {
        self.config = config;
    }

    /// Instructions completed since the last reset. HALT counts once; the
    /// steps spent halted and steps that fail do not.
    #[must_use]
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Mutable access to the register file, for loaders and tests.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// Execute one instruction.
    ///
    /// Returns the cost reported to `clock`. HALT, and every step taken
    /// while halted, report their cost and then return
    /// [`CpuError::HaltRequested`]. An unimplemented opcode reports nothing.
    pub fn step<M: Memory, C: Clock>(
        &mut self,
        memory: &mut M,
        clock: &mut C,
    ) -> Result<Cycles, CpuError> {
        if self.regs.halted {
            self.regs.increment_refresh();
            clock.increment(Cycles::new(HALT_CYCLES));
            return Err(CpuError::HaltRequested { pc: self.regs.pc() });
        }

        let start = self.regs.pc();
        let fetched = decode::fetch(|offset| memory.read(start.wrapping_add(offset)));
        let (prefix, opcode, displacement) = match fetched {
            Fetch::IgnoredPrefix => {
                self.regs.set_pc(start.wrapping_add(1));
                self.regs.increment_refresh();
                let cost = Cycles::new(decode::IGNORED_PREFIX_CYCLES);
                clock.increment(cost);
                self.instructions += 1;
                log::trace!("{start:04X}  ignored prefix {:02X}  {cost}", memory.read(start));
                return Ok(cost);
            }
            Fetch::Instruction {
                prefix,
                opcode,
                displacement,
                length,
                m1,
            } => {
                self.regs.set_pc(start.wrapping_add(u16::from(length)));
                for _ in 0..m1 {
                    self.regs.increment_refresh();
                }
                (prefix, opcode, displacement)
            }
        };

        let Some(desc) = decode::descriptor(prefix, opcode) else {
            log::warn!("unimplemented opcode {opcode:02X} ({prefix}) at {start:04X}");
            return Err(CpuError::UnimplementedOpcode {
                prefix,
                opcode,
                pc: start,
            });
        };

        let operand = match displacement {
            Some(d) => Fetched::Displacement(d),
            None => self.fetch_operand(memory, desc.operand),
        };
        let mut exec = Exec {
            regs: &mut self.regs,
            memory,
            opcode,
            index: prefix.index(),
            operand,
        };
        let flow = (desc.handler)(&mut exec)?;

        let cost = desc.cost.resolve(flow, self.config.branch_timing);
        clock.increment(cost);
        self.instructions += 1;
        log::trace!("{start:04X}  {prefix} {opcode:02X}  {:<14} {cost}", desc.mnemonic);

        if flow == Flow::Halt {
            self.regs.halted = true;
            return Err(CpuError::HaltRequested { pc: self.regs.pc() });
        }
        Ok(cost)
    }

    fn next_byte<M: Memory>(&mut self, memory: &M) -> u8 {
        let pc = self.regs.pc();
        self.regs.set_pc(pc.wrapping_add(1));
        memory.read(pc)
    }

    fn fetch_operand<M: Memory>(&mut self, memory: &M, operand: Operand) -> Fetched {
        match operand {
            Operand::None => Fetched::None,
            Operand::Byte => Fetched::Byte(self.next_byte(memory)),
            Operand::Word => {
                let lo = self.next_byte(memory);
                let hi = self.next_byte(memory);
                Fetched::Word(u16::from_le_bytes([lo, hi]))
            }
            Operand::Displacement => Fetched::Displacement(self.next_byte(memory) as i8),
            Operand::DisplacementByte => {
                let d = self.next_byte(memory) as i8;
                Fetched::DisplacementByte(d, self.next_byte(memory))
            }
        }
    }
}

impl Cpu for Z80 {
    type Registers = Registers;
    type Error = CpuError;

    fn step<M: Memory, C: Clock>(&mut self, memory: &mut M, clock: &mut C) -> Result<Cycles, CpuError> {
        Z80::step(self, memory, clock)
    }

    fn pc(&self) -> u16 {
        self.regs.pc()
    }

    fn registers(&self) -> &Registers {
        &self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn reset(&mut self) {
        self.regs.reset();
        self.instructions = 0;
    }
}

const QUERY_PATHS: &[&str] = &[
    "a", "f", "b", "c", "d", "e", "h", "l", "af", "bc", "de", "hl", "af'", "bc'", "de'", "hl'",
    "ix", "iy", "sp", "pc", "i", "r", "flags.s", "flags.z", "flags.y", "flags.h", "flags.x",
    "flags.p", "flags.n", "flags.c", "iff1", "iff2", "im", "halted", "bank.af", "bank.general",
    "instructions",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        let flag = |flag: Flag| -> Option<Value> { Some(regs.flags().get(flag).into()) };
        let shadow = |reg: Reg16| -> Option<Value> { regs.shadow(reg).map(|pair| pair.get().into()) };
        match path {
            "a" => Some(regs.a().into()),
            "f" => Some(regs.f().into()),
            "b" => Some(regs.b().into()),
            "c" => Some(regs.c().into()),
            "d" => Some(regs.d().into()),
            "e" => Some(regs.e().into()),
            "h" => Some(regs.h().into()),
            "l" => Some(regs.l().into()),

            "af" => Some(regs.af().into()),
            "bc" => Some(regs.bc().into()),
            "de" => Some(regs.de().into()),
            "hl" => Some(regs.hl().into()),

            "af'" => shadow(Reg16::Af),
            "bc'" => shadow(Reg16::Bc),
            "de'" => shadow(Reg16::De),
            "hl'" => shadow(Reg16::Hl),

            "ix" => Some(regs.ix().into()),
            "iy" => Some(regs.iy().into()),
            "sp" => Some(regs.sp().into()),
            "pc" => Some(regs.pc().into()),
            "i" => Some(regs.i().into()),
            "r" => Some(regs.r().into()),

            "flags.s" => flag(Flag::Sign),
            "flags.z" => flag(Flag::Zero),
            "flags.y" => flag(Flag::Y),
            "flags.h" => flag(Flag::HalfCarry),
            "flags.x" => flag(Flag::X),
            "flags.p" => flag(Flag::ParityOverflow),
            "flags.n" => flag(Flag::Subtract),
            "flags.c" => flag(Flag::Carry),

            "iff1" => Some(regs.iff1.into()),
            "iff2" => Some(regs.iff2.into()),
            "im" => Some(regs.im.into()),
            "halted" => Some(regs.halted.into()),

            // Which physical bank the conventional names point at.
            "bank.af" => Some(regs.accumulator_bank_swapped().into()),
            "bank.general" => Some(regs.general_bank_swapped().into()),

            "instructions" => Some(self.instructions.into()),

            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
