//! Opcode tables and instruction fetch.
//!
//! Every prefix selects a 256-entry table of [`Descriptor`]s. A descriptor
//! names the handler, the operand bytes that follow the opcode and the cost
//! in T-states. An empty slot is an unimplemented opcode.
//!
//! The tables are built once, on first use, from the x/y/z/p/q fields of
//! the opcode byte:
//!
//! ```text
//!   7 6 5 4 3 2 1 0
//!   x x y y y z z z      p = y >> 1, q = y & 1
//! ```

mod tables;

use std::fmt;

use emu_core::{Cycles, Memory};

use crate::error::CpuError;
use crate::ops::Exec;
use crate::registers::Reg16;

/// Which table an opcode was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prefix {
    None,
    Cb,
    Dd,
    Ed,
    Fd,
    DdCb,
    FdCb,
}

impl Prefix {
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Cb,
        Self::Dd,
        Self::Ed,
        Self::Fd,
        Self::DdCb,
        Self::FdCb,
    ];

    /// The register that stands in for HL under this prefix.
    #[must_use]
    pub const fn index(self) -> Index {
        match self {
            Self::Dd | Self::DdCb => Index::Ix,
            Self::Fd | Self::FdCb => Index::Iy,
            Self::None | Self::Cb | Self::Ed => Index::Hl,
        }
    }

    /// Number of prefix bytes ahead of the opcode.
    #[must_use]
    pub const fn len(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Cb | Self::Dd | Self::Ed | Self::Fd => 1,
            Self::DdCb | Self::FdCb => 2,
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "unprefixed",
            Self::Cb => "CB",
            Self::Dd => "DD",
            Self::Ed => "ED",
            Self::Fd => "FD",
            Self::DdCb => "DD CB",
            Self::FdCb => "FD CB",
        })
    }
}

/// HL, or the index register replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    Hl,
    Ix,
    Iy,
}

impl Index {
    #[must_use]
    pub const fn pair(self) -> Reg16 {
        match self {
            Self::Hl => Reg16::Hl,
            Self::Ix => Reg16::Ix,
            Self::Iy => Reg16::Iy,
        }
    }
}

/// Bytes an instruction reads after its opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    None,
    /// One immediate byte.
    Byte,
    /// A little-endian immediate word.
    Word,
    /// A signed displacement, for relative jumps and `(IX+d)`.
    Displacement,
    /// `(IX+d),n`: displacement then immediate.
    DisplacementByte,
}

impl Operand {
    #[must_use]
    pub const fn len(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Byte | Self::Displacement => 1,
            Self::Word | Self::DisplacementByte => 2,
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Operand bytes as fetched, handed to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    None,
    Byte(u8),
    Word(u16),
    Displacement(i8),
    DisplacementByte(i8, u8),
}

/// What a handler did to control flow. Conditional costs key off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A conditional instruction; `true` if the branch (or repeat) was taken.
    Branch(bool),
    Halt,
}

/// How two-way instruction costs are charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchTiming {
    /// Charge the taken or not-taken cost actually incurred.
    #[default]
    Exact,
    /// Charge the mean of both costs whichever way the branch goes, so
    /// `DJNZ` costs 10.5.
    Averaged,
}

/// T-state cost of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleCost {
    Fixed(u8),
    Conditional { taken: u8, not_taken: u8 },
}

impl CycleCost {
    /// Cost of one execution that ended with `flow`.
    #[must_use]
    pub fn resolve(self, flow: Flow, timing: BranchTiming) -> Cycles {
        match self {
            Self::Fixed(t) => Cycles::new(u64::from(t)),
            Self::Conditional { taken, not_taken } => match (timing, flow) {
                (BranchTiming::Averaged, _) => {
                    Cycles::average(Cycles::new(u64::from(taken)), Cycles::new(u64::from(not_taken)))
                }
                (BranchTiming::Exact, Flow::Branch(true)) => Cycles::new(u64::from(taken)),
                (BranchTiming::Exact, _) => Cycles::new(u64::from(not_taken)),
            },
        }
    }
}

pub type Handler = fn(&mut Exec<'_>) -> Result<Flow, CpuError>;

/// One implemented opcode.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub mnemonic: &'static str,
    pub operand: Operand,
    pub cost: CycleCost,
    pub handler: Handler,
}

/// Look up the descriptor for `opcode` in the table for `prefix`.
#[must_use]
pub fn descriptor(prefix: Prefix, opcode: u8) -> Option<&'static Descriptor> {
    let tables = &*tables::TABLES;
    let table = match prefix {
        Prefix::None => &tables.main,
        Prefix::Cb => &tables.cb,
        Prefix::Ed => &tables.ed,
        Prefix::Dd | Prefix::Fd => &tables.index,
        Prefix::DdCb | Prefix::FdCb => &tables.index_cb,
    };
    table[usize::from(opcode)].as_ref()
}

#[must_use]
pub fn is_implemented(prefix: Prefix, opcode: u8) -> bool {
    descriptor(prefix, opcode).is_some()
}

/// Number of populated slots in the table for `prefix`.
#[must_use]
pub fn implemented_count(prefix: Prefix) -> usize {
    (0..=u8::MAX).filter(|&op| is_implemented(prefix, op)).count()
}

/// Result of walking the prefix bytes at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fetch {
    Instruction {
        prefix: Prefix,
        opcode: u8,
        /// The `d` byte of a DDCB/FDCB instruction, which sits before the
        /// opcode.
        displacement: Option<i8>,
        /// Bytes consumed, prefixes and opcode included.
        length: u8,
        /// Opcode fetch cycles, each of which bumps R.
        m1: u8,
    },
    /// A DD or FD followed by another prefix. The first one acts as a
    /// 4 T-state no-op and the next prefix starts a new instruction.
    IgnoredPrefix,
}

/// Cost of a DD/FD prefix that another prefix overrode.
pub(crate) const IGNORED_PREFIX_CYCLES: u64 = 4;

/// Walk the prefix bytes of the instruction whose first byte is `byte(0)`.
pub(crate) fn fetch(byte: impl Fn(u16) -> u8) -> Fetch {
    let first = byte(0);
    let plain = |prefix| Fetch::Instruction {
        prefix,
        opcode: byte(1),
        displacement: None,
        length: 2,
        m1: 2,
    };
    match first {
        0xCB => plain(Prefix::Cb),
        0xED => plain(Prefix::Ed),
        0xDD | 0xFD => {
            let (index, index_cb) = if first == 0xDD {
                (Prefix::Dd, Prefix::DdCb)
            } else {
                (Prefix::Fd, Prefix::FdCb)
            };
            match byte(1) {
                0xDD | 0xFD | 0xED => Fetch::IgnoredPrefix,
                0xCB => Fetch::Instruction {
                    prefix: index_cb,
                    opcode: byte(3),
                    displacement: Some(byte(2) as i8),
                    length: 4,
                    m1: 2,
                },
                _ => plain(index),
            }
        }
        opcode => Fetch::Instruction {
            prefix: Prefix::None,
            opcode,
            displacement: None,
            length: 1,
            m1: 1,
        },
    }
}

/// A decoded instruction, for listings and debuggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub prefix: Prefix,
    pub opcode: u8,
    pub mnemonic: String,
    /// Total length in bytes, operands included.
    pub length: u8,
}

/// Decode the instruction at `addr` without executing it.
///
/// Returns `None` for an unimplemented opcode. An overridden DD/FD decodes
/// as a one-byte `NOP*`.
pub fn decode<M: Memory + ?Sized>(memory: &M, addr: u16) -> Option<Decoded> {
    match fetch(|offset| memory.read(addr.wrapping_add(offset))) {
        Fetch::IgnoredPrefix => Some(Decoded {
            prefix: Prefix::None,
            opcode: memory.read(addr),
            mnemonic: "NOP*".to_owned(),
            length: 1,
        }),
        Fetch::Instruction {
            prefix,
            opcode,
            length,
            ..
        } => {
            let desc = descriptor(prefix, opcode)?;
            let mnemonic = match prefix.index() {
                Index::Iy => desc.mnemonic.replace("IX", "IY"),
                Index::Hl | Index::Ix => desc.mnemonic.to_owned(),
            };
            // DDCB opcodes carry their displacement inside the prefix run.
            let operand_len = if prefix.len() == 2 { 0 } else { desc.operand.len() };
            Some(Decoded {
                prefix,
                opcode,
                mnemonic,
                length: length + operand_len,
            })
        }
    }
}
