//! Z80 register file.
//!
//! A [`Register8`] is the only storage cell. A [`RegisterPair`] is two cells
//! read and written as one 16-bit value; there is no separate 16-bit store,
//! so a write through either view is visible through the other at once.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

use crate::flags::{Flags, FlagsMut};

/// One 8-bit register. All arithmetic wraps modulo 256.
///
/// Flags are never touched here; the instruction decides which flags an
/// operation affects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Register8(u8);

impl Register8 {
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn set(&mut self, value: u8) {
        self.0 = value;
    }

    pub fn add(&mut self, value: u8) {
        self.0 = self.0.wrapping_add(value);
    }

    pub fn sub(&mut self, value: u8) {
        self.0 = self.0.wrapping_sub(value);
    }

    pub fn increment(&mut self) {
        self.add(1);
    }

    pub fn decrement(&mut self) {
        self.sub(1);
    }
}

/// A 16-bit register built from two [`Register8`] halves.
///
/// `hi` is the architecturally upper byte (A, B, D, H, IXH...), `lo` the
/// lower (F, C, E, L, IXL...). All arithmetic wraps modulo 65536 and never
/// touches flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterPair {
    hi: Register8,
    lo: Register8,
}

impl RegisterPair {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self {
            hi: Register8((value >> 8) as u8),
            lo: Register8(value as u8),
        }
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        (self.hi.0 as u16) << 8 | self.lo.0 as u16
    }

    pub fn set(&mut self, value: u16) {
        *self = Self::new(value);
    }

    #[must_use]
    pub const fn hi(self) -> u8 {
        self.hi.0
    }

    #[must_use]
    pub const fn lo(self) -> u8 {
        self.lo.0
    }

    pub fn hi_mut(&mut self) -> &mut Register8 {
        &mut self.hi
    }

    pub fn lo_mut(&mut self) -> &mut Register8 {
        &mut self.lo
    }

    pub fn set_hi(&mut self, value: u8) {
        self.hi.set(value);
    }

    pub fn set_lo(&mut self, value: u8) {
        self.lo.set(value);
    }

    pub fn add(&mut self, value: u16) {
        self.set(self.get().wrapping_add(value));
    }

    pub fn sub(&mut self, value: u16) {
        self.set(self.get().wrapping_sub(value));
    }

    pub fn add_byte(&mut self, value: u8) {
        self.add(u16::from(value));
    }

    pub fn sub_byte(&mut self, value: u8) {
        self.sub(u16::from(value));
    }

    /// Add a signed displacement, as relative jumps and `(IX+d)` do.
    pub fn offset(&mut self, displacement: i8) {
        self.set(self.get().wrapping_add_signed(i16::from(displacement)));
    }

    pub fn increment(&mut self) {
        self.add(1);
    }

    pub fn decrement(&mut self) {
        self.sub(1);
    }
}

/// 8-bit register names, including the undocumented index halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    Ixh,
    Ixl,
    Iyh,
    Iyl,
    I,
    R,
}

impl Reg8 {
    /// Register selected by a 3-bit opcode field. Code 6 is the memory
    /// operand and has no register.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code & 7 {
            0 => Some(Self::B),
            1 => Some(Self::C),
            2 => Some(Self::D),
            3 => Some(Self::E),
            4 => Some(Self::H),
            5 => Some(Self::L),
            7 => Some(Self::A),
            _ => None,
        }
    }
}

/// 16-bit register names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg16 {
    Af,
    Bc,
    De,
    Hl,
    Ix,
    Iy,
    Sp,
    Pc,
}

/// The BC/DE/HL half of a register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GeneralBank {
    bc: RegisterPair,
    de: RegisterPair,
    hl: RegisterPair,
}

impl GeneralBank {
    const RESET: Self = Self {
        bc: RegisterPair::new(0xFFFF),
        de: RegisterPair::new(0xFFFF),
        hl: RegisterPair::new(0xFFFF),
    };
}

/// Complete Z80 processor state.
///
/// Both register banks exist as physical storage. Two selectors decide which
/// physical AF and which physical BC/DE/HL the conventional names resolve
/// to, so `EX AF,AF'` and `EXX` flip a selector and never copy a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    af: [RegisterPair; 2],
    general: [GeneralBank; 2],
    af_bank: usize,
    general_bank: usize,
    ix: RegisterPair,
    iy: RegisterPair,
    sp: RegisterPair,
    pc: RegisterPair,
    i: Register8,
    r: Register8,
    /// Interrupt enable flip-flops.
    pub iff1: bool,
    pub iff2: bool,
    /// Interrupt mode (0, 1 or 2).
    pub im: u8,
    /// Set by HALT until reset.
    pub halted: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Cold-boot state: every pair all ones, PC zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            af: [RegisterPair::new(0xFFFF); 2],
            general: [GeneralBank::RESET; 2],
            af_bank: 0,
            general_bank: 0,
            ix: RegisterPair::new(0xFFFF),
            iy: RegisterPair::new(0xFFFF),
            sp: RegisterPair::new(0xFFFF),
            pc: RegisterPair::new(0x0000),
            i: Register8::new(0),
            r: Register8::new(0),
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
        }
    }

    /// Return to the cold-boot state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // === Bank exchange ===

    /// `EX AF,AF'`.
    pub fn exchange_accumulator_bank(&mut self) {
        self.af_bank ^= 1;
    }

    /// `EXX`: swap BC, DE and HL with their shadows.
    pub fn exchange_general_bank(&mut self) {
        self.general_bank ^= 1;
    }

    /// Swap all four general-purpose pairs (AF, BC, DE, HL) at once.
    pub fn exchange_all_banks(&mut self) {
        self.af_bank ^= 1;
        self.general_bank ^= 1;
    }

    /// True when AF currently resolves to the shadow storage.
    #[must_use]
    pub const fn accumulator_bank_swapped(&self) -> bool {
        self.af_bank == 1
    }

    /// True when BC/DE/HL currently resolve to the shadow storage.
    #[must_use]
    pub const fn general_bank_swapped(&self) -> bool {
        self.general_bank == 1
    }

    // === Pair access ===

    #[must_use]
    pub fn pair(&self, reg: Reg16) -> RegisterPair {
        match reg {
            Reg16::Af => self.af[self.af_bank],
            Reg16::Bc => self.general[self.general_bank].bc,
            Reg16::De => self.general[self.general_bank].de,
            Reg16::Hl => self.general[self.general_bank].hl,
            Reg16::Ix => self.ix,
            Reg16::Iy => self.iy,
            Reg16::Sp => self.sp,
            Reg16::Pc => self.pc,
        }
    }

    pub fn pair_mut(&mut self, reg: Reg16) -> &mut RegisterPair {
        match reg {
            Reg16::Af => &mut self.af[self.af_bank],
            Reg16::Bc => &mut self.general[self.general_bank].bc,
            Reg16::De => &mut self.general[self.general_bank].de,
            Reg16::Hl => &mut self.general[self.general_bank].hl,
            Reg16::Ix => &mut self.ix,
            Reg16::Iy => &mut self.iy,
            Reg16::Sp => &mut self.sp,
            Reg16::Pc => &mut self.pc,
        }
    }

    #[must_use]
    pub fn get16(&self, reg: Reg16) -> u16 {
        self.pair(reg).get()
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        self.pair_mut(reg).set(value);
    }

    /// The shadow (inactive) copy of AF, BC, DE or HL.
    ///
    /// Returns `None` for registers that have no shadow.
    #[must_use]
    pub fn shadow(&self, reg: Reg16) -> Option<RegisterPair> {
        let bank = self.general_bank ^ 1;
        match reg {
            Reg16::Af => Some(self.af[self.af_bank ^ 1]),
            Reg16::Bc => Some(self.general[bank].bc),
            Reg16::De => Some(self.general[bank].de),
            Reg16::Hl => Some(self.general[bank].hl),
            _ => None,
        }
    }

    /// Write the shadow copy of AF, BC, DE or HL. Ignored for other pairs.
    pub fn set_shadow(&mut self, reg: Reg16, value: u16) {
        let bank = self.general_bank ^ 1;
        let pair = match reg {
            Reg16::Af => &mut self.af[self.af_bank ^ 1],
            Reg16::Bc => &mut self.general[bank].bc,
            Reg16::De => &mut self.general[bank].de,
            Reg16::Hl => &mut self.general[bank].hl,
            _ => return,
        };
        pair.set(value);
    }

    // === 8-bit access ===

    pub fn reg8_mut(&mut self, reg: Reg8) -> &mut Register8 {
        match reg {
            Reg8::A => self.pair_mut(Reg16::Af).hi_mut(),
            Reg8::F => self.pair_mut(Reg16::Af).lo_mut(),
            Reg8::B => self.pair_mut(Reg16::Bc).hi_mut(),
            Reg8::C => self.pair_mut(Reg16::Bc).lo_mut(),
            Reg8::D => self.pair_mut(Reg16::De).hi_mut(),
            Reg8::E => self.pair_mut(Reg16::De).lo_mut(),
            Reg8::H => self.pair_mut(Reg16::Hl).hi_mut(),
            Reg8::L => self.pair_mut(Reg16::Hl).lo_mut(),
            Reg8::Ixh => self.ix.hi_mut(),
            Reg8::Ixl => self.ix.lo_mut(),
            Reg8::Iyh => self.iy.hi_mut(),
            Reg8::Iyl => self.iy.lo_mut(),
            Reg8::I => &mut self.i,
            Reg8::R => &mut self.r,
        }
    }

    #[must_use]
    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.pair(Reg16::Af).hi(),
            Reg8::F => self.pair(Reg16::Af).lo(),
            Reg8::B => self.pair(Reg16::Bc).hi(),
            Reg8::C => self.pair(Reg16::Bc).lo(),
            Reg8::D => self.pair(Reg16::De).hi(),
            Reg8::E => self.pair(Reg16::De).lo(),
            Reg8::H => self.pair(Reg16::Hl).hi(),
            Reg8::L => self.pair(Reg16::Hl).lo(),
            Reg8::Ixh => self.ix.hi(),
            Reg8::Ixl => self.ix.lo(),
            Reg8::Iyh => self.iy.hi(),
            Reg8::Iyl => self.iy.lo(),
            Reg8::I => self.i.get(),
            Reg8::R => self.r.get(),
        }
    }

    pub fn set8(&mut self, reg: Reg8, value: u8) {
        self.reg8_mut(reg).set(value);
    }

    // === Flags ===

    /// Read-only view of F.
    #[must_use]
    pub fn flags(&self) -> Flags {
        Flags::new(self.get8(Reg8::F))
    }

    /// Bit-level write access to F.
    pub fn flags_mut(&mut self) -> FlagsMut<'_> {
        FlagsMut::new(self.reg8_mut(Reg8::F))
    }

    /// Bump the memory refresh counter. Only the low 7 bits count; bit 7
    /// keeps whatever `LD R,A` put there.
    pub fn increment_refresh(&mut self) {
        let r = self.r.get();
        self.r.set((r & 0x80) | (r.wrapping_add(1) & 0x7F));
    }

    // === Named shorthands ===

    #[must_use]
    pub fn a(&self) -> u8 {
        self.get8(Reg8::A)
    }

    pub fn set_a(&mut self, value: u8) {
        self.set8(Reg8::A, value);
    }

    #[must_use]
    pub fn f(&self) -> u8 {
        self.get8(Reg8::F)
    }

    pub fn set_f(&mut self, value: u8) {
        self.set8(Reg8::F, value);
    }

    #[must_use]
    pub fn b(&self) -> u8 {
        self.get8(Reg8::B)
    }

    pub fn set_b(&mut self, value: u8) {
        self.set8(Reg8::B, value);
    }

    #[must_use]
    pub fn c(&self) -> u8 {
        self.get8(Reg8::C)
    }

    pub fn set_c(&mut self, value: u8) {
        self.set8(Reg8::C, value);
    }

    #[must_use]
    pub fn d(&self) -> u8 {
        self.get8(Reg8::D)
    }

    pub fn set_d(&mut self, value: u8) {
        self.set8(Reg8::D, value);
    }

    #[must_use]
    pub fn e(&self) -> u8 {
        self.get8(Reg8::E)
    }

    pub fn set_e(&mut self, value: u8) {
        self.set8(Reg8::E, value);
    }

    #[must_use]
    pub fn h(&self) -> u8 {
        self.get8(Reg8::H)
    }

    pub fn set_h(&mut self, value: u8) {
        self.set8(Reg8::H, value);
    }

    #[must_use]
    pub fn l(&self) -> u8 {
        self.get8(Reg8::L)
    }

    pub fn set_l(&mut self, value: u8) {
        self.set8(Reg8::L, value);
    }

    #[must_use]
    pub fn i(&self) -> u8 {
        self.i.get()
    }

    pub fn set_i(&mut self, value: u8) {
        self.i.set(value);
    }

    #[must_use]
    pub fn r(&self) -> u8 {
        self.r.get()
    }

    pub fn set_r(&mut self, value: u8) {
        self.r.set(value);
    }

    #[must_use]
    pub fn af(&self) -> u16 {
        self.get16(Reg16::Af)
    }

    pub fn set_af(&mut self, value: u16) {
        self.set16(Reg16::Af, value);
    }

    #[must_use]
    pub fn bc(&self) -> u16 {
        self.get16(Reg16::Bc)
    }

    pub fn set_bc(&mut self, value: u16) {
        self.set16(Reg16::Bc, value);
    }

    #[must_use]
    pub fn de(&self) -> u16 {
        self.get16(Reg16::De)
    }

    pub fn set_de(&mut self, value: u16) {
        self.set16(Reg16::De, value);
    }

    #[must_use]
    pub fn hl(&self) -> u16 {
        self.get16(Reg16::Hl)
    }

    pub fn set_hl(&mut self, value: u16) {
        self.set16(Reg16::Hl, value);
    }

    #[must_use]
    pub fn ix(&self) -> u16 {
        self.ix.get()
    }

    pub fn set_ix(&mut self, value: u16) {
        self.ix.set(value);
    }

    #[must_use]
    pub fn iy(&self) -> u16 {
        self.iy.get()
    }

    pub fn set_iy(&mut self, value: u16) {
        self.iy.set(value);
    }

    #[must_use]
    pub fn sp(&self) -> u16 {
        self.sp.get()
    }

    pub fn set_sp(&mut self, value: u16) {
        self.sp.set(value);
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.pc.get()
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc.set(value);
    }

    /// Copy every register out by its conventional name.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let shadow = |reg| self.shadow(reg).map_or(0, RegisterPair::get);
        Snapshot {
            af: self.af(),
            bc: self.bc(),
            de: self.de(),
            hl: self.hl(),
            af_alt: shadow(Reg16::Af),
            bc_alt: shadow(Reg16::Bc),
            de_alt: shadow(Reg16::De),
            hl_alt: shadow(Reg16::Hl),
            ix: self.ix(),
            iy: self.iy(),
            sp: self.sp(),
            pc: self.pc(),
            i: self.i(),
            r: self.r(),
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
            halted: self.halted,
        }
    }
}

/// Register values by conventional name, for display and comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub af_alt: u16,
    pub bc_alt: u16,
    pub de_alt: u16,
    pub hl_alt: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
}
