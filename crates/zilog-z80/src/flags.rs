//! Z80 flag register bits.

use crate::registers::Register8;

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - copy of bit 5 of result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - copy of bit 3 of result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

/// A named bit of F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Carry,
    Subtract,
    ParityOverflow,
    /// Undocumented bit 3.
    X,
    HalfCarry,
    /// Undocumented bit 5.
    Y,
    Zero,
    Sign,
}

impl Flag {
    pub const ALL: [Self; 8] = [
        Self::Sign,
        Self::Zero,
        Self::Y,
        Self::HalfCarry,
        Self::X,
        Self::ParityOverflow,
        Self::Subtract,
        Self::Carry,
    ];

    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Self::Carry => CF,
            Self::Subtract => NF,
            Self::ParityOverflow => PF,
            Self::X => XF,
            Self::HalfCarry => HF,
            Self::Y => YF,
            Self::Zero => ZF,
            Self::Sign => SF,
        }
    }
}

/// Read-only interpretation of an F value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn get(self, flag: Flag) -> bool {
        self.0 & flag.mask() != 0
    }

    #[must_use]
    pub const fn carry(self) -> bool {
        self.get(Flag::Carry)
    }

    #[must_use]
    pub const fn zero(self) -> bool {
        self.get(Flag::Zero)
    }

    #[must_use]
    pub const fn sign(self) -> bool {
        self.get(Flag::Sign)
    }

    #[must_use]
    pub const fn parity(self) -> bool {
        self.get(Flag::ParityOverflow)
    }
}

/// Bit-level write access to F, borrowed from the active AF pair.
///
/// Setting or clearing one flag leaves the other seven bits alone.
#[derive(Debug)]
pub struct FlagsMut<'a>(&'a mut Register8);

impl<'a> FlagsMut<'a> {
    pub(crate) fn new(f: &'a mut Register8) -> Self {
        Self(f)
    }

    #[must_use]
    pub fn get(&self, flag: Flag) -> bool {
        self.0.get() & flag.mask() != 0
    }

    pub fn set(&mut self, flag: Flag, on: bool) {
        let bits = self.0.get();
        self.0.set(if on { bits | flag.mask() } else { bits & !flag.mask() });
    }

    /// Replace all eight bits.
    pub fn assign(&mut self, bits: u8) {
        self.0.set(bits);
    }

    /// Replace the bits in `mask` with those of `bits`, keeping the rest.
    pub fn merge(&mut self, mask: u8, bits: u8) {
        let kept = self.0.get() & !mask;
        self.0.set(kept | (bits & mask));
    }
}

/// Compute parity of a byte (true if even number of 1 bits).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// Build flags byte for common arithmetic results.
#[must_use]
pub const fn sz53(value: u8) -> u8 {
    let mut f = 0;
    if value == 0 {
        f |= ZF;
    }
    f |= value & (SF | YF | XF);
    f
}

/// Build flags byte with parity.
#[must_use]
pub const fn sz53p(value: u8) -> u8 {
    let mut f = sz53(value);
    if parity(value) {
        f |= PF;
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_one_flag_keeps_the_rest() {
        let mut f = Register8::new(ZF | NF);
        FlagsMut::new(&mut f).set(Flag::Carry, true);
        assert_eq!(f.get(), ZF | NF | CF);
    }

    #[test]
    fn clearing_one_flag_keeps_the_rest() {
        let mut f = Register8::new(0xFF);
        FlagsMut::new(&mut f).set(Flag::HalfCarry, false);
        assert_eq!(f.get(), 0xFF & !HF);
    }

    #[test]
    fn every_flag_round_trips() {
        for flag in Flag::ALL {
            let mut f = Register8::new(0);
            let mut view = FlagsMut::new(&mut f);
            view.set(flag, true);
            assert!(view.get(flag));
            assert_eq!(f.get(), flag.mask(), "{flag:?}");
        }
    }

    #[test]
    fn masks_are_distinct_bits() {
        let all = Flag::ALL.iter().fold(0u8, |acc, f| {
            assert_eq!(acc & f.mask(), 0);
            acc | f.mask()
        });
        assert_eq!(all, 0xFF);
    }

    #[test]
    fn merge_only_touches_masked_bits() {
        let mut f = Register8::new(SF | CF);
        FlagsMut::new(&mut f).merge(ZF | CF, ZF);
        assert_eq!(f.get(), SF | ZF);
    }

    #[test]
    fn sz53p_values() {
        assert_eq!(sz53p(0), ZF | PF);
        assert_eq!(sz53p(0x80), SF);
        assert_eq!(sz53p(0x28), YF | XF | PF);
        assert!(Flags::new(sz53p(0x03)).parity());
    }
}
