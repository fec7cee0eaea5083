//! The unit of emulated time.

use std::fmt;

/// Sub-cycle resolution of [`Cycles`].
const SCALE: u64 = 100;

/// A count of CPU clock cycles (T-states).
///
/// Stored as fixed-point hundredths so that averaged costs such as 10.5
/// accumulate exactly over millions of instructions. Whole-cycle costs are
/// the common case and never touch the fractional part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cycles(u64);

impl Cycles {
    pub const ZERO: Self = Self(0);

    /// Whole cycles.
    #[must_use]
    pub const fn new(whole: u64) -> Self {
        Self(whole * SCALE)
    }

    #[must_use]
    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    /// Exact midpoint of two costs. Odd hundredths round down, which cannot
    /// happen for whole-cycle inputs.
    #[must_use]
    pub const fn average(a: Self, b: Self) -> Self {
        Self((a.0 + b.0) / 2)
    }

    /// Whole cycles, fractional part discarded.
    #[must_use]
    pub const fn whole(self) -> u64 {
        self.0 / SCALE
    }

    #[must_use]
    pub const fn hundredths(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_whole(self) -> bool {
        self.0 % SCALE == 0
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl core::ops::Add for Cycles {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Cycles {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::ops::Sub for Cycles {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl core::iter::Sum for Cycles {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, c| acc + c)
    }
}

impl fmt::Display for Cycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.whole())
        } else {
            write!(f, "{}.{:02}", self.whole(), self.0 % SCALE)
        }
    }
}
