//! Clock port and reference clocks.

use std::thread;
use std::time::{Duration, Instant};

use crate::Cycles;

/// Sink for elapsed CPU time.
///
/// The CPU reports the cost of every instruction here and never reads the
/// total back for its own decisions. Anything timing-related beyond
/// accumulation (pacing, scheduling peripherals) is the clock's business.
pub trait Clock {
    /// Account for `cycles` more cycles of execution.
    fn increment(&mut self, cycles: Cycles);

    /// Total cycles reported so far.
    fn elapsed(&self) -> Cycles;
}

/// Crystal frequency a clock is paced against.
#[derive(Debug, Clone, Copy)]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `3_500_000` for a 3.5 MHz Z80).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Wall-clock time that `cycles` take on real hardware.
    #[must_use]
    pub fn duration_of(&self, cycles: Cycles) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        // hundredths * 1e9 / (hz * 100), in u128 to keep long runs exact.
        let nanos = u128::from(cycles.hundredths()) * 1_000_000_000
            / (u128::from(self.frequency_hz) * 100);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Plain cycle accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleCounter {
    total: Cycles,
}

impl CycleCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self { total: Cycles::ZERO }
    }
}

impl Clock for CycleCounter {
    fn increment(&mut self, cycles: Cycles) {
        self.total += cycles;
    }

    fn elapsed(&self) -> Cycles {
        self.total
    }
}

/// Accumulator that holds emulation to real-time speed.
///
/// Whenever emulated time runs ahead of wall time by more than `slack`, the
/// calling thread sleeps until they line up again. Sleeping in batches keeps
/// the number of syscalls sane at MHz rates.
#[derive(Debug, Clone)]
pub struct PacedClock {
    master: MasterClock,
    total: Cycles,
    started: Option<Instant>,
    slack: Duration,
}

impl PacedClock {
    #[must_use]
    pub fn new(master: MasterClock) -> Self {
        Self {
            master,
            total: Cycles::ZERO,
            started: None,
            slack: Duration::from_millis(2),
        }
    }

    /// How far ahead of wall time emulation may run before sleeping.
    #[must_use]
    pub fn with_slack(mut self, slack: Duration) -> Self {
        self.slack = slack;
        self
    }

    #[must_use]
    pub const fn master(&self) -> MasterClock {
        self.master
    }
}

impl Clock for PacedClock {
    fn increment(&mut self, cycles: Cycles) {
        let started = *self.started.get_or_insert_with(Instant::now);
        self.total += cycles;

        let emulated = self.master.duration_of(self.total);
        let real = started.elapsed();
        if let Some(ahead) = emulated.checked_sub(real)
            && ahead > self.slack
        {
            thread::sleep(ahead);
        }
    }

    fn elapsed(&self) -> Cycles {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_accumulates_fractions() {
        let mut clock = CycleCounter::new();
        clock.increment(Cycles::new(4));
        clock.increment(Cycles::from_hundredths(1050));
        assert_eq!(clock.elapsed(), Cycles::from_hundredths(1450));
    }

    #[test]
    fn duration_at_3_5_mhz() {
        let master = MasterClock::new(3_500_000);
        assert_eq!(master.duration_of(Cycles::new(3_500_000)), Duration::from_secs(1));
        assert_eq!(master.duration_of(Cycles::new(35)), Duration::from_micros(10));
    }

    #[test]
    fn zero_frequency_never_paces() {
        let master = MasterClock::new(0);
        assert_eq!(master.duration_of(Cycles::new(1_000)), Duration::ZERO);
    }

    #[test]
    fn paced_clock_sleeps_to_real_time() {
        // 1 kHz: 20 cycles is 20 ms of emulated time.
        let mut clock = PacedClock::new(MasterClock::new(1_000)).with_slack(Duration::ZERO);
        let start = Instant::now();
        clock.increment(Cycles::new(20));
        assert!(start.elapsed() >= Duration::from_millis(19));
        assert_eq!(clock.elapsed(), Cycles::new(20));
    }

    #[test]
    fn fast_paced_clock_does_not_sleep() {
        let mut clock = PacedClock::new(MasterClock::new(u64::MAX / 1_000_000));
        let start = Instant::now();
        for _ in 0..1_000 {
            clock.increment(Cycles::new(4));
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Cycles::new(4_000));
    }
}
