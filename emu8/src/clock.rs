//! CPU Clock.
use std::time::{Duration, Instant};

use crate::constants::*;

/// CPU clock frequency, in hertz (per second)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hz(pub u64);

impl Default for Hz {
    fn default() -> Self {
        Hz(DEFAULT_CLOCK_FREQUENCY)
    }
}

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Paces the calling thread so that each cycle takes one clock period.
///
/// The cycle is started with [`Clock::start`] before executing an
/// instruction, and [`Clock::wait`] sleeps away whatever remains of
/// the period afterwards.
pub(crate) struct Clock {
    started: Instant,
    period: Duration,
}

impl Clock {
    pub(crate) fn new(freq: Hz) -> Self {
        Self {
            started: Instant::now(),
            period: freq.into(),
        }
    }

    pub(crate) fn set_frequency(&mut self, freq: Hz) {
        self.period = freq.into();
    }

    /// Mark the beginning of a cycle.
    pub(crate) fn start(&mut self) {
        self.started = Instant::now();
    }

    /// Block the current thread for the remainder of the cycle.
    ///
    /// Returns immediately when the cycle has already overrun its period.
    pub(crate) fn wait(&self) {
        let elapsed = self.started.elapsed();
        if let Some(remaining) = self.period.checked_sub(elapsed) {
            // Thread sleep does not have enough resolution for a 2ms period.
            spin_sleep::sleep(remaining);
        }
    }
}

/// Divides the CPU clock down to the fixed timer frequency.
///
/// Counts executed instructions and signals a timer tick every
/// `clock / 60` of them, rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimerDivider {
    cycles: usize,
    ratio: usize,
}

impl TimerDivider {
    pub(crate) fn new(freq: Hz) -> Self {
        Self {
            cycles: 0,
            ratio: Self::ratio_of(freq),
        }
    }

    fn ratio_of(freq: Hz) -> usize {
        ((freq.0 / TIMER_FREQUENCY) as usize).max(1)
    }

    pub(crate) fn set_frequency(&mut self, freq: Hz) {
        self.ratio = Self::ratio_of(freq);
    }

    /// Number of instructions per timer tick.
    pub(crate) fn ratio(&self) -> usize {
        self.ratio
    }

    /// Instructions counted since the last timer tick.
    pub(crate) fn cycles(&self) -> usize {
        self.cycles
    }

    pub(crate) fn set_cycles(&mut self, cycles: usize) {
        self.cycles = cycles;
    }

    pub(crate) fn reset(&mut self) {
        self.cycles = 0;
    }

    /// Count one executed instruction. Returns `true` when the timers
    /// are due to count down.
    pub(crate) fn tick(&mut self) -> bool {
        self.cycles += 1;
        if self.cycles >= self.ratio {
            self.cycles = 0;
            true
        } else {
            false
        }
    }
}
