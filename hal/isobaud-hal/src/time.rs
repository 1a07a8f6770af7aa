//! Simulated time
//!
//! Durations are counted in simulator steps. One step is one picosecond,
//! which keeps every clock period of practical interest integral.

use core::ops::{Add, AddAssign, Div, Mul, Sub};

/// Number of simulator steps in one second (1 step = 1 ps)
pub const STEPS_PER_SECOND: u64 = 1_000_000_000_000;

/// Length of a span of simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duration {
    steps: u64,
}

impl Duration {
    /// Zero-length duration
    pub const ZERO: Self = Self { steps: 0 };

    /// Create a duration from a raw step count
    pub const fn from_steps(steps: u64) -> Self {
        Self { steps }
    }

    /// Create a duration from picoseconds
    pub const fn from_ps(ps: u64) -> Self {
        Self { steps: ps }
    }

    /// Create a duration from nanoseconds
    pub const fn from_ns(ns: u64) -> Self {
        Self { steps: ns * 1_000 }
    }

    /// Create a duration from microseconds
    pub const fn from_us(us: u64) -> Self {
        Self {
            steps: us * 1_000_000,
        }
    }

    /// Create a duration from milliseconds
    pub const fn from_ms(ms: u64) -> Self {
        Self {
            steps: ms * 1_000_000_000,
        }
    }

    /// Create a duration from whole seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            steps: secs * STEPS_PER_SECOND,
        }
    }

    /// Period of a frequency given in Hz, rounded down to a whole step
    ///
    /// Returns `None` for 0 Hz or for frequencies above one step per period.
    pub const fn from_hz(hz: u64) -> Option<Self> {
        if hz == 0 || hz > STEPS_PER_SECOND {
            return None;
        }
        Some(Self {
            steps: STEPS_PER_SECOND / hz,
        })
    }

    /// Raw step count
    pub const fn as_steps(&self) -> u64 {
        self.steps
    }

    /// Duration in whole nanoseconds (truncated)
    pub const fn as_ns(&self) -> u64 {
        self.steps / 1_000
    }

    /// Check for a zero-length duration
    pub const fn is_zero(&self) -> bool {
        self.steps == 0
    }

    /// Multiply, returning `None` on overflow
    pub const fn checked_mul(self, rhs: u64) -> Option<Self> {
        match self.steps.checked_mul(rhs) {
            Some(steps) => Some(Self { steps }),
            None => None,
        }
    }

    /// Add, returning `None` on overflow
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.steps.checked_add(rhs.steps) {
            Some(steps) => Some(Self { steps }),
            None => None,
        }
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration::from_steps(self.steps + rhs.steps)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.steps += rhs.steps;
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration::from_steps(self.steps - rhs.steps)
    }
}

impl Mul<u64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: u64) -> Duration {
        Duration::from_steps(self.steps * rhs)
    }
}

impl Div<u64> for Duration {
    type Output = Duration;

    fn div(self, rhs: u64) -> Duration {
        Duration::from_steps(self.steps / rhs)
    }
}

impl core::fmt::Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ps", self.steps)
    }
}
