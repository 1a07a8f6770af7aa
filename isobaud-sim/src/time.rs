//! Absolute simulated time

use core::fmt;
use core::ops::{Add, Sub};

use isobaud_hal::time::Duration;

/// Instant on the simulated timeline, in steps since the start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime {
    steps: u64,
}

impl SimTime {
    /// Start of simulation
    pub const ZERO: Self = Self { steps: 0 };

    /// Instant at a raw step count
    pub const fn from_steps(steps: u64) -> Self {
        Self { steps }
    }

    /// Raw step count since the start
    pub const fn as_steps(&self) -> u64 {
        self.steps
    }

    /// Time elapsed since the start
    pub const fn since_start(&self) -> Duration {
        Duration::from_steps(self.steps)
    }

    /// Time from `earlier` to `self`, or zero if `earlier` is later
    pub fn saturating_duration_since(&self, earlier: SimTime) -> Duration {
        Duration::from_steps(self.steps.saturating_sub(earlier.steps))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    /// Saturates at the end of representable time
    fn add(self, rhs: Duration) -> SimTime {
        SimTime::from_steps(self.steps.saturating_add(rhs.as_steps()))
    }
}

impl Sub for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Duration {
        Duration::from_steps(self.steps - rhs.steps)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}ps", self.steps)
    }
}
