//! Clock generator
//!
//! Drives a signal with a 50% duty cycle, starting with a rising edge at
//! the moment [`Clock::run`] is first polled. For odd periods the high
//! phase is the shorter one.

use isobaud_hal::clock::ClockSource;
use isobaud_hal::time::Duration;
use log::debug;

use crate::kernel::{SimError, Simulator};
use crate::signal::{Edge, Signal};

/// Periodic clock driving a signal
#[derive(Debug, Clone)]
pub struct Clock {
    sim: Simulator,
    signal: Signal,
    period: Duration,
}

impl Clock {
    /// Create a clock on `signal` with the given period
    ///
    /// The period must be at least two steps so both phases have length.
    pub fn new(sim: &Simulator, signal: Signal, period: Duration) -> Result<Self, SimError> {
        if period.as_steps() < 2 {
            return Err(SimError::InvalidClockPeriod);
        }
        Ok(Self {
            sim: sim.clone(),
            signal,
            period,
        })
    }

    /// Create a clock from a frequency in Hz
    ///
    /// The period is rounded down to a whole step.
    pub fn from_hz(sim: &Simulator, signal: Signal, hz: u64) -> Result<Self, SimError> {
        let period = Duration::from_hz(hz).ok_or(SimError::InvalidClockPeriod)?;
        Self::new(sim, signal, period)
    }

    /// Clock period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Driven signal
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Handle implementing [`ClockSource`] for the protocol tasks
    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            sim: self.sim.clone(),
            signal: self.signal.clone(),
            period: self.period,
        }
    }

    /// Toggle the signal forever
    ///
    /// Never completes; combine it with the rest of the testbench using
    /// `select` so it stops when the scenario does.
    pub async fn run(&self) {
        let high = self.period / 2;
        let low = self.period - high;
        debug!(
            "clock {} started, period {}",
            self.signal.name(),
            self.period
        );

        loop {
            self.signal.drive(true);
            self.sim.delay(high).await;
            self.signal.drive(false);
            self.sim.delay(low).await;
        }
    }
}

/// Clock metadata plus timed waits, as seen by a protocol task
#[derive(Debug, Clone)]
pub struct ClockHandle {
    sim: Simulator,
    signal: Signal,
    period: Duration,
}

impl ClockHandle {
    /// Timeline this clock lives on
    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }
}

impl ClockSource for ClockHandle {
    fn period(&self) -> Duration {
        self.period
    }

    async fn rising_edge(&mut self) {
        self.signal.edge(Edge::Rising).await
    }

    async fn delay(&mut self, duration: Duration) {
        self.sim.delay(duration).await
    }
}
