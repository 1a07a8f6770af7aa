//! Simulation kernel and executor
//!
//! Compared to a real executor, this has some limitations:
//!
//! - Runs exactly one root future to completion; concurrency comes from
//!   combining futures (`join`, `select`) inside it
//! - Can't spawn additional tasks
//! - Time only moves when the root future is blocked
//!
//! The loop is: poll the root future; if something was woken during the
//! poll (a line edge), poll again at the same instant; otherwise jump to
//! the earliest pending timer, wake everything due at that instant, and
//! poll again.

use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::future::Future;
use std::pin::{pin, Pin};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use isobaud_hal::time::Duration;
use log::{debug, trace};

use crate::time::SimTime;

/// Re-polls allowed at one instant before the run is declared runaway
pub const MAX_DELTA_CYCLES: u32 = 10_000;

/// Reasons a simulation run ends without the root future completing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// Nothing is runnable and no timer is pending
    Stalled {
        /// Instant at which the run stopped
        at: SimTime,
    },
    /// The next event lies beyond the run's time limit
    TimeLimit {
        /// The limit that was reached
        at: SimTime,
    },
    /// Tasks kept waking each other without time advancing
    DeltaOverflow {
        /// Instant at which the loop was detected
        at: SimTime,
    },
    /// A clock was given a period too short to toggle
    InvalidClockPeriod,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stalled { at } => write!(f, "simulation stalled at {at}: nothing left to wake"),
            Self::TimeLimit { at } => write!(f, "simulation time limit reached at {at}"),
            Self::DeltaOverflow { at } => {
                write!(f, "more than {MAX_DELTA_CYCLES} delta cycles at {at}")
            }
            Self::InvalidClockPeriod => f.write_str("clock period must be at least 2 steps"),
        }
    }
}

impl std::error::Error for SimError {}

/// Pending timer
struct TimerEntry {
    deadline: SimTime,
    seq: u64,
    waker: Waker,
}

impl TimerEntry {
    fn key(&self) -> (SimTime, u64) {
        (self.deadline, self.seq)
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Timeline state shared by all handles
#[derive(Default)]
struct Kernel {
    now: SimTime,
    next_seq: u64,
    timers: BinaryHeap<Reverse<TimerEntry>>,
}

impl Kernel {
    fn schedule(&mut self, deadline: SimTime, waker: Waker) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Reverse(TimerEntry {
            deadline,
            seq,
            waker,
        }));
    }

    /// Move to the earliest deadline and collect everything due then
    fn advance(&mut self, limit: Option<SimTime>) -> Result<Vec<Waker>, SimError> {
        let deadline = match self.timers.peek() {
            Some(Reverse(entry)) => entry.deadline,
            None => return Err(SimError::Stalled { at: self.now }),
        };

        if let Some(limit) = limit {
            if deadline > limit {
                self.now = self.now.max(limit);
                return Err(SimError::TimeLimit { at: limit });
            }
        }

        self.now = self.now.max(deadline);

        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.timers.peek() {
            if entry.deadline > self.now {
                break;
            }
            if let Some(Reverse(entry)) = self.timers.pop() {
                due.push(entry.waker);
            }
        }
        Ok(due)
    }
}

/// Flag set by the root waker
#[derive(Default)]
struct WakeFlag(AtomicBool);

impl WakeFlag {
    fn take(&self) -> bool {
        self.0.swap(false, AtomicOrdering::Relaxed)
    }
}

impl Wake for WakeFlag {
    fn wake(self: Arc<Self>) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }
}

/// Handle onto one simulated timeline
///
/// Cheap to clone; all clones share the same clock and timer queue.
#[derive(Clone, Default)]
pub struct Simulator {
    kernel: Rc<RefCell<Kernel>>,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kernel = self.kernel.borrow();
        f.debug_struct("Simulator")
            .field("now", &kernel.now)
            .field("pending_timers", &kernel.timers.len())
            .finish()
    }
}

impl Simulator {
    /// Create a new timeline starting at [`SimTime::ZERO`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.kernel.borrow().now
    }

    /// Future completing after `duration` of simulated time
    pub fn delay(&self, duration: Duration) -> Timer {
        self.delay_until(self.now() + duration)
    }

    /// Future completing at `deadline` (immediately if already passed)
    pub fn delay_until(&self, deadline: SimTime) -> Timer {
        Timer {
            kernel: self.kernel.clone(),
            deadline,
            registered: false,
        }
    }

    /// Run `future` to completion
    ///
    /// Fails with [`SimError::Stalled`] if the future blocks with nothing
    /// left that could wake it.
    pub fn run<F: Future>(&self, future: F) -> Result<F::Output, SimError> {
        self.run_inner(None, future)
    }

    /// Run `future` to completion within `limit` of simulated time
    pub fn run_for<F: Future>(&self, limit: Duration, future: F) -> Result<F::Output, SimError> {
        self.run_inner(Some(self.now() + limit), future)
    }

    fn run_inner<F: Future>(
        &self,
        limit: Option<SimTime>,
        future: F,
    ) -> Result<F::Output, SimError> {
        let flag = Arc::new(WakeFlag::default());
        let waker = Waker::from(flag.clone());
        let mut cx = Context::from_waker(&waker);
        let mut future = pin!(future);
        let mut delta_cycles = 0u32;

        debug!("simulation started at {}", self.now());

        loop {
            flag.take();
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                debug!("simulation finished at {}", self.now());
                return Ok(output);
            }

            if flag.take() {
                delta_cycles += 1;
                if delta_cycles > MAX_DELTA_CYCLES {
                    return Err(SimError::DeltaOverflow { at: self.now() });
                }
                continue;
            }
            delta_cycles = 0;

            // Borrow released before waking
            let due = self.kernel.borrow_mut().advance(limit)?;
            trace!("advanced to {}, {} timers due", self.now(), due.len());
            for waker in due {
                waker.wake();
            }
        }
    }
}

/// Future returned by [`Simulator::delay`]
#[must_use = "timers do nothing unless awaited"]
pub struct Timer {
    kernel: Rc<RefCell<Kernel>>,
    deadline: SimTime,
    registered: bool,
}

impl Timer {
    /// Instant at which the timer completes
    pub fn deadline(&self) -> SimTime {
        self.deadline
    }
}

impl Future for Timer {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let mut kernel = this.kernel.borrow_mut();

        if kernel.now >= this.deadline {
            return Poll::Ready(());
        }
        if !this.registered {
            kernel.schedule(this.deadline, cx.waker().clone());
            this.registered = true;
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::join::join;
    use std::future::pending;

    #[test]
    fn test_delay_advances_time() {
        let sim = Simulator::new();
        let end = sim
            .run({
                let sim = sim.clone();
                async move {
                    sim.delay(Duration::from_ns(10)).await;
                    sim.delay(Duration::from_ns(5)).await;
                    sim.now()
                }
            })
            .unwrap();

        assert_eq!(end, SimTime::from_steps(15_000));
        assert_eq!(sim.now(), end);
    }

    #[test]
    fn test_zero_delay_is_immediate() {
        let sim = Simulator::new();
        let end = sim
            .run({
                let sim = sim.clone();
                async move {
                    sim.delay(Duration::ZERO).await;
                    sim.now()
                }
            })
            .unwrap();
        assert_eq!(end, SimTime::ZERO);
    }

    #[test]
    fn test_concurrent_delays_interleave() {
        let sim = Simulator::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let task = |name: &'static str, step: u64| {
            let sim = sim.clone();
            let log = log.clone();
            async move {
                for _ in 0..3 {
                    sim.delay(Duration::from_ns(step)).await;
                    log.borrow_mut().push((name, sim.now().as_steps() / 1_000));
                }
            }
        };

        sim.run(join(task("a", 2), task("b", 3))).unwrap();

        let log = log.borrow();
        // Ties (t=6) are not checked for order
        assert!(log.contains(&("a", 2)));
        assert!(log.contains(&("b", 3)));
        assert!(log.contains(&("a", 4)));
        assert!(log.contains(&("b", 9)));
        assert_eq!(log.len(), 6);
        assert_eq!(sim.now(), SimTime::from_steps(9_000));
    }

    #[test]
    fn test_stall_detected() {
        let sim = Simulator::new();
        let result = sim.run(pending::<()>());
        assert_eq!(result, Err(SimError::Stalled { at: SimTime::ZERO }));
    }

    #[test]
    fn test_time_limit() {
        let sim = Simulator::new();
        let result = sim.run_for(Duration::from_ns(100), {
            let sim = sim.clone();
            async move {
                loop {
                    sim.delay(Duration::from_ns(30)).await;
                }
            }
        });

        assert_eq!(
            result,
            Err(SimError::TimeLimit {
                at: SimTime::from_steps(100_000)
            })
        );
    }
}
