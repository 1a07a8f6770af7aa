//! Single-bit signals
//!
//! A [`Signal`] is a shared wire: every clone observes the same level, and
//! a drive is visible to every reader immediately (there is no delta
//! buffering). Edge waits are counted, so a wait completes on the first
//! matching edge after the wait was first polled even if the line has
//! toggled back since.

use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal_async::digital::Wait;
use log::trace;

use crate::kernel::Simulator;
use crate::time::SimTime;

/// Kind of transition to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
    /// Either direction
    Any,
}

/// Recorded level change on a traced signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// When the change happened
    pub at: SimTime,
    /// Level after the change
    pub level: bool,
}

struct SignalState {
    level: bool,
    rising: u64,
    falling: u64,
    waiters: Vec<Waker>,
    trace: Option<(Simulator, Vec<Transition>)>,
}

impl SignalState {
    fn edges(&self, edge: Edge) -> u64 {
        match edge {
            Edge::Rising => self.rising,
            Edge::Falling => self.falling,
            Edge::Any => self.rising + self.falling,
        }
    }

    fn register(&mut self, waker: &Waker) {
        if !self.waiters.iter().any(|w| w.will_wake(waker)) {
            self.waiters.push(waker.clone());
        }
    }
}

/// Shared single-bit line
#[derive(Clone)]
pub struct Signal {
    name: Rc<str>,
    state: Rc<RefCell<SignalState>>,
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("level", &self.level())
            .finish()
    }
}

impl Signal {
    /// Create a line resting at `level`
    pub fn new(name: &str, level: bool) -> Self {
        Self::build(name, level, None)
    }

    /// Create a line that records every level change with its time
    ///
    /// The initial level is recorded at the simulator's current time.
    pub fn traced(name: &str, level: bool, sim: &Simulator) -> Self {
        let first = Transition {
            at: sim.now(),
            level,
        };
        Self::build(name, level, Some((sim.clone(), vec![first])))
    }

    fn build(name: &str, level: bool, trace: Option<(Simulator, Vec<Transition>)>) -> Self {
        Self {
            name: Rc::from(name),
            state: Rc::new(RefCell::new(SignalState {
                level,
                rising: 0,
                falling: 0,
                waiters: Vec::new(),
                trace,
            })),
        }
    }

    /// Signal name, for logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current level (`true` = high)
    pub fn level(&self) -> bool {
        self.state.borrow().level
    }

    /// Drive the line to `level`
    ///
    /// Driving the current level is a no-op and produces no edge.
    pub fn drive(&self, level: bool) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            if state.level == level {
                return;
            }
            state.level = level;
            if level {
                state.rising += 1;
            } else {
                state.falling += 1;
            }
            if let Some((sim, history)) = state.trace.as_mut() {
                history.push(Transition {
                    at: sim.now(),
                    level,
                });
            }
            std::mem::take(&mut state.waiters)
        };

        trace!("{} -> {}", self.name, u8::from(level));
        for waker in waiters {
            waker.wake();
        }
    }

    /// Number of edges of the given kind seen so far
    pub fn edge_count(&self, edge: Edge) -> u64 {
        self.state.borrow().edges(edge)
    }

    /// Future completing on the next edge of the given kind
    pub fn edge(&self, edge: Edge) -> EdgeWait<'_> {
        EdgeWait {
            signal: self,
            edge,
            baseline: None,
        }
    }

    /// Recorded level changes, oldest first
    ///
    /// Empty for signals created with [`Signal::new`].
    pub fn transitions(&self) -> Vec<Transition> {
        self.state
            .borrow()
            .trace
            .as_ref()
            .map(|(_, history)| history.clone())
            .unwrap_or_default()
    }

    /// Level the line had at instant `at`, from the recorded trace
    ///
    /// When several changes share an instant the last one wins. Returns
    /// `None` for untraced signals or instants before the trace began.
    pub fn level_at(&self, at: SimTime) -> Option<bool> {
        let state = self.state.borrow();
        let (_, history) = state.trace.as_ref()?;
        history
            .iter()
            .take_while(|t| t.at <= at)
            .last()
            .map(|t| t.level)
    }
}

/// Future returned by [`Signal::edge`]
#[must_use = "edge waits do nothing unless awaited"]
pub struct EdgeWait<'a> {
    signal: &'a Signal,
    edge: Edge,
    baseline: Option<u64>,
}

impl Future for EdgeWait<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let mut state = this.signal.state.borrow_mut();
        let seen = state.edges(this.edge);

        match this.baseline {
            Some(baseline) if seen > baseline => Poll::Ready(()),
            Some(_) => {
                state.register(cx.waker());
                Poll::Pending
            }
            None => {
                this.baseline = Some(seen);
                state.register(cx.waker());
                Poll::Pending
            }
        }
    }
}

impl ErrorType for Signal {
    type Error = Infallible;
}

impl OutputPin for Signal {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl StatefulOutputPin for Signal {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level())
    }
}

impl InputPin for Signal {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level())
    }
}

impl Wait for Signal {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        if !self.level() {
            self.edge(Edge::Rising).await;
        }
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        if self.level() {
            self.edge(Edge::Falling).await;
        }
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.edge(Edge::Rising).await;
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.edge(Edge::Falling).await;
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.edge(Edge::Any).await;
        Ok(())
    }
}
