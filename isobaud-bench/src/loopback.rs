//! Single-module loopback
//!
//! One UART whose `tx` line is also its `rx` line. Received events are
//! forwarded through an `embassy-sync` channel and drained by a consumer
//! task, the way a firmware task would hand them to the rest of a system.

use embassy_futures::select::{select4, Either4};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use isobaud_core::BitTiming;
use isobaud_hal::{Duration, Unconnected};
use isobaud_sim::{Clock, ClockHandle, Signal, SimTime, Simulator};
use isobaud_uart::{RxEvent, RxStats, UartLines, UartModule, UartReceiver, UartTransmitter};
use log::{debug, info};

use crate::config::BenchConfig;
use crate::error::BenchError;

/// Depth of the receive channel between the receiver and the consumer
const EVENT_QUEUE_DEPTH: usize = 8;

/// Outcome of one [`Loopback::transfer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Everything the receiver reported, in order
    pub events: Vec<RxEvent>,
    /// When the transfer began
    pub started: SimTime,
    /// When the last stop bit ended
    pub finished: SimTime,
}

impl Transfer {
    /// Words received cleanly, in order
    pub fn words(&self) -> Vec<u16> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RxEvent::Word(word) => Some(*word),
                RxEvent::FramingError(_) => None,
            })
            .collect()
    }

    /// Number of frames the receiver dropped
    pub fn framing_errors(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, RxEvent::FramingError(_)))
            .count()
    }
}

/// One UART looped back onto itself
pub struct Loopback {
    sim: Simulator,
    clock: Clock,
    line: Signal,
    transmitter: UartTransmitter<Signal, Unconnected, ClockHandle>,
    receiver: UartReceiver<Signal, Unconnected, ClockHandle>,
}

impl Loopback {
    /// Build the bench on a fresh timeline
    ///
    /// Hardware flow control is not available here; there is no peer to
    /// drive `rtsn`.
    pub fn new(config: &BenchConfig) -> Result<Self, BenchError> {
        let sim = Simulator::new();
        let clock = Clock::new(&sim, Signal::new("clk", false), config.clock.period())?;
        let line = Signal::traced("line", true, &sim);

        let module = UartModule::new(
            config.uart,
            UartLines::new(line.clone(), line.clone()),
            clock.handle(),
            config.clock.frequency_hz,
        )?;
        let (transmitter, receiver) = module.split();
        info!("Loopback bench ready");

        Ok(Self {
            sim,
            clock,
            line,
            transmitter,
            receiver,
        })
    }

    /// Timeline the bench runs on
    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// The looped line, with its full transition history
    pub fn line(&self) -> &Signal {
        &self.line
    }

    /// Bit timing in use
    pub fn timing(&self) -> &BitTiming {
        self.transmitter.timing()
    }

    /// Receiver counters since construction
    pub fn stats(&self) -> RxStats {
        self.receiver.stats()
    }

    /// Send `words` and collect what comes back
    ///
    /// Runs the clock, the receiver, a channel consumer and the transmitter
    /// concurrently until the last stop bit has been on the line for a full
    /// bit period.
    pub fn transfer(&mut self, words: &[u16]) -> Result<Transfer, BenchError> {
        let Self {
            sim,
            clock,
            transmitter,
            receiver,
            ..
        } = self;

        let bit = transmitter.timing().bit_duration();
        let limit = time_limit(transmitter.frame_duration(), words.len());
        let channel = Channel::<NoopRawMutex, RxEvent, EVENT_QUEUE_DEPTH>::new();
        let mut sender = channel.sender();
        let mut events = Vec::with_capacity(words.len());
        let started = sim.now();

        debug!("Loopback transfer of {} words", words.len());

        let consume = async {
            loop {
                events.push(channel.receive().await);
            }
        };
        let drive = async {
            transmitter.write_words(words).await?;
            let finished = sim.now();
            sim.delay(bit).await;
            Ok::<_, isobaud_uart::Error>(finished)
        };

        let outcome = sim.run_for(
            limit,
            select4(clock.run(), receiver.run(&mut sender), consume, drive),
        )?;
        let finished = match outcome {
            Either4::Fourth(result) => result?,
            Either4::Second(Err(e)) => return Err(e.into()),
            Either4::Second(Ok(never)) => match never {},
            Either4::First(_) | Either4::Third(_) => unreachable!("endless task returned"),
        };

        Ok(Transfer {
            events,
            started,
            finished,
        })
    }
}

/// Simulated time budget for `words` frames, with room for clock sync
pub(crate) fn time_limit(frame: Duration, words: usize) -> Duration {
    let frames = u64::try_from(words).unwrap_or(u64::MAX).saturating_add(1);
    Duration::from_steps(frame.as_steps().saturating_mul(frames.saturating_mul(2)))
}
