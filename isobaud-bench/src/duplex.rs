//! Two UARTs talking to each other
//!
//! ```text
//!        A                         B
//!   tx  ───── a_to_b ─────────▶  rx
//!   rx  ◀──── b_to_a ──────────  tx
//!   ctsn ──── a_ready ────────▶  rtsn
//!   rtsn ◀─── b_ready ─────────  ctsn
//! ```
//!
//! Each receiver's `ctsn` is the peer transmitter's `rtsn`, so with
//! hardware flow control a transmitter only starts while the far receiver
//! is sensing.

use embassy_futures::join::join;
use embassy_futures::select::{select, select3, Either, Either3};
use isobaud_core::BitTiming;
use isobaud_hal::Duration;
use isobaud_sim::{Clock, ClockHandle, Signal, SimTime, Simulator};
use isobaud_uart::{
    FnSink, RxEvent, RxStats, UartLines, UartModule, UartReceiver, UartTransmitter,
};
use log::{debug, info};

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::first_start_bit;
use crate::loopback::time_limit;

/// One side of a [`Duplex`]
pub struct Endpoint {
    transmitter: UartTransmitter<Signal, Signal, ClockHandle>,
    receiver: UartReceiver<Signal, Signal, ClockHandle>,
    tx: Signal,
    ctsn: Signal,
}

impl Endpoint {
    fn new(
        config: &BenchConfig,
        clock: &Clock,
        tx: Signal,
        rx: Signal,
        ctsn: Signal,
        rtsn: Signal,
    ) -> Result<Self, BenchError> {
        let lines = UartLines::new(tx.clone(), rx).with_flow_control(ctsn.clone(), rtsn);
        let module = UartModule::new(
            config.uart,
            lines,
            clock.handle(),
            config.clock.frequency_hz,
        )?;
        let (transmitter, receiver) = module.split();
        Ok(Self {
            transmitter,
            receiver,
            tx,
            ctsn,
        })
    }

    /// The line this endpoint transmits on, with its history
    pub fn tx_line(&self) -> &Signal {
        &self.tx
    }

    /// This endpoint's clear-to-send output
    pub fn ctsn_line(&self) -> &Signal {
        &self.ctsn
    }

    /// Receiver counters since construction
    pub fn stats(&self) -> RxStats {
        self.receiver.stats()
    }
}

/// Outcome of one [`Duplex::exchange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Events reported by A's receiver
    pub at_a: Vec<RxEvent>,
    /// Events reported by B's receiver
    pub at_b: Vec<RxEvent>,
    /// First start bit A put on the line, if any
    pub a_started: Option<SimTime>,
    /// First start bit B put on the line, if any
    pub b_started: Option<SimTime>,
    /// When both receivers began sensing
    pub receivers_started: SimTime,
}

impl Exchange {
    /// Words B received from A
    pub fn received_by_b(&self) -> Vec<u16> {
        words(&self.at_b)
    }

    /// Words A received from B
    pub fn received_by_a(&self) -> Vec<u16> {
        words(&self.at_a)
    }
}

fn words(events: &[RxEvent]) -> Vec<u16> {
    events
        .iter()
        .filter_map(|event| match event {
            RxEvent::Word(word) => Some(*word),
            RxEvent::FramingError(_) => None,
        })
        .collect()
}

/// Two cross-wired UARTs sharing one clock
pub struct Duplex {
    sim: Simulator,
    clock: Clock,
    a: Endpoint,
    b: Endpoint,
}

impl Duplex {
    /// Build both endpoints from the same config on a fresh timeline
    ///
    /// The handshake lines are always wired; they only matter when the
    /// config selects hardware flow control.
    pub fn new(config: &BenchConfig) -> Result<Self, BenchError> {
        let sim = Simulator::new();
        let clock = Clock::new(&sim, Signal::new("clk", false), config.clock.period())?;

        let a_to_b = Signal::traced("a_to_b", true, &sim);
        let b_to_a = Signal::traced("b_to_a", true, &sim);
        let a_ready = Signal::traced("a_ctsn", true, &sim);
        let b_ready = Signal::traced("b_ctsn", true, &sim);

        let a = Endpoint::new(
            config,
            &clock,
            a_to_b.clone(),
            b_to_a.clone(),
            a_ready.clone(),
            b_ready.clone(),
        )?;
        let b = Endpoint::new(config, &clock, b_to_a, a_to_b, b_ready, a_ready)?;
        info!(
            "Duplex bench ready, flow control {}",
            config.uart.flow_control().as_str()
        );

        Ok(Self { sim, clock, a, b })
    }

    /// Timeline the bench runs on
    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// Bit timing shared by both sides
    pub fn timing(&self) -> &BitTiming {
        self.a.transmitter.timing()
    }

    /// Side A
    pub fn a(&self) -> &Endpoint {
        &self.a
    }

    /// Side B
    pub fn b(&self) -> &Endpoint {
        &self.b
    }

    /// Send `a_words` from A and `b_words` from B at the same time
    ///
    /// Both transmitters start immediately; both receivers start sensing
    /// only after `receiver_delay`. The exchange ends one bit period after
    /// the slower transmitter has finished.
    pub fn exchange(
        &mut self,
        a_words: &[u16],
        b_words: &[u16],
        receiver_delay: Duration,
    ) -> Result<Exchange, BenchError> {
        let Self { sim, clock, a, b } = self;

        let bit = a.transmitter.timing().bit_duration();
        let frames = a_words.len().max(b_words.len());
        let limit = time_limit(a.transmitter.frame_duration(), frames) + receiver_delay;
        let started = sim.now();
        let receivers_started = started + receiver_delay;

        debug!(
            "Duplex exchange: {} words A->B, {} words B->A, receivers after {}",
            a_words.len(),
            b_words.len(),
            receiver_delay
        );

        let mut at_a = Vec::new();
        let mut at_b = Vec::new();
        let mut sink_a = FnSink(|event: RxEvent| at_a.push(event));
        let mut sink_b = FnSink(|event: RxEvent| at_b.push(event));

        let (a_tx, a_rx) = (&mut a.transmitter, &mut a.receiver);
        let (b_tx, b_rx) = (&mut b.transmitter, &mut b.receiver);

        let receivers = async {
            sim.delay_until(receivers_started).await;
            match select(a_rx.run(&mut sink_a), b_rx.run(&mut sink_b)).await {
                Either::First(result) | Either::Second(result) => result,
            }
        };
        let transmitters = async {
            let (sent_a, sent_b) = join(a_tx.write_words(a_words), b_tx.write_words(b_words)).await;
            sent_a?;
            sent_b?;
            sim.delay(bit).await;
            Ok::<_, isobaud_uart::Error>(())
        };

        let outcome = sim.run_for(limit, select3(clock.run(), receivers, transmitters))?;
        match outcome {
            Either3::Third(result) => result?,
            Either3::Second(Err(e)) => return Err(e.into()),
            Either3::Second(Ok(never)) => match never {},
            Either3::First(_) => unreachable!("clock stopped"),
        }

        Ok(Exchange {
            at_a,
            at_b,
            a_started: first_start_bit(&a.tx, started),
            b_started: first_start_bit(&b.tx, started),
            receivers_started,
        })
    }
}
