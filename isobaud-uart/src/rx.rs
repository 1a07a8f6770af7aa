//! Receiver task
//!
//! The receiver idles until it sees a falling edge on `rx`, waits half a
//! bit to land in the centre of the start bit, then samples once per bit
//! period and hands each sample to a [`FrameDecoder`]. A frame that fails
//! to decode is dropped and sensing resumes from the next falling edge.

use core::convert::Infallible;

use embedded_hal::digital::PinState;
use isobaud_core::{BitTiming, FrameDecoder, FramingError, UartConfig};
use isobaud_hal::{ClockSource, RxLine, TxLine};

use crate::error::{line_error, Error};
use crate::fmt::{info, trace, warn};
use crate::sink::RxSink;

/// Counters kept by a receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Frames decoded successfully
    pub frames: u32,
    /// Start bit sampled high
    pub start_bit_errors: u32,
    /// Parity mismatch
    pub parity_errors: u32,
    /// Stop bit sampled low
    pub stop_bit_errors: u32,
}

impl RxStats {
    /// Total frames dropped
    pub fn framing_errors(&self) -> u32 {
        self.start_bit_errors
            .wrapping_add(self.parity_errors)
            .wrapping_add(self.stop_bit_errors)
    }

    fn record(&mut self, error: FramingError) {
        let counter = match error {
            FramingError::StartBit => &mut self.start_bit_errors,
            FramingError::Parity => &mut self.parity_errors,
            FramingError::StopBit => &mut self.stop_bit_errors,
        };
        *counter = counter.wrapping_add(1);
    }
}

/// Samples the `rx` line and reconstructs words
pub struct UartReceiver<RX, CTS, C> {
    config: UartConfig,
    timing: BitTiming,
    rx: RX,
    ctsn: Option<CTS>,
    clock: C,
    decoder: FrameDecoder,
    stats: RxStats,
}

impl<RX, CTS, C> UartReceiver<RX, CTS, C>
where
    RX: RxLine,
    CTS: TxLine,
    C: ClockSource,
{
    pub(crate) fn new(
        config: UartConfig,
        timing: BitTiming,
        rx: RX,
        ctsn: Option<CTS>,
        clock: C,
    ) -> Self {
        Self {
            decoder: FrameDecoder::new(&config),
            config,
            timing,
            rx,
            ctsn,
            clock,
            stats: RxStats::default(),
        }
    }

    /// Frame format in use
    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Bit timing in use
    pub fn timing(&self) -> &BitTiming {
        &self.timing
    }

    /// Counters since construction
    pub fn stats(&self) -> RxStats {
        self.stats
    }

    /// Receive exactly one frame
    ///
    /// Returns the decoded word, or the framing error that ended the frame.
    /// With hardware flow control `ctsn` is asserted while waiting and
    /// released once a frame has been accepted.
    pub async fn receive(&mut self) -> Result<u16, Error> {
        match self.receive_frame().await {
            Ok(word) => {
                self.stats.frames = self.stats.frames.wrapping_add(1);
                trace!("RX {:?}", word);
                Ok(word)
            }
            Err(Error::Framing(e)) => {
                self.stats.record(e);
                Err(Error::Framing(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Sense the line forever, delivering each decoded word to `sink`
    ///
    /// Framing errors are logged, counted and reported to the sink, then
    /// sensing resumes. Only a line failure ends the loop.
    pub async fn run<S: RxSink>(&mut self, sink: &mut S) -> Result<Infallible, Error> {
        info!(
            "RX sensing at {} baud ({} bits, {} stop)",
            self.config.baud(),
            self.config.bits(),
            self.config.stop_bits()
        );

        loop {
            match self.receive().await {
                Ok(word) => sink.on_word(word),
                Err(Error::Framing(e)) => {
                    warn!("RX frame dropped: {}", e);
                    sink.on_framing_error(e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn receive_frame(&mut self) -> Result<u16, Error> {
        let handshake = self.config.flow_control().is_hardware();
        if handshake {
            self.set_clear_to_send(true)?;
        }

        self.rx.wait_for_falling_edge().await.map_err(line_error)?;
        self.decoder.reset();
        self.clock.delay(self.timing.half_bit_duration()).await;

        loop {
            let bit = self.rx.is_high().map_err(line_error)?;
            if let Some(word) = self.decoder.feed(bit)? {
                if handshake {
                    self.set_clear_to_send(false)?;
                }
                return Ok(word);
            }
            self.clock.delay(self.timing.bit_duration()).await;
        }
    }

    fn set_clear_to_send(&mut self, clear: bool) -> Result<(), Error> {
        if let Some(ctsn) = self.ctsn.as_mut() {
            // active low
            ctsn.set_state(PinState::from(!clear)).map_err(line_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testbench::{config_8n1, drive_bits, Bench, BIT};
    use crate::{FlowControl, FnSink, Parity, RxEvent, UartLines, UartModule};
    use embassy_futures::select::{select, Either};
    use isobaud_core::Frame;
    use isobaud_hal::Duration;
    use isobaud_sim::Signal;

    fn receiver_on(
        bench: &Bench,
        config: UartConfig,
        line: &Signal,
    ) -> UartReceiver<Signal, isobaud_hal::Unconnected, isobaud_sim::ClockHandle> {
        let module = UartModule::new(
            config,
            UartLines::new(Signal::new("tx", true), line.clone()),
            bench.clock.handle(),
            None,
        )
        .unwrap();
        module.split().1
    }

    #[test]
    fn test_receives_driven_frame() {
        let bench = Bench::new();
        let line = Signal::new("rx", true);
        let config = config_8n1().with_parity(Parity::Even);
        let mut receiver = receiver_on(&bench, config, &line);
        let frame = Frame::new(&config, 0xA7);

        let sim = bench.sim.clone();
        let (word, _) = bench
            .run(embassy_futures::join::join(
                receiver.receive(),
                drive_bits(&sim, &line, frame.bits()),
            ))
            .unwrap();

        assert_eq!(word, Ok(0xA7));
        assert_eq!(receiver.stats().frames, 1);
    }

    #[test]
    fn test_start_glitch_is_rejected() {
        let bench = Bench::new();
        let line = Signal::new("rx", true);
        let config = config_8n1();
        let mut receiver = receiver_on(&bench, config, &line);

        let sim = bench.sim.clone();
        let glitch = async {
            line.drive(false);
            sim.delay(Duration::from_us(1)).await;
            line.drive(true);
            sim.delay(BIT * 2).await;
        };
        let (result, ()) = bench
            .run(embassy_futures::join::join(receiver.receive(), glitch))
            .unwrap();

        assert_eq!(result, Err(Error::Framing(FramingError::StartBit)));
        assert_eq!(receiver.stats().start_bit_errors, 1);
    }

    #[test]
    fn test_start_glitch_then_recovery() {
        let bench = Bench::new();
        let line = Signal::new("rx", true);
        let config = config_8n1();
        let mut receiver = receiver_on(&bench, config, &line);
        let frame = Frame::new(&config, 0x5A);

        let mut events = Vec::new();
        let mut sink = FnSink(|event: RxEvent| events.push(event));
        let sim = bench.sim.clone();
        let driver = async {
            line.drive(false);
            sim.delay(Duration::from_us(1)).await;
            line.drive(true);
            sim.delay(BIT * 2).await;
            drive_bits(&sim, &line, frame.bits()).await;
            sim.delay(BIT).await;
        };
        match bench.run(select(receiver.run(&mut sink), driver)).unwrap() {
            Either::First(result) => panic!("receiver stopped: {:?}", result),
            Either::Second(()) => {}
        }

        assert_eq!(
            events,
            [
                RxEvent::FramingError(FramingError::StartBit),
                RxEvent::Word(0x5A)
            ]
        );
        let stats = receiver.stats();
        assert_eq!(stats.start_bit_errors, 1);
        assert_eq!(stats.frames, 1);
    }

    #[test]
    fn test_bad_stop_bit_emits_no_word() {
        let bench = Bench::new();
        let line = Signal::new("rx", true);
        let config = config_8n1();
        let mut receiver = receiver_on(&bench, config, &line);

        let mut bits = [false; 10];
        bits[1..9].copy_from_slice(&[true, false, true, true, false, false, true, false]);

        let mut events = Vec::new();
        let mut sink = FnSink(|event: RxEvent| events.push(event));
        let sim = bench.sim.clone();
        let driver = async {
            drive_bits(&sim, &line, &bits).await;
            sim.delay(BIT * 4).await;
            line.drive(true);
            sim.delay(BIT * 4).await;
        };
        match bench.run(select(receiver.run(&mut sink), driver)).unwrap() {
            Either::First(result) => panic!("receiver stopped: {:?}", result),
            Either::Second(()) => {}
        }

        assert_eq!(events, [RxEvent::FramingError(FramingError::StopBit)]);
        assert_eq!(receiver.stats().stop_bit_errors, 1);
        assert_eq!(receiver.stats().frames, 0);
    }

    #[test]
    fn test_parity_error_then_recovery() {
        let bench = Bench::new();
        let line = Signal::new("rx", true);
        let config = config_8n1().with_parity(Parity::Odd);
        let mut receiver = receiver_on(&bench, config, &line);

        let good = Frame::new(&config, 0x3C);
        let mut bad = [false; 11];
        bad.copy_from_slice(good.bits());
        bad[9] = !bad[9];

        let mut received = heapless::Vec::<u16, 4>::new();
        let sim = bench.sim.clone();
        let driver = async {
            drive_bits(&sim, &line, &bad).await;
            sim.delay(BIT).await;
            drive_bits(&sim, &line, good.bits()).await;
            sim.delay(BIT).await;
        };
        match bench.run(select(receiver.run(&mut received), driver)).unwrap() {
            Either::First(result) => panic!("receiver stopped: {:?}", result),
            Either::Second(()) => {}
        }

        assert_eq!(received.as_slice(), &[0x3C]);
        let stats = receiver.stats();
        assert_eq!(stats.parity_errors, 1);
        assert_eq!(stats.framing_errors(), 1);
        assert_eq!(stats.frames, 1);
    }

    #[test]
    fn test_hardware_flow_control_toggles_ctsn() {
        let bench = Bench::new();
        let line = Signal::new("rx", true);
        let ctsn = Signal::new("ctsn", false);
        let config = config_8n1().with_flow_control(FlowControl::Hardware);
        let lines = UartLines::new(Signal::new("tx", true), line.clone())
            .with_flow_control(ctsn.clone(), Signal::new("rtsn", false));
        let module = UartModule::new(config, lines, bench.clock.handle(), None).unwrap();
        let (_transmitter, mut receiver) = module.split();
        assert!(ctsn.level(), "deasserted at construction");

        let frame = Frame::new(&config, 0x11);
        let sim = bench.sim.clone();
        let (word, ()) = bench
            .run(embassy_futures::join::join(receiver.receive(), async {
                sim.delay(BIT).await;
                assert!(!ctsn.level(), "asserted while waiting");
                drive_bits(&sim, &line, frame.bits()).await;
            }))
            .unwrap();

        assert_eq!(word, Ok(0x11));
        assert!(ctsn.level(), "released after the frame");
    }

    #[test]
    fn test_stats_totals() {
        let mut stats = RxStats::default();
        stats.record(FramingError::StartBit);
        stats.record(FramingError::StopBit);
        stats.record(FramingError::StopBit);
        assert_eq!(stats.start_bit_errors, 1);
        assert_eq!(stats.stop_bit_errors, 2);
        assert_eq!(stats.framing_errors(), 3);
    }
}
