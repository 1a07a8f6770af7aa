//! Transmitter task

use embedded_hal::digital::PinState;
use isobaud_core::{BitTiming, Frame, UartConfig};
use isobaud_hal::{ClockSource, Duration, RxLine, TxLine};

use crate::error::{line_error, Error};
use crate::fmt::{debug, trace};

/// Drives frames onto the `tx` line
///
/// Obtained from [`UartModule::split`](crate::UartModule::split). Sends
/// are serialized by `&mut self`: a second word starts only after the
/// previous frame's last stop bit has elapsed.
pub struct UartTransmitter<TX, RTS, C> {
    config: UartConfig,
    timing: BitTiming,
    tx: TX,
    rtsn: Option<RTS>,
    clock: C,
    frames_sent: u32,
}

impl<TX, RTS, C> UartTransmitter<TX, RTS, C>
where
    TX: TxLine,
    RTS: RxLine,
    C: ClockSource,
{
    pub(crate) fn new(
        config: UartConfig,
        timing: BitTiming,
        tx: TX,
        rtsn: Option<RTS>,
        clock: C,
    ) -> Self {
        Self {
            config,
            timing,
            tx,
            rtsn,
            clock,
            frames_sent: 0,
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

    /// Time one frame occupies on the line
    pub fn frame_duration(&self) -> Duration {
        self.timing.frame_duration(&self.config)
    }

    /// Frames completed since construction (wraps)
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Send one word, starting on the next rising clock edge
    pub async fn send(&mut self, word: u16) -> Result<(), Error> {
        self.send_with(word, true).await
    }

    /// Send one word
    ///
    /// With hardware flow control the frame is held back while `rtsn` is
    /// high. With `sync` the start bit is further aligned to the next
    /// rising edge of the reference clock; without it the start bit is
    /// driven immediately. Bits above the configured width are dropped.
    pub async fn send_with(&mut self, word: u16, sync: bool) -> Result<(), Error> {
        if word & !self.config.data_mask() != 0 {
            debug!(
                "word {:?} wider than {} bits, truncating",
                word,
                self.config.bits()
            );
        }

        self.wait_clear_to_send().await?;
        if sync {
            self.clock.rising_edge().await;
        }

        trace!("TX {:?}", word);
        let frame = Frame::new(&self.config, word);
        for bit in frame.iter() {
            self.tx
                .set_state(PinState::from(bit))
                .map_err(line_error)?;
            self.clock.delay(self.timing.bit_duration()).await;
        }

        self.frames_sent = self.frames_sent.wrapping_add(1);
        Ok(())
    }

    /// Send words back to back, each synchronized to the clock
    pub async fn write_words(&mut self, words: &[u16]) -> Result<(), Error> {
        for &word in words {
            self.send(word).await?;
        }
        Ok(())
    }

    async fn wait_clear_to_send(&mut self) -> Result<(), Error> {
        if !self.config.flow_control().is_hardware() {
            return Ok(());
        }
        let Some(rtsn) = self.rtsn.as_mut() else {
            return Ok(());
        };

        if rtsn.is_high().map_err(line_error)? {
            trace!("TX held by RTS");
            rtsn.wait_for_falling_edge().await.map_err(line_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testbench::{config_8n1, Bench, BIT, PERIOD};
    use crate::{FlowControl, UartLines, UartModule};
    use embassy_futures::select::{select, Either};
    use isobaud_sim::{Signal, SimTime};

    fn start_time(line: &Signal) -> SimTime {
        line.transitions()
            .iter()
            .find(|t| !t.level)
            .map(|t| t.at)
            .expect("no start bit")
    }

    #[test]
    fn test_frame_levels_at_bit_centres() {
        let bench = Bench::new();
        let tx = Signal::traced("tx", true, &bench.sim);
        let rx = Signal::new("rx", true);
        let module = UartModule::new(
            config_8n1(),
            UartLines::new(tx.clone(), rx),
            bench.clock.handle(),
            None,
        )
        .unwrap();
        let (mut transmitter, _receiver) = module.split();

        bench.run(transmitter.send(0x55)).unwrap().unwrap();

        let start = start_time(&tx);
        // start, 1 0 1 0 1 0 1 0 (LSB first), stop
        let expected = [false, true, false, true, false, true, false, true, false, true];
        for (i, &level) in expected.iter().enumerate() {
            let centre = start + BIT * i as u64 + BIT / 2;
            assert_eq!(tx.level_at(centre), Some(level), "bit {i}");
        }
        assert_eq!(transmitter.frames_sent(), 1);
        assert!(tx.level());
    }

    #[test]
    fn test_sync_aligns_start_to_clock_edge() {
        let bench = Bench::new();
        let tx = Signal::traced("tx", true, &bench.sim);
        let module = UartModule::new(
            config_8n1(),
            UartLines::new(tx.clone(), Signal::new("rx", true)),
            bench.clock.handle(),
            None,
        )
        .unwrap();
        let (mut transmitter, _receiver) = module.split();

        let offset = Duration::from_ns(3);
        let sim = bench.sim.clone();
        bench
            .run(async {
                sim.delay(offset).await;
                transmitter.send(0x01).await
            })
            .unwrap()
            .unwrap();

        assert_eq!(start_time(&tx), SimTime::ZERO + PERIOD);
    }

    #[test]
    fn test_unsynchronized_send_starts_immediately() {
        let bench = Bench::new();
        let tx = Signal::traced("tx", true, &bench.sim);
        let module = UartModule::new(
            config_8n1(),
            UartLines::new(tx.clone(), Signal::new("rx", true)),
            bench.clock.handle(),
            None,
        )
        .unwrap();
        let (mut transmitter, _receiver) = module.split();

        let offset = Duration::from_ns(3);
        let sim = bench.sim.clone();
        bench
            .run(async {
                sim.delay(offset).await;
                transmitter.send_with(0x01, false).await
            })
            .unwrap()
            .unwrap();

        assert_eq!(start_time(&tx), SimTime::ZERO + offset);
    }

    #[test]
    fn test_frame_duration_is_respected() {
        let bench = Bench::new();
        let tx = Signal::traced("tx", true, &bench.sim);
        let module = UartModule::new(
            config_8n1(),
            UartLines::new(tx.clone(), Signal::new("rx", true)),
            bench.clock.handle(),
            None,
        )
        .unwrap();
        let (mut transmitter, _receiver) = module.split();
        assert_eq!(transmitter.frame_duration(), BIT * 10);

        let sim = bench.sim.clone();
        let finished = bench
            .run(async {
                transmitter.send(0xFF).await.unwrap();
                sim.now()
            })
            .unwrap();

        assert_eq!(finished - start_time(&tx), BIT * 10);
    }

    #[test]
    fn test_hardware_flow_control_holds_frame() {
        let bench = Bench::new();
        let tx = Signal::traced("tx", true, &bench.sim);
        let rtsn = Signal::new("rtsn", true);
        let config = config_8n1().with_flow_control(FlowControl::Hardware);
        let lines = UartLines::new(tx.clone(), Signal::new("rx", true))
            .with_flow_control(Signal::new("ctsn", false), rtsn.clone());
        let module = UartModule::new(config, lines, bench.clock.handle(), None).unwrap();
        let (mut transmitter, _receiver) = module.split();

        let release = SimTime::ZERO + BIT * 3;
        let sim = bench.sim.clone();
        bench
            .run(async {
                match select(transmitter.send(0x42), sim.delay_until(release)).await {
                    Either::First(_) => panic!("sent while RTS deasserted"),
                    Either::Second(()) => {}
                }
                // only the initial level so far
                assert_eq!(tx.transitions().len(), 1);
                rtsn.drive(false);
                transmitter.send(0x42).await
            })
            .unwrap()
            .unwrap();

        assert!(start_time(&tx) >= release);
    }

    #[test]
    fn test_software_flow_control_ignores_rts() {
        let bench = Bench::new();
        let tx = Signal::traced("tx", true, &bench.sim);
        let config = config_8n1().with_flow_control(FlowControl::Software);
        let lines = UartLines::new(tx.clone(), Signal::new("rx", true))
            .with_rtsn(Signal::new("rtsn", true));
        let module = UartModule::new(config, lines, bench.clock.handle(), None).unwrap();
        let (mut transmitter, _receiver) = module.split();

        bench.run(transmitter.send(0x42)).unwrap().unwrap();
        assert_eq!(transmitter.frames_sent(), 1);
    }

    #[test]
    fn test_wide_word_is_truncated() {
        let bench = Bench::new();
        let tx = Signal::traced("tx", true, &bench.sim);
        let module = UartModule::new(
            config_8n1(),
            UartLines::new(tx.clone(), Signal::new("rx", true)),
            bench.clock.handle(),
            None,
        )
        .unwrap();
        let (mut transmitter, _receiver) = module.split();

        bench.run(transmitter.send(0x1FF)).unwrap().unwrap();

        let start = start_time(&tx);
        let stop_centre = start + BIT * 9 + BIT / 2;
        assert_eq!(tx.level_at(stop_centre), Some(true));
        for i in 1..=8u64 {
            assert_eq!(tx.level_at(start + BIT * i + BIT / 2), Some(true));
        }
    }
}
