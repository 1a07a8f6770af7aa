//! UART module construction

use isobaud_core::{BitTiming, ConfigurationError, UartConfig};
use isobaud_hal::{ClockSource, RxLine, TxLine};

use crate::error::{line_error, Error};
use crate::fmt::info;
use crate::lines::UartLines;
use crate::rx::UartReceiver;
use crate::tx::UartTransmitter;

/// A configured UART bound to its lines and reference clock
///
/// Construction validates the configuration against the bindings,
/// derives the bit timing once, and puts the lines in their idle state:
/// `tx` high and `ctsn` deasserted (high).
pub struct UartModule<TX, RX, CTS, RTS, C> {
    transmitter: UartTransmitter<TX, RTS, C>,
    receiver: UartReceiver<RX, CTS, C>,
}

impl<TX, RX, CTS, RTS, C> UartModule<TX, RX, CTS, RTS, C>
where
    TX: TxLine,
    RX: RxLine,
    CTS: TxLine,
    RTS: RxLine,
    C: ClockSource + Clone,
{
    /// Bind `config` to `lines`, timed from `clock`
    ///
    /// `clock_frequency_hz` overrides the frequency otherwise inferred from
    /// the clock period.
    pub fn new(
        config: UartConfig,
        lines: UartLines<TX, RX, CTS, RTS>,
        clock: C,
        clock_frequency_hz: Option<u64>,
    ) -> Result<Self, Error> {
        let timing = BitTiming::for_config(&config, clock.period(), clock_frequency_hz)?;

        let UartLines {
            mut tx,
            rx,
            mut ctsn,
            rtsn,
        } = lines;

        if config.flow_control().is_hardware() {
            if ctsn.is_none() {
                return Err(ConfigurationError::MissingCts.into());
            }
            if rtsn.is_none() {
                return Err(ConfigurationError::MissingRts.into());
            }
        }

        tx.set_high().map_err(line_error)?;
        if let Some(ctsn) = ctsn.as_mut() {
            ctsn.set_high().map_err(line_error)?;
        }

        info!(
            "UART {} baud, {} data bits, parity {}, {} stop bits, flow control {}",
            config.baud(),
            config.bits(),
            config.parity().as_str(),
            config.stop_bits(),
            config.flow_control().as_str()
        );
        info!(
            "  divisor {} ({} per bit)",
            timing.divisor(),
            timing.bit_duration()
        );

        Ok(Self {
            transmitter: UartTransmitter::new(config, timing, tx, rtsn, clock.clone()),
            receiver: UartReceiver::new(config, timing, rx, ctsn, clock),
        })
    }

    /// Frame format in use
    pub fn config(&self) -> &UartConfig {
        self.transmitter.config()
    }

    /// Derived bit timing
    pub fn timing(&self) -> &BitTiming {
        self.transmitter.timing()
    }

    /// Transmit half
    pub fn transmitter(&mut self) -> &mut UartTransmitter<TX, RTS, C> {
        &mut self.transmitter
    }

    /// Receive half
    pub fn receiver(&mut self) -> &mut UartReceiver<RX, CTS, C> {
        &mut self.receiver
    }

    /// Separate the two directions so they can run concurrently
    pub fn split(self) -> (UartTransmitter<TX, RTS, C>, UartReceiver<RX, CTS, C>) {
        (self.transmitter, self.receiver)
    }
}
