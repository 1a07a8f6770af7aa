//! Configuration type definitions
//!
//! `UartConfig` has private fields: the only ways to obtain one go through
//! the field checks below, so a config in hand is always in-domain.

use core::str::FromStr;

use super::builder::UartConfigBuilder;
use crate::error::ConfigurationError;

/// Smallest supported number of data bits
pub const MIN_DATA_BITS: u8 = 5;

/// Largest supported number of data bits
pub const MAX_DATA_BITS: u8 = 9;

/// Default baud rate
pub const DEFAULT_BAUD: u32 = 115_200;

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Parity bit makes the count of set bits odd
    Odd,
    /// Parity bit makes the count of set bits even
    Even,
}

impl Parity {
    /// Lowercase name, as accepted by `from_str`
    pub const fn as_str(&self) -> &'static str {
        match self {
            Parity::None => "none",
            Parity::Odd => "odd",
            Parity::Even => "even",
        }
    }

    /// Whether a parity bit is part of the frame
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Parity::None)
    }
}

impl FromStr for Parity {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Parity::None, Parity::Odd, Parity::Even]
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or(ConfigurationError::UnknownParity)
    }
}

impl TryFrom<u8> for Parity {
    type Error = ConfigurationError;

    /// `0` none, `1` odd, `2` even
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Parity::None),
            1 => Ok(Parity::Odd),
            2 => Ok(Parity::Even),
            _ => Err(ConfigurationError::UnknownParity),
        }
    }
}

/// Flow control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    /// No handshake
    #[default]
    None,
    /// RTS/CTS handshake on dedicated lines
    Hardware,
    /// XON/XOFF in-band handshake
    ///
    /// Accepted so configurations round-trip, but has no effect on the
    /// transmitter or receiver.
    Software,
}

impl FlowControl {
    /// Lowercase name, as accepted by `from_str`
    pub const fn as_str(&self) -> &'static str {
        match self {
            FlowControl::None => "none",
            FlowControl::Hardware => "hardware",
            FlowControl::Software => "software",
        }
    }

    /// Whether RTS/CTS lines take part in the transfer
    pub const fn is_hardware(&self) -> bool {
        matches!(self, FlowControl::Hardware)
    }
}

impl FromStr for FlowControl {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            FlowControl::None,
            FlowControl::Hardware,
            FlowControl::Software,
        ]
        .into_iter()
        .find(|fc| fc.as_str().eq_ignore_ascii_case(s))
        .ok_or(ConfigurationError::UnknownFlowControl)
    }
}

impl TryFrom<u8> for FlowControl {
    type Error = ConfigurationError;

    /// `0` none, `1` hardware, `2` software
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlowControl::None),
            1 => Ok(FlowControl::Hardware),
            2 => Ok(FlowControl::Software),
            _ => Err(ConfigurationError::UnknownFlowControl),
        }
    }
}

/// UART frame and handshake configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    bits: u8,
    parity: Parity,
    stop_bits: u8,
    baud: u32,
    flow_control: FlowControl,
}

impl Default for UartConfig {
    /// 8 data bits, no parity, 1 stop bit, 115200 baud, no flow control
    fn default() -> Self {
        Self {
            bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            baud: DEFAULT_BAUD,
            flow_control: FlowControl::None,
        }
    }
}

impl UartConfig {
    /// Create a validated configuration
    pub fn new(
        bits: u8,
        parity: Parity,
        stop_bits: u8,
        baud: u32,
        flow_control: FlowControl,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            bits: check_data_bits(bits)?,
            parity,
            stop_bits: check_stop_bits(stop_bits)?,
            baud: check_baud(baud)?,
            flow_control,
        })
    }

    /// Start building a configuration from the defaults
    pub fn builder() -> UartConfigBuilder {
        UartConfigBuilder::new()
    }

    /// Data bits per frame (5..=9)
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Parity mode
    pub fn parity(&self) -> Parity {
        self.parity
    }

    /// Stop bits per frame (1 or 2)
    pub fn stop_bits(&self) -> u8 {
        self.stop_bits
    }

    /// Baud rate in symbols per second
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Flow control mode
    pub fn flow_control(&self) -> FlowControl {
        self.flow_control
    }

    /// Copy with a different data width
    pub fn with_bits(self, bits: u8) -> Result<Self, ConfigurationError> {
        Ok(Self {
            bits: check_data_bits(bits)?,
            ..self
        })
    }

    /// Copy with a different parity mode
    pub fn with_parity(self, parity: Parity) -> Self {
        Self { parity, ..self }
    }

    /// Copy with a different stop bit count
    pub fn with_stop_bits(self, stop_bits: u8) -> Result<Self, ConfigurationError> {
        Ok(Self {
            stop_bits: check_stop_bits(stop_bits)?,
            ..self
        })
    }

    /// Copy with a different baud rate
    pub fn with_baud(self, baud: u32) -> Result<Self, ConfigurationError> {
        Ok(Self {
            baud: check_baud(baud)?,
            ..self
        })
    }

    /// Copy with a different flow control mode
    pub fn with_flow_control(self, flow_control: FlowControl) -> Self {
        Self {
            flow_control,
            ..self
        }
    }

    /// Total bits on the line for one frame (start + data + parity + stop)
    pub fn frame_bits(&self) -> u8 {
        1 + self.bits + u8::from(self.parity.is_enabled()) + self.stop_bits
    }

    /// Mask selecting the data bits of a word
    pub fn data_mask(&self) -> u16 {
        (1u16 << self.bits) - 1
    }
}

pub(crate) fn check_data_bits(bits: u8) -> Result<u8, ConfigurationError> {
    if (MIN_DATA_BITS..=MAX_DATA_BITS).contains(&bits) {
        Ok(bits)
    } else {
        Err(ConfigurationError::InvalidDataBits(bits))
    }
}

pub(crate) fn check_stop_bits(stop_bits: u8) -> Result<u8, ConfigurationError> {
    match stop_bits {
        1 | 2 => Ok(stop_bits),
        _ => Err(ConfigurationError::InvalidStopBits(stop_bits)),
    }
}

pub(crate) fn check_baud(baud: u32) -> Result<u32, ConfigurationError> {
    if baud > 0 {
        Ok(baud)
    } else {
        Err(ConfigurationError::InvalidBaud(baud))
    }
}
