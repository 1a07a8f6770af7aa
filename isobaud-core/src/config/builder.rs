//! Configuration builder
//!
//! Collects raw field values and checks them all at `build()`, so a
//! partially valid set of fields never escapes as a `UartConfig`.

use super::types::{FlowControl, Parity, UartConfig, DEFAULT_BAUD};
use crate::error::ConfigurationError;

/// Builder for [`UartConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfigBuilder {
    bits: u8,
    parity: Parity,
    stop_bits: u8,
    baud: u32,
    flow_control: FlowControl,
}

impl Default for UartConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UartConfigBuilder {
    /// Create a builder holding the default 8N1, 115200 baud settings
    pub const fn new() -> Self {
        Self {
            bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            baud: DEFAULT_BAUD,
            flow_control: FlowControl::None,
        }
    }

    /// Data bits per frame
    pub const fn bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    /// Parity mode
    pub const fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Stop bits per frame
    pub const fn stop_bits(mut self, stop_bits: u8) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Baud rate
    pub const fn baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    /// Flow control mode
    pub const fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Validate every field and produce the configuration
    pub fn build(self) -> Result<UartConfig, ConfigurationError> {
        UartConfig::new(
            self.bits,
            self.parity,
            self.stop_bits,
            self.baud,
            self.flow_control,
        )
    }
}
