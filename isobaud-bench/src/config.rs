//! Bench configuration
//!
//! A bench file names the frame format and the reference clock. Two
//! encodings are accepted: TOML for hand-written files and postcard for
//! configs produced by other tools. [`BenchConfig::load`] sniffs which one
//! it was given.
//!
//! ```toml
//! [uart]
//! bits = 8
//! parity = "even"
//! stop_bits = 1
//! baud = 9600
//! flow_control = "none"
//!
//! [clock]
//! period_ps = 10416667
//! # frequency_hz = 96000
//! ```

use std::path::Path;
use std::str;

use isobaud_core::{BitTiming, ConfigurationError, UartConfig};
use isobaud_hal::Duration;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Reference clock of a bench
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockConfig {
    /// Clock period in picoseconds (simulator steps)
    pub period_ps: u64,
    /// Frequency used for the divisor instead of `1 / period`
    #[serde(default)]
    pub frequency_hz: Option<u64>,
}

impl ClockConfig {
    /// Clock with the given period and an inferred frequency
    pub fn from_period(period: Duration) -> Self {
        Self {
            period_ps: period.as_steps(),
            frequency_hz: None,
        }
    }

    /// Clock period as a duration
    pub fn period(&self) -> Duration {
        Duration::from_ps(self.period_ps)
    }
}

/// Everything needed to build a bench
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    /// Frame format, defaulting to 8N1 at 115200 baud
    #[serde(default)]
    pub uart: UartConfig,
    /// Reference clock
    pub clock: ClockConfig,
}

impl BenchConfig {
    /// Combine a frame format with a clock
    pub fn new(uart: UartConfig, clock: ClockConfig) -> Self {
        Self { uart, clock }
    }

    /// Bit timing this config yields
    ///
    /// Fails when the clock cannot produce the baud rate.
    pub fn timing(&self) -> Result<BitTiming, ConfigurationError> {
        BitTiming::for_config(&self.uart, self.clock.period(), self.clock.frequency_hz)
    }

    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self, BenchError> {
        let config: Self = toml::from_str(text)?;
        config.timing()?;
        Ok(config)
    }

    /// Decode a postcard blob
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, BenchError> {
        let config: Self = postcard::from_bytes(bytes)?;
        config.timing()?;
        Ok(config)
    }

    /// Encode as postcard
    pub fn to_postcard(&self) -> Result<Vec<u8>, BenchError> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Load a config in either encoding
    ///
    /// TOML is tried first, then postcard. If both fail, the TOML error
    /// is returned for text input and the postcard error otherwise.
    pub fn load(bytes: &[u8]) -> Result<Self, BenchError> {
        info!("Loading bench configuration ({} bytes)", bytes.len());

        let toml_error = match str::from_utf8(bytes) {
            Ok(text) => match Self::from_toml(text) {
                Ok(config) => {
                    info!("Loaded bench configuration from TOML");
                    log_config_summary(&config);
                    return Ok(config);
                }
                Err(e) => {
                    debug!("Not a TOML bench config ({}), trying postcard", e);
                    Some(e)
                }
            },
            Err(_) => {
                debug!("Bench config is not UTF-8, trying postcard");
                None
            }
        };

        match Self::from_postcard(bytes) {
            Ok(config) => {
                info!("Loaded bench configuration from postcard");
                log_config_summary(&config);
                Ok(config)
            }
            Err(e) => {
                let error = toml_error.unwrap_or(e);
                warn!("Failed to load bench configuration: {}", error);
                Err(error)
            }
        }
    }

    /// Read and [`load`](Self::load) a config file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        debug!("Reading bench configuration from {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &BenchConfig) {
    let uart = &config.uart;
    debug!(
        "  {} baud, {}{}{}",
        uart.baud(),
        uart.bits(),
        match uart.parity() {
            isobaud_core::Parity::None => 'N',
            isobaud_core::Parity::Odd => 'O',
            isobaud_core::Parity::Even => 'E',
        },
        uart.stop_bits()
    );
    debug!("  flow control {}", uart.flow_control().as_str());
    match config.clock.frequency_hz {
        Some(hz) => debug!("  clock {} ps at {} Hz", config.clock.period_ps, hz),
        None => debug!("  clock {} ps", config.clock.period_ps),
    }
}
