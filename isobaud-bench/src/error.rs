//! Bench errors

use std::fmt;

use isobaud_core::ConfigurationError;
use isobaud_sim::SimError;

/// Errors raised while loading a bench or running a scenario on it
#[derive(Debug)]
pub enum BenchError {
    /// Config file could not be read
    Io(std::io::Error),
    /// TOML parsing or validation failed
    Toml(toml::de::Error),
    /// Postcard decoding or validation failed
    Postcard(postcard::Error),
    /// Config rejected
    Config(ConfigurationError),
    /// UART module failed
    Uart(isobaud_uart::Error),
    /// Simulation failed
    Sim(SimError),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::Io(e) => write!(f, "cannot read bench config: {e}"),
            BenchError::Toml(e) => write!(f, "invalid TOML bench config: {e}"),
            BenchError::Postcard(e) => write!(f, "invalid postcard bench config: {e}"),
            BenchError::Config(e) => write!(f, "invalid bench config: {e}"),
            BenchError::Uart(e) => write!(f, "UART error: {e}"),
            BenchError::Sim(e) => write!(f, "simulation error: {e}"),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::Io(e) => Some(e),
            BenchError::Toml(e) => Some(e),
            BenchError::Postcard(e) => Some(e),
            BenchError::Config(e) => Some(e),
            BenchError::Uart(e) => Some(e),
            BenchError::Sim(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(e: std::io::Error) -> Self {
        BenchError::Io(e)
    }
}

impl From<toml::de::Error> for BenchError {
    fn from(e: toml::de::Error) -> Self {
        BenchError::Toml(e)
    }
}

impl From<postcard::Error> for BenchError {
    fn from(e: postcard::Error) -> Self {
        BenchError::Postcard(e)
    }
}

impl From<ConfigurationError> for BenchError {
    fn from(e: ConfigurationError) -> Self {
        BenchError::Config(e)
    }
}

impl From<isobaud_uart::Error> for BenchError {
    fn from(e: isobaud_uart::Error) -> Self {
        BenchError::Uart(e)
    }
}

impl From<SimError> for BenchError {
    fn from(e: SimError) -> Self {
        BenchError::Sim(e)
    }
}
