//! UART task errors

use core::fmt;

use embedded_hal::digital::{self, ErrorKind};
use isobaud_core::{ConfigurationError, FramingError};

/// Errors raised by the UART module and its tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Rejected at construction time
    Config(ConfigurationError),
    /// One received frame was malformed
    Framing(FramingError),
    /// The underlying line implementation failed
    Line(ErrorKind),
    /// Received word does not fit a byte (9-bit frames through a byte API)
    WordTooWide(u16),
}

impl From<ConfigurationError> for Error {
    fn from(e: ConfigurationError) -> Self {
        Error::Config(e)
    }
}

impl From<FramingError> for Error {
    fn from(e: FramingError) -> Self {
        Error::Framing(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {e}"),
            Error::Framing(e) => write!(f, "framing error: {e}"),
            Error::Line(kind) => write!(f, "line error: {kind}"),
            Error::WordTooWide(word) => write!(f, "received word {word:#x} does not fit a byte"),
        }
    }
}

impl core::error::Error for Error {}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Error::Config(_) => embedded_io::ErrorKind::InvalidInput,
            Error::Framing(_) | Error::WordTooWide(_) => embedded_io::ErrorKind::InvalidData,
            Error::Line(_) => embedded_io::ErrorKind::Other,
        }
    }
}

/// Map a pin error onto [`Error::Line`]
pub(crate) fn line_error<E: digital::Error>(e: E) -> Error {
    Error::Line(e.kind())
}
