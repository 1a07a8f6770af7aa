//! Error taxonomy
//!
//! Two families: configuration errors are raised synchronously while a
//! config or module is being built and are fatal to that attempt; framing
//! errors are local to one received frame.

use core::fmt;

/// Malformed or incompatible configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Data bits outside 5..=9
    InvalidDataBits(u8),
    /// Stop bits other than 1 or 2
    InvalidStopBits(u8),
    /// Baud rate must be positive
    InvalidBaud(u32),
    /// Parity value not recognised
    UnknownParity,
    /// Flow control value not recognised
    UnknownFlowControl,
    /// Reference clock period of zero
    InvalidClockPeriod,
    /// Clock frequency and baud give a divisor that rounds to zero
    DegenerateDivisor,
    /// Bit duration does not fit the time type
    TimingOverflow,
    /// Hardware flow control selected without a CTS line
    MissingCts,
    /// Hardware flow control selected without an RTS line
    MissingRts,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDataBits(bits) => {
                write!(f, "bits must be an integer in the range 5 to 9, got {bits}")
            }
            Self::InvalidStopBits(bits) => {
                write!(f, "stop bits must be either 1 or 2, got {bits}")
            }
            Self::InvalidBaud(baud) => write!(f, "baud rate must be positive, got {baud}"),
            Self::UnknownParity => f.write_str("parity must be one of none, odd, even"),
            Self::UnknownFlowControl => {
                f.write_str("flow control must be one of none, hardware, software")
            }
            Self::InvalidClockPeriod => f.write_str("clock period must be non-zero"),
            Self::DegenerateDivisor => {
                f.write_str("baud rate exceeds clock frequency, divisor rounds to zero")
            }
            Self::TimingOverflow => f.write_str("bit duration overflows simulated time"),
            Self::MissingCts => f.write_str("HARDWARE flow control selected and no CTS signal"),
            Self::MissingRts => f.write_str("HARDWARE flow control selected and no RTS signal"),
        }
    }
}

impl core::error::Error for ConfigurationError {}

/// Frame-level violation detected by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError {
    /// Line was not low at the centre of the start bit
    StartBit,
    /// Received parity bit disagrees with the data
    Parity,
    /// Line was not high at the centre of a stop bit
    StopBit,
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StartBit => "start bit error",
            Self::Parity => "parity error",
            Self::StopBit => "stop bit error",
        })
    }
}

impl core::error::Error for FramingError {}
