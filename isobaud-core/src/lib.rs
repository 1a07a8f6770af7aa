//! Board-agnostic UART protocol logic
//!
//! This crate contains the parts of the UART model that do not depend on
//! how lines are driven or how time passes:
//!
//! - Frame format configuration and its validation
//! - Bit timing derived from a reference clock and a baud rate
//! - Parity computation
//! - Frame encoding (transmit side) and the decoding state machine
//!   (receive side)
//! - The configuration and framing error taxonomy

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod frame;
pub mod parity;
pub mod timing;

pub use config::{FlowControl, Parity, UartConfig, UartConfigBuilder};
pub use error::{ConfigurationError, FramingError};
pub use frame::{Frame, FrameDecoder, MAX_FRAME_BITS};
pub use timing::BitTiming;
