//! UART transmitter and receiver tasks
//!
//! This crate turns the pure protocol logic of `isobaud-core` into two
//! cooperative tasks that run against any line and clock implementing the
//! `isobaud-hal` contracts:
//!
//! - [`UartTransmitter::send`] drives one frame onto `tx`, bit by bit,
//!   honouring RTS when hardware flow control is on
//! - [`UartReceiver::run`] senses `rx` forever, decoding frames and
//!   surviving framing errors
//!
//! Both come from one [`UartModule`], built from a validated config, the
//! line bindings and the reference clock, then [`split`](UartModule::split)
//! so each direction can progress independently.
//!
//! ```ignore
//! let lines = UartLines::new(tx, rx);
//! let module = UartModule::new(config, lines, clock.handle(), None)?;
//! let (mut transmitter, mut receiver) = module.split();
//!
//! let mut received = heapless::Vec::<u16, 16>::new();
//! select(receiver.run(&mut received), transmitter.send(0x55)).await;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

mod fmt;

pub mod error;
pub mod io;
pub mod lines;
pub mod module;
pub mod rx;
pub mod sink;
pub mod tx;

#[cfg(test)]
mod testbench;

pub use error::Error;
pub use lines::UartLines;
pub use module::UartModule;
pub use rx::{RxStats, UartReceiver};
pub use sink::{FnSink, RxEvent, RxSink};
pub use tx::UartTransmitter;

pub use isobaud_core::{
    BitTiming, ConfigurationError, FlowControl, FramingError, Parity, UartConfig,
};
