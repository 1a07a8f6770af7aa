//! Isobaud Hardware Abstraction Layer
//!
//! This crate defines the contracts the UART protocol core is written
//! against. Anything that can drive and sample a single-bit line and wait
//! on time can host the protocol: a discrete-event simulator, a bit-banged
//! GPIO, or a test double.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  isobaud-uart (transmitter / receiver)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  isobaud-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  isobaud-sim  │       │ other line /  │
//! │  (host)       │       │ clock impls   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`line::TxLine`], [`line::RxLine`] - Driven and sampled lines, built on
//!   the `embedded-hal` digital traits
//! - [`clock::ClockSource`] - Reference clock and timed waits
//! - [`uart::UartTx`], [`uart::UartRx`] - Word-level serial transfer

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod line;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::ClockSource;
pub use line::{RxLine, TxLine, Unconnected};
pub use time::{Duration, STEPS_PER_SECOND};
pub use uart::{UartRx, UartTx};
