//! Configuration types
//!
//! Frame format and flow control settings shared by the transmitter and
//! receiver. Every value handed out by this module has been validated.

pub mod builder;
pub mod types;

#[cfg(feature = "serde")]
mod serde_impl;

pub use builder::UartConfigBuilder;
pub use types::*;
