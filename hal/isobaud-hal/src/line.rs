//! Single-bit line abstractions
//!
//! Lines are expressed with the `embedded-hal` digital traits so that any
//! pin-like type (simulated signal, real GPIO, test double) can be bound to
//! the UART without adapters.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal_async::digital::Wait;

/// Line driven by this side (`tx`, `ctsn`)
pub trait TxLine: OutputPin {}

// Blanket implementation
impl<T: OutputPin> TxLine for T {}

/// Line sampled by this side (`rx`, `rtsn`)
///
/// Must support waiting for transitions as well as plain sampling.
pub trait RxLine: InputPin + Wait {}

// Blanket implementation for types that implement both traits
impl<T: InputPin + Wait> RxLine for T {}

/// Placeholder for an optional line that is not wired
///
/// This type has no values, so an `Option<Unconnected>` is always `None`.
/// It lets callers leave `ctsn`/`rtsn` out without naming a real pin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unconnected {}

impl ErrorType for Unconnected {
    type Error = Infallible;
}

impl OutputPin for Unconnected {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }
}

impl InputPin for Unconnected {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        match *self {}
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        match *self {}
    }
}

impl Wait for Unconnected {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }
}
