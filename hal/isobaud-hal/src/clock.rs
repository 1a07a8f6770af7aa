//! Reference clock abstraction
//!
//! The protocol needs two things from its time source: the period of the
//! reference clock (to derive the bit period) and the ability to suspend,
//! either until the next rising clock edge or for a fixed duration.

use crate::time::Duration;

/// Reference clock and timed waits
///
/// Implementations are expected to be cheap handles onto a shared
/// timeline; the transmitter and receiver each hold their own clone.
#[allow(async_fn_in_trait)]
pub trait ClockSource {
    /// Duration of one clock tick
    fn period(&self) -> Duration;

    /// Suspend until the next rising edge of the clock signal
    async fn rising_edge(&mut self);

    /// Suspend for a fixed duration, independent of the clock signal
    async fn delay(&mut self, duration: Duration);
}

impl<T: ClockSource + ?Sized> ClockSource for &mut T {
    fn period(&self) -> Duration {
        T::period(self)
    }

    async fn rising_edge(&mut self) {
        T::rising_edge(self).await
    }

    async fn delay(&mut self, duration: Duration) {
        T::delay(self, duration).await
    }
}
