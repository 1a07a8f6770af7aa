//! Shared fixtures for unit tests

use core::future::Future;

use embassy_futures::select::{select, Either};
use isobaud_core::{FlowControl, Parity, UartConfig};
use isobaud_hal::Duration;
use isobaud_sim::{Clock, SimError, Signal, Simulator};

/// 96 kHz reference clock: divisor 10 at 9600 baud
pub(crate) const PERIOD: Duration = Duration::from_ps(10_416_667);
pub(crate) const BIT: Duration = Duration::from_ps(104_166_670);

pub(crate) fn config_8n1() -> UartConfig {
    UartConfig::new(8, Parity::None, 1, 9600, FlowControl::None).unwrap()
}

pub(crate) struct Bench {
    pub sim: Simulator,
    pub clock: Clock,
}

impl Bench {
    pub fn new() -> Self {
        let sim = Simulator::new();
        let clock = Clock::new(&sim, Signal::new("clk", false), PERIOD).unwrap();
        Self { sim, clock }
    }

    /// Run `future` with the clock toggling alongside it
    pub fn run<F: Future>(&self, future: F) -> Result<F::Output, SimError> {
        self.sim.run_for(Duration::from_secs(1), async {
            match select(self.clock.run(), future).await {
                Either::First(()) => unreachable!("clock stopped"),
                Either::Second(output) => output,
            }
        })
    }
}

/// Drive raw bit levels onto `line`, one bit period each
///
/// The line is left at the last level.
pub(crate) async fn drive_bits(sim: &Simulator, line: &Signal, bits: &[bool]) {
    for &bit in bits {
        line.drive(bit);
        sim.delay(BIT).await;
    }
}
