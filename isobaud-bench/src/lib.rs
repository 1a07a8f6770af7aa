//! Host-side test bench for the Isobaud UART model
//!
//! Wires `isobaud-uart` modules to `isobaud-sim` signals and a simulated
//! reference clock, driven by a [`BenchConfig`] that can be loaded from
//! TOML or postcard.
//!
//! - [`Loopback`]: one module whose `tx` is wired straight back to its `rx`
//! - [`Duplex`]: two modules cross-wired, including the RTS/CTS handshake
//!
//! ```no_run
//! use isobaud_bench::{BenchConfig, Loopback};
//!
//! let config = BenchConfig::from_toml(
//!     r#"
//!     [uart]
//!     baud = 9600
//!     parity = "even"
//!
//!     [clock]
//!     period_ps = 10416667
//!     "#,
//! )?;
//! let mut bench = Loopback::new(&config)?;
//! let transfer = bench.transfer(&[0x55, 0xAA])?;
//! assert_eq!(transfer.words(), [0x55, 0xAA]);
//! # Ok::<(), isobaud_bench::BenchError>(())
//! ```

pub mod config;
pub mod duplex;
pub mod error;
pub mod loopback;

pub use config::{BenchConfig, ClockConfig};
pub use duplex::{Duplex, Endpoint, Exchange};
pub use error::BenchError;
pub use loopback::{Loopback, Transfer};

use isobaud_sim::{Signal, SimTime};

/// Instant of the first start bit on a traced line at or after `since`
pub fn first_start_bit(line: &Signal, since: SimTime) -> Option<SimTime> {
    line.transitions()
        .into_iter()
        .find(|t| t.at >= since && !t.level)
        .map(|t| t.at)
}
