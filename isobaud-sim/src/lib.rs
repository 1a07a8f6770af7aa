//! Discrete-event simulation kernel
//!
//! A minimal host-side timeline for running the UART model:
//!
//! - [`Simulator`] - executor that polls one root future and advances
//!   simulated time whenever nothing is runnable
//! - [`Signal`] - shared single-bit line with edge waits, usable as an
//!   `embedded-hal` pin
//! - [`Clock`] - periodic clock generator and its [`ClockHandle`]
//!
//! Everything is single-threaded: tasks are futures combined into the root
//! future (with `join`/`select`), and state is shared through `Rc`.
//!
//! ```ignore
//! let sim = Simulator::new();
//! let line = Signal::new("line", true);
//! let out = sim.run({
//!     let sim = sim.clone();
//!     async move {
//!         sim.delay(Duration::from_ns(5)).await;
//!         line.drive(false);
//!         sim.now()
//!     }
//! })?;
//! ```

#![deny(unsafe_code)]

pub mod clock;
pub mod kernel;
pub mod signal;
pub mod time;

pub use clock::{Clock, ClockHandle};
pub use kernel::{SimError, Simulator, Timer, MAX_DELTA_CYCLES};
pub use signal::{Edge, EdgeWait, Signal, Transition};
pub use time::SimTime;

pub use isobaud_hal::time::Duration;
