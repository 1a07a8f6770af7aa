//! Logging macros
//!
//! Routed to `defmt` when the `defmt` feature is on, to the `log` facade
//! otherwise. Format strings must stay within what both accept: `{}` and
//! `{:?}` on types implementing both `Display`/`Debug` and `defmt::Format`.

#![allow(unused_imports)]

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, info, trace, warn};

#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, info, trace, warn};
