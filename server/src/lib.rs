//! # Cinesync Server
//! Host side of the clock sync exchange. Every probe is stamped with the
//! host's receive & send times and echoed back to the client that sent it.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport;
pub mod shared {
    pub use cinesync_shared::{Clock, MonotonicClock, SyncMessage, WireError, DEFAULT_SYNC_KEY};
}

mod error;
mod events;
mod server;

pub use error::SyncServerError;
pub use events::{ErrorEvent, ProbeEvent, ServerEvent, ServerEvents};
pub use server::{ServerConfig, ServerConfigError, SyncServer};
