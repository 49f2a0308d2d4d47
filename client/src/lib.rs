//! # Cinesync Client
//! Estimates the offset between the local monotonic clock and a game host's
//! clock using the four-timestamp probe exchange. Sessions retry on timeout,
//! reject jittery samples and report the result as events.

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
    pub use cinesync_shared::{
        mean, median, remove_outliers, remove_outliers_quartile, Clock, MonotonicClock,
        OutlierFilter, ReplyError, SyncConfig, SyncConfigError, SyncMessage, SyncSample,
        WireError, DEFAULT_SYNC_KEY,
    };
}

mod client;
mod error;
mod events;
mod io;
mod sync;

pub use client::SyncClient;
pub use error::SyncClientError;
pub use events::{
    ErrorEvent, SyncEvent, SyncEvents, SyncFailedEvent, SyncSucceededEvent,
    SyncSucceededTextEvent,
};
pub use sync::{ClockSyncEngine, ProbeSender, SyncReport, SyncSession, SyncState};
