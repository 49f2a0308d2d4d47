//! # Cinesync Shared
//! Common functionality shared between cinesync-client & cinesync-server
//! crates: the four-timestamp sample, offset & round-trip math, outlier
//! rejection, sync configuration and the wire message exchanged by peers.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod clock;
mod message;
mod outliers;
mod sample;
mod sync_config;

pub use clock::{Clock, MonotonicClock};
pub use message::{SyncMessage, WireError, DEFAULT_SYNC_KEY, REPLY_PAYLOAD_LEN};
pub use outliers::{mean, median, remove_outliers, remove_outliers_quartile, OutlierFilter};
pub use sample::{ReplyError, SyncSample};
pub use sync_config::{SyncConfig, SyncConfigError};
