use std::default::Default;

use thiserror::Error;

use crate::{message::DEFAULT_SYNC_KEY, outliers::OutlierFilter};

/// Errors raised when a `SyncConfig` is out of range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncConfigError {
    /// At least one probe is needed to estimate an offset
    #[error("Sync attempts must be at least 1, got {attempts}")]
    ZeroAttempts { attempts: u32 },

    /// Timeout must be a positive, finite number of seconds
    #[error("Sync timeout must be a positive number of seconds, got {timeout_seconds}")]
    InvalidTimeout { timeout_seconds: f64 },

    /// Round-trip ceiling must be a positive, finite number of seconds
    #[error("Maximum round trip must be a positive number of seconds, got {max_round_trip}")]
    InvalidMaxRoundTrip { max_round_trip: f64 },

    /// Sync key is used to tag probes & replies and cannot be empty
    #[error("Sync key cannot be empty")]
    EmptySyncKey,
}

/// Contains Config properties which will be used by the clock sync engine
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Number of probe round-trips per session
    pub attempts: u32,
    /// How long to wait for the reply to a single probe before restarting
    /// the session, in seconds
    pub timeout_seconds: f64,
    /// Number of timed-out sessions tolerated before giving up
    pub max_retries: u32,
    /// Key used to tag outgoing probes & recognise replies
    pub sync_key: String,
    /// Samples whose network transit time exceeds this many seconds are
    /// discarded before outlier filtering. `None` keeps every sample.
    pub max_round_trip: Option<f64>,
    /// Filter run over the session's offsets before averaging
    pub outlier_filter: OutlierFilter,
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), SyncConfigError> {
        validate_session(self.attempts, self.timeout_seconds)?;
        if self.sync_key.is_empty() {
            return Err(SyncConfigError::EmptySyncKey);
        }
        if let Some(max_round_trip) = self.max_round_trip {
            if !(max_round_trip.is_finite() && max_round_trip > 0.0) {
                return Err(SyncConfigError::InvalidMaxRoundTrip { max_round_trip });
            }
        }
        Ok(())
    }
}

/// Checks the per-session parameters that may also be overridden on a
/// single `synchronize` call
fn validate_session(attempts: u32, timeout_seconds: f64) -> Result<(), SyncConfigError> {
    if attempts == 0 {
        return Err(SyncConfigError::ZeroAttempts { attempts });
    }
    if !(timeout_seconds.is_finite() && timeout_seconds > 0.0) {
        return Err(SyncConfigError::InvalidTimeout { timeout_seconds });
    }
    Ok(())
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            timeout_seconds: 4.0,
            max_retries: 3,
            sync_key: DEFAULT_SYNC_KEY.to_string(),
            max_round_trip: None,
            outlier_filter: OutlierFilter::default(),
        }
    }
}
