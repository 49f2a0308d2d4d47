use thiserror::Error;

use crate::message::REPLY_PAYLOAD_LEN;

/// Errors that can occur when turning an incoming reply into a `SyncSample`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplyError {
    /// Reply payload is shorter than `[t0_echo, t1, t2]`
    #[error(
        "Malformed sync reply: expected at least {expected} timestamps [t0, t1, t2], got {len}",
        expected = REPLY_PAYLOAD_LEN
    )]
    MalformedReply { len: usize },

    /// Reply payload contains NaN or infinite timestamps
    #[error("Malformed sync reply: non-finite timestamp in payload")]
    NonFiniteTimestamp,

    /// Reply was tagged with a key other than the configured sync key
    #[error("Reply tagged with unknown key '{key}'")]
    UnknownKey { key: String },

    /// A reply arrived while no probe was in flight
    #[error("Received a sync reply while no probe is in flight")]
    NoPendingProbe,

    /// Reply echoes a `t0` that does not belong to the probe in flight
    #[error("Stale sync reply: echoed t0 {t0_echo} does not match in-flight probe t0 {expected}")]
    StaleReply { t0_echo: f64, expected: f64 },
}

/// One probe round-trip measurement.
///
/// `t0` and `t3` are read from the local monotonic clock, `t1` and `t2` are
/// stamped by the host. All values are in seconds. The formulas assume
/// `t0 <= t1 <= t2 <= t3` holds approximately; this is not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSample {
    /// Client send time
    pub t0: f64,
    /// Host receive time
    pub t1: f64,
    /// Host send time
    pub t2: f64,
    /// Client receive time
    pub t3: f64,
}

impl SyncSample {
    pub fn new(t0: f64, t1: f64, t2: f64, t3: f64) -> Self {
        Self { t0, t1, t2, t3 }
    }

    /// Builds a sample from a reply payload `[t0_echo, t1, t2, ..]`, stamping
    /// `t3` locally. Extra trailing values are ignored; a short payload is
    /// rejected rather than padded.
    pub fn from_reply(payload: &[f64], t3: f64) -> Result<Self, ReplyError> {
        if payload.len() < REPLY_PAYLOAD_LEN {
            return Err(ReplyError::MalformedReply {
                len: payload.len(),
            });
        }
        let (t0, t1, t2) = (payload[0], payload[1], payload[2]);
        if ![t0, t1, t2, t3].iter().all(|t| t.is_finite()) {
            return Err(ReplyError::NonFiniteTimestamp);
        }
        Ok(Self::new(t0, t1, t2, t3))
    }

    /// Clock offset to add to local time to get host time, assuming the
    /// outbound and inbound legs take equally long.
    ///
    /// `((t1 - t0) + (t2 - t3)) / 2`
    pub fn offset(&self) -> f64 {
        ((self.t1 - self.t0) + (self.t2 - self.t3)) / 2.0
    }

    /// Pure network transit time: total local elapsed time minus the time
    /// the host spent holding the probe.
    ///
    /// `(t3 - t0) - (t2 - t1)`
    pub fn round_trip(&self) -> f64 {
        (self.t3 - self.t0) - (self.t2 - self.t1)
    }
}
