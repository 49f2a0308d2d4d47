use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key used to tag probes & replies when none is configured
pub const DEFAULT_SYNC_KEY: &str = "sync";

/// A reply carries `[t0_echo, t1, t2]`
pub const REPLY_PAYLOAD_LEN: usize = 3;

// Largest datagram either side will attempt to decode
const MAX_MESSAGE_BYTES: usize = 1024;

/// Errors that can occur while encoding/decoding a `SyncMessage`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Serialization failed
    #[error("Failed to encode sync message: {reason}")]
    Encode { reason: String },

    /// Payload could not be decoded (SECURITY: potentially malformed packet)
    #[error("Failed to decode sync message of {len} bytes: {reason}")]
    Decode { len: usize, reason: String },

    /// Packet is larger than any valid sync message
    #[error("Sync message of {len} bytes exceeds the {max} byte limit")]
    Oversized { len: usize, max: usize },
}

/// A keyed list of timestamps exchanged between client and host.
///
/// A probe carries `[t0]`, a reply carries `[t0_echo, t1, t2]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SyncMessage {
    pub key: String,
    pub payload: Vec<f64>,
}

impl SyncMessage {
    pub fn new(key: &str, payload: Vec<f64>) -> Self {
        Self {
            key: key.to_string(),
            payload,
        }
    }

    pub fn probe(key: &str, t0: f64) -> Self {
        Self::new(key, vec![t0])
    }

    pub fn reply(key: &str, t0: f64, t1: f64, t2: f64) -> Self {
        Self::new(key, vec![t0, t1, t2])
    }

    /// The client send time carried by a probe
    pub fn t0(&self) -> Option<f64> {
        self.payload.first().copied()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let bytes = bincode::serialize(self).map_err(|err| WireError::Encode {
            reason: err.to_string(),
        })?;
        if bytes.len() > MAX_MESSAGE_BYTES {
            return Err(WireError::Oversized {
                len: bytes.len(),
                max: MAX_MESSAGE_BYTES,
            });
        }
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() > MAX_MESSAGE_BYTES {
            return Err(WireError::Oversized {
                len: bytes.len(),
                max: MAX_MESSAGE_BYTES,
            });
        }
        bincode::deserialize(bytes).map_err(|err| WireError::Decode {
            len: bytes.len(),
            reason: err.to_string(),
        })
    }
}
