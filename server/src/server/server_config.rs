use std::default::Default;

use thiserror::Error;

use cinesync_shared::DEFAULT_SYNC_KEY;

/// Errors raised when a `ServerConfig` is out of range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerConfigError {
    /// Sync key is used to recognise probes and cannot be empty
    #[error("Sync key cannot be empty")]
    EmptySyncKey,

    /// The server must be allowed to process at least one packet per receive
    #[error("max_packets_per_receive must be at least 1")]
    ZeroPacketBudget,
}

/// Contains Config properties which will be used by the Server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Only probes tagged with this key are answered
    pub sync_key: String,
    /// Upper bound on packets read in a single `receive` call, so one
    /// chatty client cannot stall the host's loop
    pub max_packets_per_receive: usize,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        if self.sync_key.is_empty() {
            return Err(ServerConfigError::EmptySyncKey);
        }
        if self.max_packets_per_receive == 0 {
            return Err(ServerConfigError::ZeroPacketBudget);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sync_key: DEFAULT_SYNC_KEY.to_string(),
            max_packets_per_receive: 256,
        }
    }
}
