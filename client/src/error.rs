use thiserror::Error;

use cinesync_shared::{ReplyError, SyncConfigError, WireError};

/// Errors surfaced by `SyncClient`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncClientError {
    /// Sync configuration is out of range
    #[error("Sync config error: {0}")]
    Config(#[from] SyncConfigError),

    /// A packet from the host could not be decoded
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// A decoded reply was rejected by the sync engine
    #[error("Reply error: {0}")]
    Reply(#[from] ReplyError),

    /// No transport has been loaded via `SyncClient::connect`
    #[error("Client is not connected to a host. Call SyncClient::connect first")]
    NotConnected,

    /// Underlying transport failed to send a packet
    #[error("Failed to send packet to host")]
    SendFailed,

    /// Underlying transport failed to receive a packet
    #[error("Failed to receive packet from host")]
    RecvFailed,
}
