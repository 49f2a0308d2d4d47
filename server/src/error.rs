use std::net::SocketAddr;

use thiserror::Error;

use cinesync_shared::WireError;

use crate::ServerConfigError;

/// Errors surfaced by `SyncServer`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncServerError {
    /// Server configuration is out of range
    #[error("Server config error: {0}")]
    Config(#[from] ServerConfigError),

    /// A packet could not be decoded (SECURITY: potentially malformed or malicious packet)
    #[error("Wire error from {address}: {source}")]
    Wire {
        address: SocketAddr,
        source: WireError,
    },

    /// Probe was tagged with a key other than the configured sync key
    #[error("Probe from {address} tagged with unknown key '{key}'")]
    UnknownKey { address: SocketAddr, key: String },

    /// Probe carried no `t0` timestamp
    #[error("Probe from {address} carries no timestamp")]
    EmptyProbe { address: SocketAddr },

    /// Reply could not be encoded
    #[error("Failed to encode reply: {0}")]
    Encode(WireError),

    /// Underlying transport failed to send a reply
    #[error("Failed to send reply to {address}")]
    SendFailed { address: SocketAddr },

    /// Underlying transport failed to receive
    #[error("Failed to receive packet")]
    RecvFailed,

    /// No transport has been loaded via `SyncServer::listen`
    #[error("Server is not listening. Call SyncServer::listen first")]
    NotListening,
}
