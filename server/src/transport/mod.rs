use std::net::SocketAddr;

cfg_if! {
    if #[cfg(feature = "transport_udp")] {
        pub mod udp;
    } else {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecvError;

pub trait PacketSender: Send + Sync {
    /// Sends a packet to the given client
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<(), SendError>;
}

pub trait PacketReceiver: Send {
    /// Receives a packet from any client, `Ok(None)` when nothing is pending
    fn receive(&mut self) -> Result<Option<(SocketAddr, &[u8])>, RecvError>;
}
