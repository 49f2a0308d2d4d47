cfg_if! {
    if #[cfg(feature = "transport_udp")] {
        pub mod udp;
    } else {}
}

pub use inner::{PacketReceiver, PacketSender, RecvError, SendError};

mod inner {

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SendError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RecvError;

    pub trait PacketSender: Send + Sync {
        /// Sends a packet to the host
        fn send(&self, payload: &[u8]) -> Result<(), SendError>;
    }

    pub trait PacketReceiver: Send {
        /// Receives a packet from the host, `Ok(None)` when nothing is
        /// pending
        fn receive(&mut self) -> Result<Option<&[u8]>, RecvError>;
    }
}
