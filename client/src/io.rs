use log::warn;

use cinesync_shared::SyncMessage;

use crate::{
    sync::ProbeSender,
    transport::{PacketReceiver, PacketSender, SendError},
    SyncClientError,
};

/// Packet IO to the host, encoding & decoding `SyncMessage`s
pub struct Io {
    packet_sender: Option<Box<dyn PacketSender>>,
    packet_receiver: Option<Box<dyn PacketReceiver>>,
}

impl Io {
    pub fn new() -> Self {
        Self {
            packet_sender: None,
            packet_receiver: None,
        }
    }

    pub fn load(
        &mut self,
        packet_sender: Box<dyn PacketSender>,
        packet_receiver: Box<dyn PacketReceiver>,
    ) {
        if self.packet_sender.is_some() {
            warn!("Packet IO reloaded, dropping previous transport");
        }
        self.packet_sender = Some(packet_sender);
        self.packet_receiver = Some(packet_receiver);
    }

    pub fn is_loaded(&self) -> bool {
        self.packet_sender.is_some()
    }

    pub fn send_message(&self, message: &SyncMessage) -> Result<(), SyncClientError> {
        let Some(sender) = self.packet_sender.as_ref() else {
            return Err(SyncClientError::NotConnected);
        };
        let payload = message.to_bytes()?;
        sender
            .send(&payload)
            .map_err(|_| SyncClientError::SendFailed)
    }

    /// Receives & decodes the next pending message, `Ok(None)` once the
    /// transport is drained
    pub fn recv_message(&mut self) -> Result<Option<SyncMessage>, SyncClientError> {
        let Some(receiver) = self.packet_receiver.as_mut() else {
            return Err(SyncClientError::NotConnected);
        };
        match receiver.receive() {
            Ok(Some(payload)) => Ok(Some(SyncMessage::from_bytes(payload)?)),
            Ok(None) => Ok(None),
            Err(_) => Err(SyncClientError::RecvFailed),
        }
    }
}

impl ProbeSender for Io {
    fn send_probe(&mut self, key: &str, t0: f64) -> Result<(), SendError> {
        self.send_message(&SyncMessage::probe(key, t0)).map_err(|err| {
            warn!("Sync Error: {}", err);
            SendError
        })
    }
}
