use std::{mem, net::SocketAddr};

use log::{debug, info, warn};

use cinesync_shared::{Clock, SyncMessage};

use crate::{
    events::ServerEvents,
    transport::{PacketReceiver, PacketSender},
    ServerConfig, SyncServerError,
};

/// Answers clock probes from clients.
///
/// Each probe `[t0]` is stamped with `t1` (host time when the packet was
/// read) and `t2` (host time right before the reply is sent), and echoed as
/// `[t0, t1, t2]` to the address it came from.
pub struct SyncServer {
    config: ServerConfig,
    clock: Box<dyn Clock>,
    io: Option<(Box<dyn PacketSender>, Box<dyn PacketReceiver>)>,
    incoming_events: ServerEvents,
}

impl SyncServer {
    /// Create a new SyncServer reading host time from `clock`
    pub fn new<C: Clock + 'static>(config: ServerConfig, clock: C) -> Result<Self, SyncServerError> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Box::new(clock),
            io: None,
            incoming_events: ServerEvents::new(),
        })
    }

    /// Attach the transport clients send probes to
    pub fn listen(
        &mut self,
        packet_sender: Box<dyn PacketSender>,
        packet_receiver: Box<dyn PacketReceiver>,
    ) {
        self.io = Some((packet_sender, packet_receiver));
        info!("Sync server listening");
    }

    /// Returns whether or not the Server has a transport to listen on
    pub fn is_listening(&self) -> bool {
        self.io.is_some()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Current host time
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Must be called regularly. Answers every pending probe (up to
    /// `max_packets_per_receive`) and returns what happened.
    pub fn receive(&mut self) -> ServerEvents {
        self.maintain_socket();
        mem::replace(&mut self.incoming_events, ServerEvents::new())
    }

    fn maintain_socket(&mut self) {
        let Some((sender, receiver)) = self.io.as_mut() else {
            self.incoming_events.push_error(SyncServerError::NotListening);
            return;
        };

        for _ in 0..self.config.max_packets_per_receive {
            let (address, message) = match receiver.receive() {
                Ok(Some((address, payload))) => {
                    match SyncMessage::from_bytes(payload) {
                        Ok(message) => (address, message),
                        Err(source) => {
                            warn!("Dropping undecodable packet from {}: {}", address, source);
                            self.incoming_events
                                .push_error(SyncServerError::Wire { address, source });
                            continue;
                        }
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    self.incoming_events.push_error(SyncServerError::RecvFailed);
                    break;
                }
            };
            let t1 = self.clock.now();

            match Self::answer(&self.config, &address, &message, t1, self.clock.now())
                .and_then(|reply| reply.to_bytes().map_err(SyncServerError::Encode))
            {
                Ok(bytes) => {
                    if sender.send(&address, &bytes).is_err() {
                        warn!("Sync Server Error: Cannot send reply to {}", address);
                        self.incoming_events
                            .push_error(SyncServerError::SendFailed { address });
                        continue;
                    }
                    let t0 = message.t0().unwrap_or_default();
                    debug!("Answered sync probe from {} (t0 {})", address, t0);
                    self.incoming_events.push_probe(address, t0);
                }
                Err(err) => {
                    warn!("Ignoring probe: {}", err);
                    self.incoming_events.push_error(err);
                }
            }
        }
    }

    /// Builds the reply to a probe, given host receive time `t1` and host
    /// send time `t2`. Does no IO.
    pub fn answer(
        config: &ServerConfig,
        address: &SocketAddr,
        probe: &SyncMessage,
        t1: f64,
        t2: f64,
    ) -> Result<SyncMessage, SyncServerError> {
        if probe.key != config.sync_key {
            return Err(SyncServerError::UnknownKey {
                address: *address,
                key: probe.key.clone(),
            });
        }
        let Some(t0) = probe.t0() else {
            return Err(SyncServerError::EmptyProbe { address: *address });
        };
        Ok(SyncMessage::reply(&probe.key, t0, t1, t2))
    }
}
