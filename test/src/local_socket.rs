use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use cinesync_client::transport::{
    PacketReceiver as ClientPacketReceiver, PacketSender as ClientPacketSender,
    RecvError as ClientRecvError, SendError as ClientSendError,
};
use cinesync_server::transport::{
    PacketReceiver as ServerPacketReceiver, PacketSender as ServerPacketSender,
    RecvError as ServerRecvError, SendError as ServerSendError,
};

use crate::SimulatedTime;

pub const FAKE_CLIENT_ADDR: &str = "127.0.0.1:12345";
pub const FAKE_SERVER_ADDR: &str = "127.0.0.1:54321";

struct InFlight {
    deliver_at: f64,
    payload: Vec<u8>,
}

struct LinkState {
    latency: f64,
    extra_delays: VecDeque<f64>,
    dropping: bool,
    in_flight: Vec<InFlight>,
    sent: usize,
    dropped: usize,
}

/// One direction of the simulated network. Packets become readable once
/// simulated time reaches their delivery time.
#[derive(Clone)]
pub struct Link {
    time: SimulatedTime,
    state: Arc<Mutex<LinkState>>,
}

impl Link {
    fn new(time: &SimulatedTime, latency: f64) -> Self {
        Self {
            time: time.clone(),
            state: Arc::new(Mutex::new(LinkState {
                latency,
                extra_delays: VecDeque::new(),
                dropping: false,
                in_flight: Vec::new(),
                sent: 0,
                dropped: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_latency(&self, latency: f64) {
        self.lock().latency = latency;
    }

    /// Delays the next packets by these amounts on top of the latency, one
    /// entry per packet
    pub fn delay_next(&self, extra: &[f64]) {
        self.lock().extra_delays.extend(extra.iter().copied());
    }

    /// While set, every packet sent is lost
    pub fn set_dropping(&self, dropping: bool) {
        self.lock().dropping = dropping;
    }

    /// Packets handed to this link, lost ones included
    pub fn sent_count(&self) -> usize {
        self.lock().sent
    }

    pub fn dropped_count(&self) -> usize {
        self.lock().dropped
    }

    pub fn in_flight_count(&self) -> usize {
        self.lock().in_flight.len()
    }

    fn push(&self, payload: &[u8]) {
        let now = self.time.now();
        let mut state = self.lock();
        state.sent += 1;
        let extra = state.extra_delays.pop_front().unwrap_or(0.0);
        if state.dropping {
            state.dropped += 1;
            return;
        }
        let deliver_at = now + state.latency + extra;
        state.in_flight.push(InFlight {
            deliver_at,
            payload: payload.to_vec(),
        });
    }

    fn pop_ready(&self) -> Option<Vec<u8>> {
        let now = self.time.now();
        let mut state = self.lock();
        let index = state
            .in_flight
            .iter()
            .enumerate()
            .filter(|(_, packet)| packet.deliver_at <= now)
            .min_by(|(_, a), (_, b)| a.deliver_at.total_cmp(&b.deliver_at))
            .map(|(index, _)| index)?;
        Some(state.in_flight.remove(index).payload)
    }
}

/// A client and a host joined by two simulated links
pub struct LocalSocketPair {
    to_server: Link,
    to_client: Link,
}

impl LocalSocketPair {
    pub fn new(time: &SimulatedTime, latency: f64) -> Self {
        Self {
            to_server: Link::new(time, latency),
            to_client: Link::new(time, latency),
        }
    }

    /// Link carrying probes
    pub fn to_server(&self) -> &Link {
        &self.to_server
    }

    /// Link carrying replies
    pub fn to_client(&self) -> &Link {
        &self.to_client
    }

    pub fn client_socket(&self) -> (Box<dyn ClientPacketSender>, Box<dyn ClientPacketReceiver>) {
        (
            Box::new(LinkSender {
                link: self.to_server.clone(),
            }),
            Box::new(LinkReceiver {
                link: self.to_client.clone(),
                buffer: Vec::new(),
            }),
        )
    }

    pub fn server_socket(&self) -> (Box<dyn ServerPacketSender>, Box<dyn ServerPacketReceiver>) {
        (
            Box::new(LinkSender {
                link: self.to_client.clone(),
            }),
            Box::new(LinkReceiver {
                link: self.to_server.clone(),
                buffer: Vec::new(),
            }),
        )
    }
}

struct LinkSender {
    link: Link,
}

struct LinkReceiver {
    link: Link,
    buffer: Vec<u8>,
}

impl LinkReceiver {
    fn next(&mut self) -> bool {
        match self.link.pop_ready() {
            Some(payload) => {
                self.buffer = payload;
                true
            }
            None => false,
        }
    }
}

fn client_addr() -> SocketAddr {
    FAKE_CLIENT_ADDR
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 12345)))
}

impl ClientPacketSender for LinkSender {
    fn send(&self, payload: &[u8]) -> Result<(), ClientSendError> {
        self.link.push(payload);
        Ok(())
    }
}

impl ClientPacketReceiver for LinkReceiver {
    fn receive(&mut self) -> Result<Option<&[u8]>, ClientRecvError> {
        if self.next() {
            Ok(Some(self.buffer.as_slice()))
        } else {
            Ok(None)
        }
    }
}

impl ServerPacketSender for LinkSender {
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<(), ServerSendError> {
        if *address != client_addr() {
            return Err(ServerSendError);
        }
        self.link.push(payload);
        Ok(())
    }
}

impl ServerPacketReceiver for LinkReceiver {
    fn receive(&mut self) -> Result<Option<(SocketAddr, &[u8])>, ServerRecvError> {
        if self.next() {
            Ok(Some((client_addr(), self.buffer.as_slice())))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packets_arrive_after_latency() {
        let time = SimulatedTime::new(0.0);
        let pair = LocalSocketPair::new(&time, 0.25);
        let (client_sender, _) = pair.client_socket();
        let (_, mut server_receiver) = pair.server_socket();

        client_sender.send(&[1, 2, 3]).unwrap();
        assert!(server_receiver.receive().unwrap().is_none());

        time.advance(0.25);
        let (address, payload) = server_receiver.receive().unwrap().unwrap();
        assert_eq!(address, client_addr());
        assert_eq!(payload, &[1, 2, 3]);
        assert!(server_receiver.receive().unwrap().is_none());
    }

    #[test]
    fn delayed_packet_is_overtaken() {
        let time = SimulatedTime::new(0.0);
        let pair = LocalSocketPair::new(&time, 0.1);
        let (client_sender, _) = pair.client_socket();
        let (_, mut server_receiver) = pair.server_socket();

        pair.to_server().delay_next(&[1.0]);
        client_sender.send(&[1]).unwrap();
        client_sender.send(&[2]).unwrap();

        time.advance(2.0);
        assert_eq!(server_receiver.receive().unwrap().unwrap().1, &[2]);
        assert_eq!(server_receiver.receive().unwrap().unwrap().1, &[1]);
    }

    #[test]
    fn dropping_link_loses_packets() {
        let time = SimulatedTime::new(0.0);
        let pair = LocalSocketPair::new(&time, 0.0);
        let (client_sender, _) = pair.client_socket();
        let (_, mut server_receiver) = pair.server_socket();

        pair.to_server().set_dropping(true);
        client_sender.send(&[1]).unwrap();
        assert!(server_receiver.receive().unwrap().is_none());
        assert_eq!(pair.to_server().sent_count(), 1);
        assert_eq!(pair.to_server().dropped_count(), 1);
    }
}
