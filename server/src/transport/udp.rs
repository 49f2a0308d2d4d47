use std::{
    io::{self, ErrorKind},
    net::{SocketAddr, UdpSocket},
    sync::Arc,
};

use log::warn;

use super::{PacketReceiver, PacketSender, RecvError, SendError};

// Large enough for any sync message
const RECV_BUFFER_SIZE: usize = 1472;

/// Binds a non-blocking UDP socket clients can send probes to
pub fn listen(
    listen_addr: SocketAddr,
) -> io::Result<(Box<dyn PacketSender>, Box<dyn PacketReceiver>)> {
    listen_socket(UdpSocket::bind(listen_addr)?)
}

/// Serves probes on an already bound socket
pub fn listen_socket(
    socket: UdpSocket,
) -> io::Result<(Box<dyn PacketSender>, Box<dyn PacketReceiver>)> {
    socket.set_nonblocking(true)?;
    let socket = Arc::new(socket);

    let sender = UdpPacketSender {
        socket: socket.clone(),
    };
    let receiver = UdpPacketReceiver {
        socket,
        buffer: vec![0; RECV_BUFFER_SIZE].into_boxed_slice(),
    };
    Ok((Box::new(sender), Box::new(receiver)))
}

struct UdpPacketSender {
    socket: Arc<UdpSocket>,
}

impl PacketSender for UdpPacketSender {
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<(), SendError> {
        self.socket
            .send_to(payload, address)
            .map(|_| ())
            .map_err(|err| {
                warn!("UDP send to {} failed: {}", address, err);
                SendError
            })
    }
}

struct UdpPacketReceiver {
    socket: Arc<UdpSocket>,
    buffer: Box<[u8]>,
}

impl PacketReceiver for UdpPacketReceiver {
    fn receive(&mut self) -> Result<Option<(SocketAddr, &[u8])>, RecvError> {
        match self.socket.recv_from(&mut self.buffer) {
            Ok((len, address)) => Ok(Some((address, &self.buffer[..len]))),
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) => {
                warn!("UDP receive failed: {}", err);
                Err(RecvError)
            }
        }
    }
}
