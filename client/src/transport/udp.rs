use std::{
    io::{self, ErrorKind},
    net::{SocketAddr, UdpSocket},
    sync::Arc,
};

use log::warn;

use super::{PacketReceiver, PacketSender, RecvError, SendError};

// Large enough for any sync message
const RECV_BUFFER_SIZE: usize = 1472;

/// Opens a non-blocking UDP socket connected to the host
pub fn connect(
    server_addr: SocketAddr,
) -> io::Result<(Box<dyn PacketSender>, Box<dyn PacketReceiver>)> {
    let bind_addr: SocketAddr = if server_addr.is_ipv4() {
        SocketAddr::from(([0, 0, 0, 0], 0))
    } else {
        SocketAddr::from(([0u16; 8], 0))
    };

    let socket = UdpSocket::bind(bind_addr)?;
    socket.connect(server_addr)?;
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
    fn send(&self, payload: &[u8]) -> Result<(), SendError> {
        self.socket.send(payload).map(|_| ()).map_err(|err| {
            warn!("UDP send to host failed: {}", err);
            SendError
        })
    }
}

struct UdpPacketReceiver {
    socket: Arc<UdpSocket>,
    buffer: Box<[u8]>,
}

impl PacketReceiver for UdpPacketReceiver {
    fn receive(&mut self) -> Result<Option<&[u8]>, RecvError> {
        match self.socket.recv(&mut self.buffer) {
            Ok(len) => Ok(Some(&self.buffer[..len])),
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) => {
                warn!("UDP receive from host failed: {}", err);
                Err(RecvError)
            }
        }
    }
}
