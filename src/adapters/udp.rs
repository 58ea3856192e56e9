//! UDP datagram transport.
//!
//! Implements [`DatagramPort`] over `std::net::UdpSocket`, which ESP-IDF's
//! std support and host targets share — one implementation, no cfg gating.
//! The socket is non-blocking: the main loop polls `recv` once per
//! sequencing tick and never stalls on the network.

use core::net::{Ipv4Addr, SocketAddr};
use std::net::UdpSocket;

use log::{info, warn};

use crate::app::ports::{DatagramPort, TransportError};

pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind the inbound port and enable broadcast for hello announces.
    pub fn bind(listen_port: u16) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, listen_port)).map_err(|e| {
            warn!("udp: bind on port {} failed: {}", listen_port, e);
            TransportError::NotReady
        })?;
        socket
            .set_nonblocking(true)
            .map_err(|_| TransportError::NotReady)?;
        if let Err(e) = socket.set_broadcast(true) {
            // Discovery degrades to directed hellos; pairing still works.
            warn!("udp: enabling broadcast failed: {}", e);
        }
        info!("udp: listening on port {}", listen_port);
        Ok(Self { socket })
    }

    /// The locally bound address (port resolution for ephemeral binds).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }
}

impl DatagramPort for UdpTransport {
    fn send(&mut self, to: SocketAddr, payload: &[u8]) -> Result<(), TransportError> {
        match self.socket.send_to(payload, to) {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("udp: send to {} failed: {}", to, e);
                Err(TransportError::SendFailed)
            }
        }
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(SocketAddr, usize)>, TransportError> {
        match self.socket.recv_from(buf) {
            Ok((len, from)) => Ok(Some((from, len))),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => {
                warn!("udp: receive failed: {}", e);
                Err(TransportError::ReceiveFailed)
            }
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn loopback_roundtrip() {
        // Ephemeral ports so parallel test runs never collide.
        let mut a = UdpTransport::bind(0).unwrap();
        let mut b = UdpTransport::bind(0).unwrap();
        let b_addr = SocketAddr::from(([127, 0, 0, 1], b.local_addr().unwrap().port()));

        a.send(b_addr, &[0xFF]).unwrap();

        let mut buf = [0u8; 32];
        // Non-blocking socket: give the kernel a moment to deliver.
        let mut got = None;
        for _ in 0..50 {
            if let Some(hit) = b.recv(&mut buf).unwrap() {
                got = Some(hit);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        let (_, len) = got.expect("datagram should arrive on loopback");
        assert_eq!(&buf[..len], &[0xFF]);
    }

    #[test]
    fn empty_queue_returns_none() {
        let mut t = UdpTransport::bind(0).unwrap();
        let mut buf = [0u8; 32];
        assert_eq!(t.recv(&mut buf).unwrap(), None);
    }
}
