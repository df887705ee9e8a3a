//! Datagram transmit capability and the broadcast socket behind it.
//!
//! The talker core depends only on [`Transmit`]: "send one datagram to this
//! address". [`BroadcastSocket`] is the production implementation; tests
//! substitute their own.

use crate::error::{Result, VisprError};
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Capability to transmit a single datagram.
pub trait Transmit: Send + Sync {
    /// Sends one datagram to the destination address, returning the number
    /// of bytes handed to the network stack.
    fn send(
        &self,
        datagram: &[u8],
        dest: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send;
}

/// UDP socket with the broadcast capability enabled.
pub struct BroadcastSocket {
    socket: UdpSocket,
}

impl BroadcastSocket {
    /// Opens a broadcast-capable socket on an ephemeral local port.
    ///
    /// Must be called from within a Tokio runtime; the socket registers
    /// with the runtime's reactor.
    pub fn new() -> Result<Self> {
        Self::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
    }

    /// Opens a broadcast-capable socket bound to the given local address.
    ///
    /// If enabling the broadcast capability fails, the socket is closed and
    /// the error is surfaced as [`VisprError::SocketOption`]; no half-open
    /// socket is retained.
    pub fn bind(bind_addr: SocketAddr) -> Result<Self> {
        let socket = socket2::Socket::new(
            socket2::Domain::for_address(bind_addr),
            socket2::Type::DGRAM,
            Some(socket2::Protocol::UDP),
        )
        .map_err(VisprError::SocketCreation)?;

        socket
            .set_nonblocking(true)
            .map_err(VisprError::SocketCreation)?;
        socket
            .bind(&bind_addr.into())
            .map_err(VisprError::SocketCreation)?;

        // Convert to tokio UdpSocket
        let socket = UdpSocket::from_std(socket.into()).map_err(VisprError::SocketCreation)?;

        socket.set_broadcast(true).map_err(VisprError::SocketOption)?;

        Ok(Self { socket })
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transmit for BroadcastSocket {
    async fn send(&self, datagram: &[u8], dest: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(datagram, dest).await
    }
}

/// Binds a datagram socket suitable for receiving vispr broadcasts.
///
/// With `reuse_port` set, several listeners on one host can share the
/// broadcast port. Must be called from within a Tokio runtime.
pub fn bind_listener(bind_addr: SocketAddr, reuse_port: bool) -> Result<UdpSocket> {
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(bind_addr),
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )
    .map_err(VisprError::SocketCreation)?;

    if reuse_port {
        socket
            .set_reuse_address(true)
            .map_err(VisprError::SocketOption)?;
        #[cfg(unix)]
        socket
            .set_reuse_port(true)
            .map_err(VisprError::SocketOption)?;
    }

    socket
        .set_nonblocking(true)
        .map_err(VisprError::SocketCreation)?;
    socket
        .bind(&bind_addr.into())
        .map_err(VisprError::SocketCreation)?;

    UdpSocket::from_std(socket.into()).map_err(VisprError::SocketCreation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_socket_binds_an_ephemeral_port() {
        let socket = BroadcastSocket::new().unwrap();
        assert_ne!(socket.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn transmit_delivers_datagrams_over_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dest = receiver.local_addr().unwrap();

        let socket = BroadcastSocket::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let sent = socket.send(b"hello", dest).await.unwrap();
        assert_eq!(sent, 5);

        let mut buf = [0u8; 16];
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[tokio::test]
    async fn listeners_can_share_a_port_with_reuse() {
        let first = bind_listener("127.0.0.1:0".parse().unwrap(), true).unwrap();
        let addr = first.local_addr().unwrap();
        let second = bind_listener(addr, true).unwrap();
        assert_eq!(second.local_addr().unwrap().port(), addr.port());
    }

    #[tokio::test]
    async fn bind_errors_surface_as_socket_creation() {
        let first = bind_listener("127.0.0.1:0".parse().unwrap(), false).unwrap();
        let addr = first.local_addr().unwrap();

        let err = bind_listener(addr, false).unwrap_err();
        assert!(matches!(err, VisprError::SocketCreation(_)));
    }
}
