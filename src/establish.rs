//! Establishment factories: active open and passive accept.
//!
//! Both factories yield a [`TcpSocketTransfer`] so the new connection can
//! be handed to the context that will own it. `accept` additionally
//! normalizes the peer's low-level address into a [`PeerAddr`] value owned
//! by the caller, with no further tie to the socket.

use std::{io, net::SocketAddr};

use tokio::net::{TcpListener, TcpStream};
use tracing::trace;

use crate::{
    socket::{SocketOptions, TcpSocket},
    transfer::{SocketTransfer, TcpSocketTransfer},
};

/// Generic address-type tag carried by a [`PeerAddr`].
///
/// Accepted connections are tagged [`AddrKind::Any`] regardless of how the
/// connecting side encoded its own address type; higher layers refine the
/// tag once the peer identifies itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddrKind {
    /// Address type not yet determined by the protocol.
    #[default]
    Any,
    /// IPv4 endpoint.
    V4,
    /// IPv6 endpoint.
    V6,
}

impl std::fmt::Display for AddrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::V4 => f.write_str("v4"),
            Self::V6 => f.write_str("v6"),
        }
    }
}

/// Peer address produced once at accept time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeerAddr {
    kind: AddrKind,
    addr: SocketAddr,
}

impl PeerAddr {
    /// Normalize an accepted connection's low-level address.
    #[must_use]
    pub fn from_accepted(addr: SocketAddr) -> Self {
        Self { kind: AddrKind::Any, addr }
    }

    /// The generic address-type tag.
    #[must_use]
    pub fn kind(&self) -> AddrKind { self.kind }

    /// The transport-level socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr { self.addr }
}

impl std::fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.addr)
    }
}

/// Actively open a connection to `addr` with default options.
///
/// # Errors
///
/// Returns an [`io::Error`] if the transport-level connect fails.
pub async fn connect(addr: SocketAddr) -> io::Result<TcpSocketTransfer> {
    connect_with(addr, SocketOptions::default()).await
}

/// Actively open a connection to `addr`.
///
/// The socket starts bound to the calling context and is transferable
/// exactly once via the returned wrapper.
///
/// # Errors
///
/// Returns an [`io::Error`] if the transport-level connect fails.
pub async fn connect_with(
    addr: SocketAddr,
    options: SocketOptions,
) -> io::Result<TcpSocketTransfer> {
    let stream = TcpStream::connect(addr).await?;
    trace!(peer = %addr, "connection established");
    Ok(SocketTransfer::new(TcpSocket::from_stream(stream, options)))
}

/// Await the next pending connection on `listener` with default options.
///
/// # Errors
///
/// Returns an [`io::Error`] if accepting fails.
pub async fn accept(listener: &TcpListener) -> io::Result<(TcpSocketTransfer, PeerAddr)> {
    accept_with(listener, SocketOptions::default()).await
}

/// Await the next pending connection on `listener`.
///
/// On success the peer's low-level address is normalized into a
/// [`PeerAddr`] and returned alongside the transferable socket.
///
/// # Errors
///
/// Returns an [`io::Error`] if accepting fails.
pub async fn accept_with(
    listener: &TcpListener,
    options: SocketOptions,
) -> io::Result<(TcpSocketTransfer, PeerAddr)> {
    let (stream, paddr) = listener.accept().await?;
    trace!(peer = %paddr, "connection accepted");
    let peer = PeerAddr::from_accepted(paddr);
    Ok((SocketTransfer::new(TcpSocket::from_stream(stream, options)), peer))
}
