//! One-time cross-context ownership transfer of a socket.
//!
//! The establishment factories hand back a `SocketTransfer` rather than a
//! bare socket: the accepting context may move the wrapper to the worker
//! context that will own the connection, and [`activate`] consumes the
//! wrapper while rebinding the socket's affinity. Because `activate` takes
//! the wrapper by value, a second transfer is impossible to express; after
//! activation the socket is permanently bound to its new context.
//!
//! [`activate`]: SocketTransfer::activate

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::{shard::ShardId, socket::Socket};

/// Transfer wrapper for the production socket type.
pub type TcpSocketTransfer = SocketTransfer<OwnedReadHalf, OwnedWriteHalf>;

/// A socket in transit between execution contexts.
///
/// The wrapped socket must not be used until activated; the wrapper
/// exposes no I/O surface, so this holds by construction.
pub struct SocketTransfer<R, W> {
    socket: Socket<R, W>,
}

impl<R, W> SocketTransfer<R, W> {
    /// Wrap a socket for transfer.
    #[must_use]
    pub fn new(socket: Socket<R, W>) -> Self { Self { socket } }

    /// Take ownership of the socket, binding it to the calling context.
    #[must_use]
    pub fn activate(self) -> Socket<R, W>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: tokio::io::AsyncWrite + Unpin,
    {
        let mut socket = self.socket;
        socket.rebind(ShardId::current());
        socket
    }
}
