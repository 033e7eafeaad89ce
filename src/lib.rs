//! Connection-level transport layer for a shard-scheduled messaging stack.
//!
//! This crate wraps a single established connection and gives upper
//! protocol layers three guarantees: counted reads that either return
//! exactly the requested bytes or fail cleanly with
//! [`SocketError::ReadEof`], ordered flush-controllable writes, and one
//! well-defined shutdown/close lifecycle with a fail-fast policy for
//! unexpected close-time errors. It moves and slices bytes; it never
//! interprets them.
//!
//! A connection is obtained from the [`establish`] factories, handed to
//! its owning execution context via [`SocketTransfer`], and driven through
//! [`Socket`]'s read/write surface until `shutdown` and [`Socket::close`]
//! tear it down.

pub mod assembly;
pub mod buffer;
pub mod error;
pub mod establish;
pub mod lifecycle;
pub mod reader;
pub mod shard;
pub mod socket;
pub mod transfer;

pub use assembly::{Assembler, Feed};
pub use buffer::BufferList;
pub use error::{CloseStage, FatalClose, Result, SocketError};
pub use establish::{AddrKind, PeerAddr, accept, accept_with, connect, connect_with};
pub use lifecycle::{Enforcement, LifecycleState, LifecycleViolation};
pub use reader::{ChunkReader, InputClose};
pub use shard::ShardId;
pub use socket::{OUTPUT_BUFFER_SIZE, Socket, SocketOptions, TcpSocket};
pub use transfer::{SocketTransfer, TcpSocketTransfer};
