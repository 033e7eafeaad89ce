//! Connection handle: counted reads, ordered writes, and teardown.
//!
//! `Socket` wraps one established connection and is the only surface upper
//! protocol layers touch. Reads drive the assembly algorithm until the
//! requested count is met or the stream ends; writes go through a large
//! buffered output half with explicit flush control; teardown follows the
//! `shutdown`/`close` lifecycle with a fail-fast classification of
//! close-time errors.
//!
//! The handle is generic over its input and output halves so the close
//! path can be exercised against fault-injecting transports; [`TcpSocket`]
//! is the production instantiation.

use std::{io, net::Shutdown};

use bytes::Bytes;
use futures::future;
use socket2::SockRef;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};
use tracing::{debug, error, trace};

use crate::{
    assembly::{Assembler, Feed},
    buffer::BufferList,
    error::{CloseStage, FatalClose, Result, SocketError},
    lifecycle::{Enforcement, LifecycleState},
    reader::{ChunkReader, InputClose},
    shard::ShardId,
};

/// Default size of the buffered output half.
///
/// The runtime default of 8 KiB causes small writes to reach the transport
/// individually, which hurts write throughput; a generously larger buffer
/// is a tuning choice, not a correctness one.
pub const OUTPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Construction-time knobs for a socket.
#[derive(Clone, Copy, Debug)]
pub struct SocketOptions {
    /// Capacity of the buffered output half.
    pub output_buffer_size: usize,
    /// How lifecycle misuse is treated.
    pub enforcement: Enforcement,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            output_buffer_size: OUTPUT_BUFFER_SIZE,
            enforcement: Enforcement::default(),
        }
    }
}

/// The production socket type produced by the establishment factories.
pub type TcpSocket = Socket<OwnedReadHalf, OwnedWriteHalf>;

/// Connection handle bound to one execution context.
///
/// Owns the connection exclusively. Every method takes `&mut self`, so at
/// most one read (and one write) is in flight at a time and sequential
/// calls execute in issuance order. The handle is not clonable; it moves
/// between contexts only through [`SocketTransfer`].
///
/// [`SocketTransfer`]: crate::transfer::SocketTransfer
pub struct Socket<R, W> {
    shard: ShardId,
    rx: ChunkReader<R>,
    tx: BufWriter<W>,
    state: LifecycleState,
    enforcement: Enforcement,
}

impl<R, W> Socket<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Build a socket from raw input and output halves, bound to the
    /// calling context.
    pub fn from_parts(input: R, output: W, options: SocketOptions) -> Self {
        Self {
            shard: ShardId::current(),
            rx: ChunkReader::new(input),
            tx: BufWriter::with_capacity(options.output_buffer_size, output),
            state: LifecycleState::Open,
            enforcement: options.enforcement,
        }
    }

    /// The execution context this socket is bound to.
    #[must_use]
    pub fn shard(&self) -> ShardId { self.shard }

    /// Current lifecycle position.
    #[must_use]
    pub fn state(&self) -> LifecycleState { self.state }

    pub(crate) fn rebind(&mut self, shard: ShardId) { self.shard = shard; }

    fn check_affinity(&self) {
        debug_assert_eq!(
            self.shard,
            ShardId::current(),
            "socket used off its owning execution context"
        );
    }

    fn transition(&mut self, to: LifecycleState) -> Result<()> {
        match self.state.advance(to) {
            Ok(()) => Ok(()),
            Err(violation) => match self.enforcement {
                Enforcement::Abort => panic!("socket lifecycle violation: {violation}"),
                Enforcement::Reject => Err(SocketError::Lifecycle(violation)),
            },
        }
    }

    /// Read exactly `bytes` bytes into a [`BufferList`].
    ///
    /// Chunks are appended without copying; a chunk that overshoots the
    /// request is split and its tail replayed on the next read. `bytes ==
    /// 0` returns an empty list without touching the transport.
    ///
    /// # Errors
    ///
    /// [`SocketError::ReadEof`] if the stream ends before `bytes` bytes
    /// arrive; [`SocketError::Io`] on transport failure.
    pub async fn read(&mut self, bytes: usize) -> Result<BufferList> {
        self.check_affinity();
        if bytes == 0 {
            return Ok(BufferList::new());
        }
        let mut assembler = Assembler::new(bytes);
        loop {
            let chunk = self.rx.next_chunk().await?;
            if chunk.is_empty() {
                // End of stream before the target was met.
                break;
            }
            match assembler.feed(chunk) {
                Feed::More => {}
                Feed::Done { tail } => {
                    if let Some(tail) = tail {
                        self.rx.unread(tail);
                    }
                    break;
                }
            }
        }
        if assembler.remaining() != 0 {
            return Err(SocketError::ReadEof);
        }
        Ok(assembler.into_buffer())
    }

    /// Read exactly `bytes` bytes into one contiguous buffer.
    ///
    /// Serves from the replayed tail without copying when possible. A
    /// short result, whether the stream ended before or during the read,
    /// is escalated to [`SocketError::ReadEof`]; a partial prefix is never
    /// returned as success.
    ///
    /// # Errors
    ///
    /// [`SocketError::ReadEof`] on a short result; [`SocketError::Io`] on
    /// transport failure.
    pub async fn read_exactly(&mut self, bytes: usize) -> Result<Bytes> {
        self.check_affinity();
        if bytes == 0 {
            return Ok(Bytes::new());
        }
        let buf = self.rx.read_exact_bytes(bytes).await?;
        if buf.len() < bytes {
            return Err(SocketError::ReadEof);
        }
        Ok(buf)
    }

    /// Hand a scatter-gather buffer to the output half.
    ///
    /// Completion means the bytes are buffered, not transmitted; call
    /// [`flush`](Self::flush) to push them to the transport. Suspends when
    /// the output buffer is full.
    ///
    /// # Errors
    ///
    /// [`SocketError::Io`] on transport failure.
    pub async fn write(&mut self, mut buf: BufferList) -> Result<()> {
        self.check_affinity();
        self.tx.write_all_buf(&mut buf).await?;
        Ok(())
    }

    /// Suspend until previously written bytes reach the transport.
    ///
    /// # Errors
    ///
    /// [`SocketError::Io`] on transport failure.
    pub async fn flush(&mut self) -> Result<()> {
        self.check_affinity();
        self.tx.flush().await?;
        Ok(())
    }

    /// Write then flush as a strictly ordered pair.
    ///
    /// # Errors
    ///
    /// [`SocketError::Io`] on transport failure in either step.
    pub async fn write_flush(&mut self, buf: BufferList) -> Result<()> {
        self.write(buf).await?;
        self.flush().await
    }

    /// Release the input and output resources concurrently, waiting for
    /// both. Can run once; typically preceded by `shutdown`.
    ///
    /// The output release forgives `BrokenPipe` and `ConnectionReset`,
    /// the expected outcomes of closing a connection the peer already
    /// terminated or that was shut down. Any other error from either half
    /// is logged and surfaced as [`SocketError::FatalClose`]; the owning
    /// supervisor is expected to terminate on it, since a failure here
    /// indicates an invariant violation that cannot be continued past.
    ///
    /// # Errors
    ///
    /// [`SocketError::FatalClose`] as above; [`SocketError::Lifecycle`]
    /// on a repeated close under [`Enforcement::Reject`].
    ///
    /// # Panics
    ///
    /// Panics on a repeated close under [`Enforcement::Abort`].
    pub async fn close(&mut self) -> Result<()>
    where
        R: InputClose,
    {
        self.check_affinity();
        self.transition(LifecycleState::Closed)?;
        let (input, output) =
            future::join(self.rx.close(), close_output(&mut self.tx)).await;
        let fatal = match (input, output) {
            (Ok(()), Ok(())) => return Ok(()),
            (Err(source), _) => FatalClose { stage: CloseStage::Input, source },
            (Ok(()), Err(source)) => FatalClose { stage: CloseStage::Output, source },
        };
        error!("socket close failed: {fatal}");
        Err(SocketError::FatalClose(fatal))
    }
}

/// Flush buffered bytes and shut the output half down, forgiving the
/// error kinds expected of an already-terminated connection.
async fn close_output<W: AsyncWrite + Unpin>(tx: &mut BufWriter<W>) -> io::Result<()> {
    match tx.shutdown().await {
        Ok(()) => Ok(()),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset
            ) =>
        {
            debug!("ignoring expected error while closing output: {error}");
            Ok(())
        }
        Err(error) => Err(error),
    }
}

impl TcpSocket {
    pub(crate) fn from_stream(stream: TcpStream, options: SocketOptions) -> Self {
        let (input, output) = stream.into_split();
        Self::from_parts(input, output, options)
    }

    fn stream(&self) -> &TcpStream { self.rx.get_ref().as_ref() }

    /// Disable further input and output delivery at the transport level.
    ///
    /// Releases nothing and waits for nothing; its purpose is to make a
    /// read or write currently suspended on this connection fail promptly
    /// during coordinated teardown instead of hanging. Can run once.
    ///
    /// # Errors
    ///
    /// [`SocketError::Io`] if the transport rejects the shutdown (a
    /// not-connected socket is tolerated); [`SocketError::Lifecycle`] on
    /// a repeated shutdown under [`Enforcement::Reject`].
    ///
    /// # Panics
    ///
    /// Panics on a repeated shutdown under [`Enforcement::Abort`].
    pub fn shutdown(&mut self) -> Result<()> {
        self.transition(LifecycleState::ShutdownIssued)?;
        if let Err(error) = SockRef::from(self.stream()).shutdown(Shutdown::Both) {
            if error.kind() != io::ErrorKind::NotConnected {
                return Err(SocketError::Io(error));
            }
            trace!("shutdown raced with peer disconnect: {error}");
        }
        Ok(())
    }

    /// Shut down the input direction only, leaving the lifecycle state
    /// untouched. Intended for tests and partial-teardown scenarios.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the transport rejects the shutdown.
    pub fn force_shutdown_input(&self) -> io::Result<()> {
        SockRef::from(self.stream()).shutdown(Shutdown::Read)
    }

    /// Shut down the output direction only, leaving the lifecycle state
    /// untouched. Intended for tests and partial-teardown scenarios.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the transport rejects the shutdown.
    pub fn force_shutdown_output(&self) -> io::Result<()> {
        SockRef::from(self.stream()).shutdown(Shutdown::Write)
    }
}

impl<R, W> Drop for Socket<R, W> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            debug_assert!(
                self.state.is_closed(),
                "socket dropped before close() completed"
            );
        }
    }
}
