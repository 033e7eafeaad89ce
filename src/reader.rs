//! Input-side transport boundary: chunked delivery with pushback.
//!
//! `ChunkReader` turns any [`AsyncRead`] into the chunk source the
//! assembly algorithm drives: it yields whatever the transport delivers as
//! refcounted [`Bytes`] chunks, accepts the unconsumed tail of a read back
//! via [`unread`](ChunkReader::unread), and provides the exact-count
//! primitive backing `read_exactly`.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

/// Capacity of the fill buffer behind [`ChunkReader::next_chunk`]. Chunks
/// are at most this large; they are as small as the transport delivers.
const CHUNK_CAPACITY: usize = 8 * 1024;

/// Transport-specific release of the input resource, awaited by `close()`.
///
/// For TCP there is nothing to release beyond dropping the half, so the
/// implementation is a no-op; in-memory and fault-injecting transports
/// supply their own.
pub trait InputClose {
    /// Release the input resource.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the transport fails to release the
    /// resource. Any such error is classified as fatal by `close()`.
    fn close(&mut self) -> impl Future<Output = io::Result<()>>;
}

impl InputClose for tokio::net::tcp::OwnedReadHalf {
    async fn close(&mut self) -> io::Result<()> { Ok(()) }
}

impl<T> InputClose for tokio::io::ReadHalf<T> {
    async fn close(&mut self) -> io::Result<()> { Ok(()) }
}

/// Chunk source over an async byte stream.
///
/// Holds at most one pushed-back chunk: the tail a previous read left
/// unconsumed, replayed before any further transport I/O.
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: R,
    pending: Option<Bytes>,
}

impl<R> ChunkReader<R> {
    /// Wrap a transport input half.
    pub fn new(inner: R) -> Self {
        Self { inner, pending: None }
    }

    /// Access the underlying input half.
    pub fn get_ref(&self) -> &R { &self.inner }

    /// Hand back the unconsumed tail of the current chunk.
    ///
    /// The tail becomes the first chunk of the next read. At most one tail
    /// may be outstanding; the assembly driver consumes the pending chunk
    /// before it can push another back.
    pub fn unread(&mut self, tail: Bytes) {
        debug_assert!(self.pending.is_none(), "a pushed-back tail is already pending");
        if !tail.is_empty() {
            self.pending = Some(tail);
        }
    }
}

impl<R: InputClose> ChunkReader<R> {
    /// Release the input resource, discarding any replayed tail.
    ///
    /// Bytes past the last completed read are forfeit once the socket
    /// closes.
    pub(crate) async fn close(&mut self) -> io::Result<()> {
        self.pending = None;
        self.inner.close().await
    }
}

impl<R: AsyncRead + Unpin> ChunkReader<R> {
    /// Yield the next chunk, replaying a pushed-back tail first.
    ///
    /// An empty chunk signals end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if reading from the transport fails.
    pub async fn next_chunk(&mut self) -> io::Result<Bytes> {
        if let Some(tail) = self.pending.take() {
            return Ok(tail);
        }
        let mut fill = BytesMut::with_capacity(CHUNK_CAPACITY);
        let delivered = self.inner.read_buf(&mut fill).await?;
        trace!(bytes = delivered, "chunk delivered");
        Ok(fill.freeze())
    }

    /// Exact-count read primitive.
    ///
    /// Serves entirely from the pushed-back tail without copying when it
    /// covers the request; otherwise gathers into one contiguous buffer.
    /// If the stream ends early the short result is returned as-is; the
    /// socket layer decides how to classify it.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if reading from the transport fails.
    pub async fn read_exact_bytes(&mut self, count: usize) -> io::Result<Bytes> {
        if count == 0 {
            return Ok(Bytes::new());
        }
        let mut gathered = BytesMut::with_capacity(count);
        if let Some(mut tail) = self.pending.take() {
            if tail.len() >= count {
                let head = tail.split_to(count);
                self.unread(tail);
                return Ok(head);
            }
            gathered.extend_from_slice(&tail);
        }
        while gathered.len() < count {
            // Cap each fill at the outstanding count so the primitive never
            // reads past the request.
            let remaining = count - gathered.len();
            let mut window = (&mut gathered).limit(remaining);
            let delivered = self.inner.read_buf(&mut window).await?;
            if delivered == 0 {
                break;
            }
        }
        Ok(gathered.freeze())
    }
}
