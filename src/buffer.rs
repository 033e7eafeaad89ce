//! Append-only byte container used as the read result and assembly target.
//!
//! `BufferList` owns an ordered sequence of [`Bytes`] chunks. Appending a
//! chunk transfers ownership without copying its payload, and the list
//! implements [`Buf`] so the write path can hand every chunk to the
//! transport as one scatter-gather operation.

use std::{collections::VecDeque, io::IoSlice};

use bytes::{Buf, Bytes};

/// Ordered, append-only sequence of byte chunks.
///
/// Chunks keep their backing storage alive through [`Bytes`] reference
/// counting, so a list may share storage with other lists or with the
/// chunk source it was assembled from.
#[derive(Clone, Debug, Default)]
pub struct BufferList {
    chunks: VecDeque<Bytes>,
    len: usize,
}

impl BufferList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a chunk, taking ownership without copying.
    ///
    /// Empty chunks are discarded; every stored chunk holds at least one
    /// byte.
    pub fn push(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }
        self.len += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// Total number of bytes across all chunks.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    /// Returns true if the list holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Number of chunks currently held.
    #[must_use]
    pub fn chunk_count(&self) -> usize { self.chunks.len() }

    /// Iterate over the chunks in order.
    pub fn iter(&self) -> impl Iterator<Item = &Bytes> { self.chunks.iter() }

    /// Copy all chunks into one contiguous buffer.
    ///
    /// This is the only copying operation on the list; a single-chunk list
    /// returns its chunk without copying.
    #[must_use]
    pub fn coalesce(&self) -> Bytes {
        if self.chunks.len() == 1 {
            if let Some(chunk) = self.chunks.front() {
                return chunk.clone();
            }
        }
        let mut flat = Vec::with_capacity(self.len);
        for chunk in &self.chunks {
            flat.extend_from_slice(chunk);
        }
        Bytes::from(flat)
    }
}

impl From<Bytes> for BufferList {
    fn from(chunk: Bytes) -> Self {
        let mut list = Self::new();
        list.push(chunk);
        list
    }
}

impl Buf for BufferList {
    fn remaining(&self) -> usize { self.len }

    fn chunk(&self) -> &[u8] {
        self.chunks.front().map_or(&[], |chunk| chunk.as_ref())
    }

    fn advance(&mut self, mut cnt: usize) {
        assert!(
            cnt <= self.len,
            "cannot advance past the end of the buffer list"
        );
        self.len -= cnt;
        while cnt > 0 {
            let Some(front) = self.chunks.front_mut() else {
                unreachable!("chunk bytes must cover the advanced count");
            };
            if cnt < front.len() {
                front.advance(cnt);
                break;
            }
            cnt -= front.len();
            self.chunks.pop_front();
        }
    }

    fn chunks_vectored<'a>(&'a self, dst: &mut [IoSlice<'a>]) -> usize {
        let filled = self.chunks.len().min(dst.len());
        for (slot, chunk) in dst.iter_mut().zip(self.chunks.iter()) {
            *slot = IoSlice::new(chunk);
        }
        filled
    }
}
