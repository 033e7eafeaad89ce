//! Incremental assembly of a target byte count from arbitrarily-sized chunks.
//!
//! The transport delivers bytes in chunks whose boundaries bear no relation
//! to the caller's read size. [`Assembler`] consumes those chunks one at a
//! time, appending them to a [`BufferList`] without copying, until the
//! requested count is reached. A chunk that overshoots the target is split
//! in place: the front share is appended and the tail is handed back so the
//! chunk source can replay it on the next logical read.

use bytes::Bytes;

use crate::buffer::BufferList;

/// Outcome of feeding one chunk to an [`Assembler`].
#[derive(Debug)]
pub enum Feed {
    /// The whole chunk was consumed and more input is needed.
    More,
    /// The target count has been reached. `tail` holds the unconsumed
    /// remainder of the final chunk, if any, still sharing its storage.
    Done {
        /// Bytes past the target, to be replayed by the chunk source.
        tail: Option<Bytes>,
    },
}

/// Per-read assembly state: the accumulated buffer and the byte count
/// still outstanding.
#[derive(Debug)]
pub struct Assembler {
    buffer: BufferList,
    remaining: usize,
}

impl Assembler {
    /// Start assembling `target` bytes into an empty buffer.
    #[must_use]
    pub fn new(target: usize) -> Self {
        Self {
            buffer: BufferList::new(),
            remaining: target,
        }
    }

    /// Bytes still needed to reach the target.
    #[must_use]
    pub fn remaining(&self) -> usize { self.remaining }

    /// Consume one chunk.
    ///
    /// A chunk no larger than the outstanding count is appended whole,
    /// transferring ownership. A larger chunk is split: the front
    /// `remaining` bytes are appended as a zero-copy sub-range share and
    /// the tail comes back in [`Feed::Done`]. No payload bytes are copied
    /// in either case.
    pub fn feed(&mut self, mut chunk: Bytes) -> Feed {
        debug_assert!(!chunk.is_empty(), "EOF must be handled by the driver");
        if chunk.len() <= self.remaining {
            self.remaining -= chunk.len();
            self.buffer.push(chunk);
            if self.remaining > 0 {
                Feed::More
            } else {
                Feed::Done { tail: None }
            }
        } else {
            let tail = chunk.split_off(self.remaining);
            self.remaining = 0;
            self.buffer.push(chunk);
            Feed::Done { tail: Some(tail) }
        }
    }

    /// Take the assembled buffer.
    #[must_use]
    pub fn into_buffer(self) -> BufferList { self.buffer }
}
