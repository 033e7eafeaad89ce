//! Execution-context affinity tags.
//!
//! A shard is a single-threaded cooperative scheduling domain; here each
//! OS thread hosting a current-thread runtime counts as one shard. Sockets
//! record the shard they were built on and debug-assert that suspending
//! operations run there, mirroring the exclusive-ownership rule of the
//! concurrency model.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SHARD: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static CURRENT: ShardId = ShardId(NEXT_SHARD.fetch_add(1, Ordering::Relaxed));
}

/// Identifier of the execution context a socket is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShardId(u64);

impl ShardId {
    /// The shard of the calling thread, assigned on first use.
    #[must_use]
    pub fn current() -> Self { CURRENT.with(|id| *id) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(&self) -> u64 { self.0 }
}

impl std::fmt::Display for ShardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shard {}", self.0)
    }
}
