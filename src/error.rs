//! Canonical error and result types for the crate.
//!
//! `SocketError` is the single error surface of the socket layer. It
//! distinguishes a clean end-of-stream during a counted read from ordinary
//! transport failures, close-time failures classified as fatal, and
//! lifecycle misuse reported under [`Enforcement::Reject`].
//!
//! [`Enforcement::Reject`]: crate::lifecycle::Enforcement::Reject

use std::io;

use crate::lifecycle::LifecycleViolation;

/// Top-level error type exposed by `shardlink`.
#[derive(Debug)]
pub enum SocketError {
    /// The stream ended before the requested byte count was assembled.
    ///
    /// Protocol layers treat this as the normal "connection ended" signal
    /// for framing decisions; it is never retried here.
    ReadEof,
    /// An error from the underlying transport outside the close path.
    Io(io::Error),
    /// An unexpected failure during `close()`. The owning supervisor is
    /// expected to treat this as process-fatal; see [`FatalClose`].
    FatalClose(FatalClose),
    /// A repeated shutdown/close, reported instead of panicking when the
    /// socket runs with [`Enforcement::Reject`].
    ///
    /// [`Enforcement::Reject`]: crate::lifecycle::Enforcement::Reject
    Lifecycle(LifecycleViolation),
}

impl SocketError {
    /// Returns true if this error is the clean end-of-stream signal.
    #[must_use]
    pub fn is_read_eof(&self) -> bool { matches!(self, Self::ReadEof) }

    /// Returns true if this error demands fail-fast handling by the owner.
    #[must_use]
    pub fn is_fatal(&self) -> bool { matches!(self, Self::FatalClose(_)) }
}

impl From<io::Error> for SocketError {
    fn from(error: io::Error) -> Self { Self::Io(error) }
}

impl From<LifecycleViolation> for SocketError {
    fn from(violation: LifecycleViolation) -> Self { Self::Lifecycle(violation) }
}

impl std::fmt::Display for SocketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadEof => f.write_str("stream ended before the requested bytes arrived"),
            Self::Io(error) => write!(f, "transport error: {error}"),
            Self::FatalClose(fatal) => write!(f, "{fatal}"),
            Self::Lifecycle(violation) => write!(f, "lifecycle misuse: {violation}"),
        }
    }
}

impl std::error::Error for SocketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::FatalClose(fatal) => Some(&fatal.source),
            Self::Lifecycle(violation) => Some(violation),
            Self::ReadEof => None,
        }
    }
}

/// Which half of the teardown produced a fatal error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseStage {
    /// Releasing the input resource.
    Input,
    /// Releasing the output resource.
    Output,
}

impl std::fmt::Display for CloseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// An error that escaped `close()`'s expected-error filter.
///
/// By the time `close()` runs, every recoverable condition has already been
/// classified; anything outside the broken-pipe/connection-reset allow-list
/// indicates a logic or environment invariant violation. The error is
/// logged at the point of classification and handed up as this
/// distinguished value so the process owner can terminate.
#[derive(Debug)]
pub struct FatalClose {
    /// The teardown half that failed.
    pub stage: CloseStage,
    /// The underlying transport error.
    pub source: io::Error,
}

impl std::fmt::Display for FatalClose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unexpected error while releasing the {} resource: {}",
            self.stage, self.source
        )
    }
}

impl std::error::Error for FatalClose {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.source) }
}

/// Canonical result alias used by `shardlink` public APIs.
pub type Result<T> = std::result::Result<T, SocketError>;
