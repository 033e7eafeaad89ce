//! Socket termination state machine.
//!
//! A socket moves through `Open -> ShutdownIssued -> Closed`, each
//! transition taken at most once. How a repeated transition is treated is a
//! runtime choice: [`Enforcement::Abort`] panics (the development-time
//! default) while [`Enforcement::Reject`] returns the violation as an
//! error, so both behaviours are exercisable from tests.

/// Lifecycle position of a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Fully usable; no teardown operation has been issued.
    Open,
    /// `shutdown()` has run; transport delivery is disabled but resources
    /// are still held.
    ShutdownIssued,
    /// `close()` has run. Terminal.
    Closed,
}

impl LifecycleState {
    /// Attempt a transition to `to`, mutating in place on success.
    ///
    /// Valid transitions: `Open -> ShutdownIssued`, `Open -> Closed`, and
    /// `ShutdownIssued -> Closed`.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleViolation`] describing the rejected transition.
    pub fn advance(&mut self, to: Self) -> Result<(), LifecycleViolation> {
        let allowed = matches!(
            (*self, to),
            (Self::Open, Self::ShutdownIssued)
                | (Self::Open, Self::Closed)
                | (Self::ShutdownIssued, Self::Closed)
        );
        if allowed {
            *self = to;
            Ok(())
        } else {
            Err(LifecycleViolation { from: *self, attempted: to })
        }
    }

    /// Returns true once `close()` has run.
    #[must_use]
    pub fn is_closed(self) -> bool { matches!(self, Self::Closed) }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::ShutdownIssued => "shutdown-issued",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A rejected lifecycle transition, such as a second `shutdown()` or a
/// `close()` after `close()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecycleViolation {
    /// State the socket was in when the transition was attempted.
    pub from: LifecycleState,
    /// State the transition tried to enter.
    pub attempted: LifecycleState,
}

impl std::fmt::Display for LifecycleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid lifecycle transition from {} to {}",
            self.from, self.attempted
        )
    }
}

impl std::error::Error for LifecycleViolation {}

/// How lifecycle misuse is enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Enforcement {
    /// Panic on a violated transition. Catches double shutdown/close during
    /// development at the cost of taking the process down.
    #[default]
    Abort,
    /// Surface the violation as [`crate::SocketError::Lifecycle`].
    Reject,
}
