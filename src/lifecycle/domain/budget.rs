//! Wall-clock budget and cancellation for a single invocation.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline plus cancellation token threaded through every blocking call.
///
/// A budget is exhausted once its deadline passes or its token is
/// cancelled. Exhaustion turns an unfinished wait into
/// [`Progress::Pending`](super::Progress::Pending), never into an error.
#[derive(Debug, Clone)]
pub struct Budget {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl Budget {
    /// Budget ending `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::until(Instant::now() + timeout)
    }

    /// Budget ending at `deadline`.
    #[must_use]
    pub fn until(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancellation: CancellationToken::new(),
        }
    }

    /// Budget with no deadline; only cancellation ends it.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` once the deadline has passed or the token is cancelled.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cancellation.is_cancelled()
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves when the budget is exhausted.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {}
                    () = self.cancellation.cancelled() => {}
                }
            }
            None => self.cancellation.cancelled().await,
        }
    }
}
