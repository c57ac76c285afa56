//! Continuation tokens and the complete-or-pending result of a tick.

use super::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-held handle for resuming an in-flight operation.
///
/// The token is the id of the in-flight task. The empty token means the
/// operation has not been started yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Returns the empty, not-yet-started token.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Returns `true` when no operation has been started.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the in-flight task id, or `None` for the empty token.
    #[must_use]
    pub fn task_id(&self) -> Option<TaskId> {
        TaskId::new(self.0.as_str()).ok()
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<TaskId> for ContinuationToken {
    fn from(task_id: TaskId) -> Self {
        Self(task_id.as_str().to_owned())
    }
}

impl From<&TaskId> for ContinuationToken {
    fn from(task_id: &TaskId) -> Self {
        Self(task_id.as_str().to_owned())
    }
}

impl From<String> for ContinuationToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContinuationToken {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one bounded tick of a resumable operation.
///
/// `Pending` is not a failure: the operation is still in flight and the
/// caller should invoke it again later with the returned token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Progress<T> {
    /// The operation reached a successful terminal outcome.
    Complete(T),
    /// The budget ran out before the task finished.
    Pending(ContinuationToken),
}

impl<T> Progress<T> {
    /// Returns `true` when the operation is still in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Returns the completed value, discarding a pending token.
    #[must_use]
    pub fn complete(self) -> Option<T> {
        match self {
            Self::Complete(value) => Some(value),
            Self::Pending(_) => None,
        }
    }

    /// Returns the continuation token of a pending tick.
    #[must_use]
    pub const fn pending_token(&self) -> Option<&ContinuationToken> {
        match self {
            Self::Complete(_) => None,
            Self::Pending(token) => Some(token),
        }
    }

    /// Maps the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Progress<U> {
        match self {
            Self::Complete(value) => Progress::Complete(f(value)),
            Self::Pending(token) => Progress::Pending(token),
        }
    }
}
