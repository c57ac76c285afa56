//! Error taxonomy of the lifecycle controller.

use crate::association::{domain::PrimaryId, ports::AssociationError};
use crate::lifecycle::{
    domain::TaskId,
    ports::{RemoteApiError, WaitError},
};
use serde_json::Value;
use thiserror::Error;

/// Terminal failures of a lifecycle operation.
///
/// Continuation is not represented here; see
/// [`Progress::Pending`](crate::lifecycle::domain::Progress::Pending).
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No live association for the primary id, or the remote resource is
    /// gone.
    #[error("no live resource for primary id {0}")]
    NotFound(PrimaryId),

    /// The remote task ended with `processing-error`.
    #[error("task {task_id} failed: {detail}")]
    TaskFailed {
        /// Failed task.
        task_id: TaskId,
        /// Server-reported error payload, verbatim.
        detail: Value,
    },

    /// A create task completed without reporting a resource id.
    #[error("task {0} completed without a resource id")]
    MissingResourceId(TaskId),

    /// Request or transport failure talking to the remote API.
    #[error(transparent)]
    Remote(#[from] RemoteApiError),

    /// The association backend failed or holds a malformed entry.
    #[error(transparent)]
    Association(#[from] AssociationError),

    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),
}

impl LifecycleError {
    /// Returns `true` for [`LifecycleError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<WaitError> for LifecycleError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::TaskFailed { task_id, detail } => Self::TaskFailed { task_id, detail },
            WaitError::Remote(remote) => Self::Remote(remote),
        }
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
