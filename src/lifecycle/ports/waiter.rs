//! Task waiting port.

use super::RemoteApiError;
use crate::lifecycle::domain::{Budget, Progress, TaskCompletion, TaskId};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Result type for [`TaskWaiter::wait`].
pub type WaitResult = Result<Progress<TaskCompletion>, WaitError>;

/// Waits for a remote task to reach a terminal status within a budget.
#[async_trait]
pub trait TaskWaiter: Send + Sync {
    /// Waits for `task_id`.
    ///
    /// Returns [`Progress::Pending`] carrying the task id when the budget runs
    /// out first.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::TaskFailed`] when the task ends in
    /// `processing-error` and [`WaitError::Remote`] when fetching it fails.
    async fn wait(&self, budget: &Budget, task_id: &TaskId) -> WaitResult;
}

/// Terminal failures observed while waiting.
#[derive(Debug, Clone, Error)]
pub enum WaitError {
    /// The task finished with `processing-error`.
    #[error("task {task_id} failed: {detail}")]
    TaskFailed {
        /// Failed task.
        task_id: TaskId,
        /// Server-reported error payload.
        detail: Value,
    },

    /// Fetching the task failed.
    #[error(transparent)]
    Remote(#[from] RemoteApiError),
}
