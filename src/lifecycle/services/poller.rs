//! Bounded polling of a single remote task.

use crate::lifecycle::{
    domain::{Budget, ContinuationToken, Progress, TaskCompletion, TaskId, TaskStatus},
    ports::{RemoteApi, TaskWaiter, WaitError, WaitResult},
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default pause between two fetches of the same task.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls `GET /tasks/{id}` until the task is terminal or the budget ends.
///
/// The first fetch always runs, even on an exhausted budget, so a task that
/// is already terminal is never reported as pending. The deadline does not
/// interrupt it: it is bounded by the transport's request timeout and by a
/// cancellation arriving while it is in flight. Later fetches and every
/// pause are raced against the whole budget.
#[derive(Debug)]
pub struct TaskPoller<A: RemoteApi> {
    api: Arc<A>,
    interval: Duration,
}

impl<A: RemoteApi> Clone for TaskPoller<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            interval: self.interval,
        }
    }
}

impl<A: RemoteApi> TaskPoller<A> {
    /// Creates a poller using [`DEFAULT_POLL_INTERVAL`].
    #[must_use]
    pub const fn new(api: Arc<A>) -> Self {
        Self {
            api,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the pause between fetches.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the pause between fetches.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

fn pending(task_id: &TaskId) -> WaitResult {
    Ok(Progress::Pending(ContinuationToken::from(task_id)))
}

#[async_trait]
impl<A: RemoteApi> TaskWaiter for TaskPoller<A> {
    #[instrument(skip(self, budget), fields(task_id = %task_id))]
    async fn wait(&self, budget: &Budget, task_id: &TaskId) -> WaitResult {
        let mut task = if budget.cancellation().is_cancelled() {
            self.api.get_task(task_id).await?
        } else {
            tokio::select! {
                biased;
                fetched = self.api.get_task(task_id) => fetched?,
                () = budget.cancellation().cancelled() => return pending(task_id),
            }
        };
        loop {
            match task.status() {
                TaskStatus::ProcessingCompleted => {
                    debug!(command_type = %task.command_type(), "task completed");
                    return Ok(Progress::Complete(TaskCompletion::from_task(&task)));
                }
                TaskStatus::ProcessingError => {
                    return Err(WaitError::TaskFailed {
                        task_id: task_id.clone(),
                        detail: task.error_detail(),
                    });
                }
                status => debug!(%status, "task not finished"),
            }

            if budget.is_exhausted() {
                return pending(task_id);
            }
            let pause = budget
                .remaining()
                .map_or(self.interval, |remaining| remaining.min(self.interval));
            tokio::select! {
                biased;
                () = budget.expired() => return pending(task_id),
                () = tokio::time::sleep(pause) => {}
            }
            if budget.is_exhausted() {
                return pending(task_id);
            }
            task = tokio::select! {
                biased;
                () = budget.expired() => return pending(task_id),
                fetched = self.api.get_task(task_id) => fetched?,
            };
        }
    }
}
