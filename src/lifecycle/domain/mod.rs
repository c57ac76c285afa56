//! Domain model for resumable resource lifecycles.
//!
//! Remote tasks are observed, never mutated. A [`ContinuationToken`] carries
//! the in-flight task id between invocations and a [`Budget`] bounds how long
//! one invocation may wait.

mod budget;
mod error;
mod progress;
mod resource;
mod task;

pub use budget::Budget;
pub use error::LifecycleDomainError;
pub use progress::{ContinuationToken, Progress};
pub use resource::{Operation, ResourceKind};
pub use task::{CommandType, RemoteTask, TaskCompletion, TaskId, TaskResponse, TaskStatus};
