//! Port contracts for the lifecycle context.

pub mod remote;
pub mod waiter;

pub use remote::{RemoteApi, RemoteApiError, RemoteApiResult, SubmitRequest};
pub use waiter::{TaskWaiter, WaitError, WaitResult};
