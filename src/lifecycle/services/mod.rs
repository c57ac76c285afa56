//! Application services for resumable resource lifecycles.

mod controller;
mod error;
mod poller;
mod reconciliation;

pub use controller::{AssociationSource, Created, Deleted, ResourceLifecycle, Updated};
pub use error::{LifecycleError, LifecycleResult};
pub use poller::{DEFAULT_POLL_INTERVAL, TaskPoller};
pub use reconciliation::{TaskHistoryScanner, reconcile};
