//! Shared world state for resumable lifecycle BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use stratus::association::{adapters::memory::InMemoryAssociationStore, domain::PrimaryId};
use stratus::lifecycle::{
    adapters::InMemoryRemoteApi,
    domain::{ContinuationToken, Progress, ResourceKind},
    services::{Created, Deleted, LifecycleError, ResourceLifecycle, Updated},
};

/// Controller type used by the BDD world.
pub type TestController = ResourceLifecycle<InMemoryRemoteApi>;

/// What the most recent invocation returned.
pub enum Outcome {
    Created(Progress<Created>),
    Updated(Progress<Updated>),
    Deleted(Progress<Deleted>),
    Failed(LifecycleError),
}

/// Scenario world for resumable lifecycle behaviour tests.
pub struct LifecycleWorld {
    pub api: Arc<InMemoryRemoteApi>,
    pub store: Arc<InMemoryAssociationStore>,
    pub controller: TestController,
    pub primary_id: Option<PrimaryId>,
    pub token: ContinuationToken,
    pub outcome: Option<Outcome>,
}

impl LifecycleWorld {
    /// Creates a world over a simulated API.
    #[must_use]
    pub fn new(api: InMemoryRemoteApi) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(InMemoryAssociationStore::new());
        let controller = ResourceLifecycle::new(
            ResourceKind::cloud_account(),
            Arc::clone(&api),
            Arc::clone(&store),
        )
        .with_poll_interval(Duration::from_millis(2));
        Self {
            api,
            store,
            controller,
            primary_id: None,
            token: ContinuationToken::empty(),
            outcome: None,
        }
    }

    /// Records the result of an invocation.
    pub fn record<T>(&mut self, result: Result<T, LifecycleError>, wrap: fn(T) -> Outcome) {
        self.outcome = Some(match result {
            Ok(progress) => wrap(progress),
            Err(err) => Outcome::Failed(err),
        });
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new(InMemoryRemoteApi::default())
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a primary id from scenario text.
pub fn primary_id(name: &str) -> Result<PrimaryId, eyre::Report> {
    PrimaryId::new(name).map_err(|err| eyre::eyre!("invalid primary id {name:?}: {err}"))
}
