//! Shared test helpers for in-process integration tests.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use stratus::association::{
    adapters::{
        memory::InMemoryObjectStorage,
        object_storage::{ObjectStorageAssociationStore, ObjectStorageConfig},
    },
    domain::{PrimaryId, ResourceId},
    ports::AssociationStore,
};
use stratus::lifecycle::{
    adapters::InMemoryRemoteApi,
    domain::{Budget, ResourceKind},
    services::ResourceLifecycle,
};

/// Bucket backing the object-storage association store.
pub const BUCKET: &str = "stratus-associations";

/// Poll interval short enough to keep the suite fast.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Association store over in-memory object storage.
pub type ObjectStore = ObjectStorageAssociationStore<InMemoryObjectStorage>;

/// Controller type used across the suite.
pub type Controller = ResourceLifecycle<InMemoryRemoteApi, ObjectStore>;

/// Provides object storage with the association bucket created.
#[fixture]
pub fn storage() -> Arc<InMemoryObjectStorage> {
    Arc::new(
        InMemoryObjectStorage::new()
            .with_bucket(BUCKET)
            .expect("bucket created"),
    )
}

/// Builds a fresh controller over shared, durable state, the way each
/// short-lived invocation would.
pub fn controller(
    kind: ResourceKind,
    api: &Arc<InMemoryRemoteApi>,
    storage: &Arc<InMemoryObjectStorage>,
) -> Controller {
    let root = ObjectStorageAssociationStore::new(
        Arc::clone(storage),
        ObjectStorageConfig::new(BUCKET),
    );
    let store = Arc::new(root.scoped(kind.namespace()));
    ResourceLifecycle::new(kind, Arc::clone(api), store).with_poll_interval(POLL_INTERVAL)
}

/// Budget generous enough for the simulated API to finish.
#[must_use]
pub fn generous() -> Budget {
    Budget::with_timeout(Duration::from_secs(5))
}

/// Budget that expires before a pending task can finish.
#[must_use]
pub fn tight() -> Budget {
    Budget::with_timeout(Duration::from_millis(10))
}

/// Parses a resource id literal.
#[must_use]
pub fn rid(raw: u64) -> ResourceId {
    ResourceId::new(raw).expect("non-zero resource id")
}

/// Parses a primary id literal.
#[must_use]
pub fn pid(raw: &str) -> PrimaryId {
    PrimaryId::new(raw).expect("valid primary id")
}
