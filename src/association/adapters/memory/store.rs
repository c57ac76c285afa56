//! In-memory association store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::association::{
    domain::{Namespace, PrimaryId, ResourceId},
    ports::{AssociationError, AssociationResult, AssociationStore},
};

type Entries = BTreeMap<Namespace, BTreeMap<PrimaryId, ResourceId>>;

/// Thread-safe in-memory association store.
///
/// Every store derived through clones or [`AssociationStore::scoped`] shares
/// one map keyed by namespace. Data only lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssociationStore {
    namespace: Namespace,
    entries: Arc<RwLock<Entries>>,
}

impl InMemoryAssociationStore {
    /// Creates an empty store in the root namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the namespace this store is scoped to.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

fn lock_error(err: impl std::fmt::Display) -> AssociationError {
    AssociationError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AssociationStore for InMemoryAssociationStore {
    async fn put(&self, primary_id: &PrimaryId, resource_id: ResourceId) -> AssociationResult<()> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        entries
            .entry(self.namespace.clone())
            .or_default()
            .insert(primary_id.clone(), resource_id);
        Ok(())
    }

    async fn get(&self, primary_id: &PrimaryId) -> AssociationResult<Option<ResourceId>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries
            .get(&self.namespace)
            .and_then(|scope| scope.get(primary_id))
            .copied())
    }

    async fn delete(&self, primary_id: &PrimaryId) -> AssociationResult<()> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        if let Some(scope) = entries.get_mut(&self.namespace) {
            scope.remove(primary_id);
        }
        Ok(())
    }

    async fn keys(&self) -> AssociationResult<Vec<PrimaryId>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries
            .get(&self.namespace)
            .map(|scope| scope.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn scoped(&self, namespace: &Namespace) -> Self {
        Self {
            namespace: namespace.clone(),
            entries: Arc::clone(&self.entries),
        }
    }

    async fn copy(&self, namespace: &Namespace) -> AssociationResult<Self> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        let snapshot = entries.get(&self.namespace).cloned().unwrap_or_default();
        entries.insert(namespace.clone(), snapshot);
        drop(entries);
        Ok(self.scoped(namespace))
    }
}
