//! Association store port.

use crate::association::domain::{Namespace, PrimaryId, ResourceId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for association store operations.
pub type AssociationResult<T> = Result<T, AssociationError>;

/// Namespaced mapping from primary ids to resource ids.
///
/// Missing keys are never an error: `get` returns `None`, `delete` is a
/// no-op. Failures are reserved for backends that cannot be reached or whose
/// stored encoding cannot be read back.
#[async_trait]
pub trait AssociationStore: Send + Sync + Sized {
    /// Records `primary_id -> resource_id`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError`] when the backend rejects the write.
    async fn put(&self, primary_id: &PrimaryId, resource_id: ResourceId) -> AssociationResult<()>;

    /// Returns the resource id recorded for `primary_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError::Malformed`] when the stored encoding cannot
    /// be resolved to a single resource id.
    async fn get(&self, primary_id: &PrimaryId) -> AssociationResult<Option<ResourceId>>;

    /// Removes the association for `primary_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError`] when the backend rejects the delete.
    async fn delete(&self, primary_id: &PrimaryId) -> AssociationResult<()>;

    /// Returns every primary id with a live association, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError`] when the backend cannot be listed.
    async fn keys(&self) -> AssociationResult<Vec<PrimaryId>>;

    /// Returns an empty store over `namespace` sharing this store's backend.
    ///
    /// The namespace replaces, rather than nests under, the current one.
    #[must_use]
    fn scoped(&self, namespace: &Namespace) -> Self;

    /// Returns a store over `namespace` seeded with a snapshot of this
    /// store's entries. Later writes to either store are not visible in the
    /// other.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError`] when reading the source or writing the
    /// copy fails.
    async fn copy(&self, namespace: &Namespace) -> AssociationResult<Self> {
        let mut snapshot = Vec::new();
        for key in self.keys().await? {
            if let Some(resource_id) = self.get(&key).await? {
                snapshot.push((key, resource_id));
            }
        }
        let target = self.scoped(namespace);
        for key in target.keys().await? {
            target.delete(&key).await?;
        }
        for (key, resource_id) in &snapshot {
            target.put(key, *resource_id).await?;
        }
        Ok(target)
    }
}

/// Errors returned by association store implementations.
#[derive(Debug, Clone, Error)]
pub enum AssociationError {
    /// The stored encoding for a primary id does not resolve to exactly one
    /// resource id.
    #[error("resource id not found for primary id {primary_id}: {reason}")]
    Malformed {
        /// Primary id whose association could not be read.
        primary_id: PrimaryId,
        /// What was wrong with the stored encoding.
        reason: String,
    },

    /// The primary id cannot be encoded by this backend.
    #[error("primary id {0} cannot be stored by this backend")]
    UnsupportedPrimaryId(PrimaryId),

    /// Backend failure.
    #[error("association backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssociationError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Builds a [`AssociationError::Malformed`] error.
    pub fn malformed(primary_id: &PrimaryId, reason: impl Into<String>) -> Self {
        Self::Malformed {
            primary_id: primary_id.clone(),
            reason: reason.into(),
        }
    }
}
