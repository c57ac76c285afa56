//! Object storage port used by the object-storage association backend.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for object storage operations.
pub type ObjectStorageResult<T> = Result<T, ObjectStorageError>;

/// Minimal bucket/key object storage contract.
///
/// Only the operations needed to maintain empty marker objects are exposed.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Lists the distinct common prefixes under `prefix`, rolled up at the
    /// first `delimiter` after it. Returned prefixes include `prefix` and end
    /// with `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError`] when the listing fails.
    async fn list_common_prefixes(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> ObjectStorageResult<Vec<String>>;

    /// Lists every object key starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError`] when the listing fails.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> ObjectStorageResult<Vec<String>>;

    /// Writes an empty object at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError`] when the write fails.
    async fn put_marker(&self, bucket: &str, key: &str) -> ObjectStorageResult<()>;

    /// Deletes the object at `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError`] when the delete fails.
    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()>;
}

/// Errors returned by object storage implementations.
#[derive(Debug, Clone, Error)]
pub enum ObjectStorageError {
    /// The bucket does not exist.
    #[error("no such bucket: {0}")]
    NoSuchBucket(String),

    /// Backend failure.
    #[error("object storage error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl ObjectStorageError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
