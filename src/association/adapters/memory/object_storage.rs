//! In-memory object storage for tests and local runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use crate::association::ports::{ObjectStorage, ObjectStorageError, ObjectStorageResult};

/// Thread-safe in-memory bucket/key store.
///
/// Buckets must be created with [`InMemoryObjectStorage::with_bucket`] before
/// use; operations on unknown buckets fail with
/// [`ObjectStorageError::NoSuchBucket`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStorage {
    buckets: Arc<RwLock<BTreeMap<String, BTreeSet<String>>>>,
}

impl InMemoryObjectStorage {
    /// Creates storage with no buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty bucket.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError::Backend`] when the bucket lock is
    /// poisoned.
    pub fn with_bucket(self, bucket: impl Into<String>) -> ObjectStorageResult<Self> {
        self.buckets
            .write()
            .map_err(lock_error)?
            .entry(bucket.into())
            .or_default();
        Ok(self)
    }

    /// Returns all keys in `bucket`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStorageError::NoSuchBucket`] for unknown buckets.
    pub fn objects(&self, bucket: &str) -> ObjectStorageResult<Vec<String>> {
        let buckets = self.buckets.read().map_err(lock_error)?;
        let keys = buckets
            .get(bucket)
            .ok_or_else(|| ObjectStorageError::NoSuchBucket(bucket.to_owned()))?;
        Ok(keys.iter().cloned().collect())
    }
}

fn lock_error(err: impl std::fmt::Display) -> ObjectStorageError {
    ObjectStorageError::backend(std::io::Error::other(err.to_string()))
}

/// Rolls `key` up to the first `delimiter` after `prefix`.
fn common_prefix(key: &str, prefix: &str, delimiter: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix)?;
    let (head, _) = rest.split_once(delimiter)?;
    Some(format!("{prefix}{head}{delimiter}"))
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn list_common_prefixes(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> ObjectStorageResult<Vec<String>> {
        let prefixes: BTreeSet<String> = self
            .objects(bucket)?
            .iter()
            .filter_map(|key| common_prefix(key, prefix, delimiter))
            .collect();
        Ok(prefixes.into_iter().collect())
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> ObjectStorageResult<Vec<String>> {
        let keys = self.objects(bucket)?;
        Ok(keys.into_iter().filter(|key| key.starts_with(prefix)).collect())
    }

    async fn put_marker(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        let mut buckets = self.buckets.write().map_err(lock_error)?;
        let keys = buckets
            .get_mut(bucket)
            .ok_or_else(|| ObjectStorageError::NoSuchBucket(bucket.to_owned()))?;
        keys.insert(key.to_owned());
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        let mut buckets = self.buckets.write().map_err(lock_error)?;
        let keys = buckets
            .get_mut(bucket)
            .ok_or_else(|| ObjectStorageError::NoSuchBucket(bucket.to_owned()))?;
        keys.remove(key);
        Ok(())
    }
}
