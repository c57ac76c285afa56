//! Association store encoded as marker objects in object storage.
//!
//! Each association is an empty object at
//! `<prefix><d><PrimaryID><d><ResourceID><d>` where `<d>` is the configured
//! delimiter. Listing `<prefix><d>` with the delimiter yields one common
//! prefix per primary id; listing `<prefix><d><PrimaryID><d>` yields the
//! resource id segment.
//!
//! A named namespace `ns` replaces `<prefix><d>` with `<prefix>:<ns><d>`.
//! `:` is never part of a [`Namespace`], so no namespace's markers can fall
//! under another's listing prefix.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::association::{
    domain::{Namespace, PrimaryId, ResourceId},
    ports::{AssociationError, AssociationResult, AssociationStore, ObjectStorage},
};

/// Default key prefix for association markers.
pub const DEFAULT_PREFIX: &str = "resources";

/// Default path delimiter.
pub const DEFAULT_DELIMITER: &str = "/";

/// Joins the key prefix to a named namespace.
pub const NAMESPACE_SEPARATOR: &str = ":";

/// Location of association markers in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStorageConfig {
    bucket: String,
    prefix: String,
    delimiter: String,
}

impl ObjectStorageConfig {
    /// Creates a configuration for `bucket` with the default prefix and
    /// delimiter.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: DEFAULT_PREFIX.to_owned(),
            delimiter: DEFAULT_DELIMITER.to_owned(),
        }
    }

    /// Overrides the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Overrides the path delimiter.
    ///
    /// The delimiter must not contain [`NAMESPACE_SEPARATOR`] or a
    /// character allowed in a [`Namespace`], otherwise namespaced prefixes
    /// may overlap.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Returns the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the path delimiter.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

/// Durable association store backed by [`ObjectStorage`].
#[derive(Debug)]
pub struct ObjectStorageAssociationStore<O: ObjectStorage> {
    storage: Arc<O>,
    config: ObjectStorageConfig,
    namespace: Namespace,
}

impl<O: ObjectStorage> Clone for ObjectStorageAssociationStore<O> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl<O: ObjectStorage> ObjectStorageAssociationStore<O> {
    /// Creates a store in the root namespace.
    #[must_use]
    pub fn new(storage: Arc<O>, config: ObjectStorageConfig) -> Self {
        Self {
            storage,
            config,
            namespace: Namespace::root(),
        }
    }

    /// Returns the marker configuration.
    #[must_use]
    pub const fn config(&self) -> &ObjectStorageConfig {
        &self.config
    }

    /// Returns the namespace this store is scoped to.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Key prefix holding every marker of this namespace, ending with the
    /// delimiter.
    fn root(&self) -> String {
        let ObjectStorageConfig {
            prefix, delimiter, ..
        } = &self.config;
        if self.namespace.is_root() {
            format!("{prefix}{delimiter}")
        } else {
            format!(
                "{prefix}{NAMESPACE_SEPARATOR}{}{delimiter}",
                self.namespace.as_str()
            )
        }
    }

    fn marker_prefix(&self, primary_id: &PrimaryId) -> AssociationResult<String> {
        if primary_id.as_str().contains(self.config.delimiter()) {
            return Err(AssociationError::UnsupportedPrimaryId(primary_id.clone()));
        }
        Ok(format!(
            "{}{}{}",
            self.root(),
            primary_id,
            self.config.delimiter()
        ))
    }

    async fn remove_markers(&self, marker_prefix: &str) -> AssociationResult<()> {
        let bucket = self.config.bucket();
        let keys = self
            .storage
            .list_keys(bucket, marker_prefix)
            .await
            .map_err(AssociationError::backend)?;
        for key in keys {
            self.storage
                .delete_object(bucket, &key)
                .await
                .map_err(AssociationError::backend)?;
        }
        Ok(())
    }

    /// Strips `prefix` and the trailing delimiter from a common prefix.
    fn segment<'a>(&self, common_prefix: &'a str, prefix: &str) -> Option<&'a str> {
        common_prefix
            .strip_prefix(prefix)?
            .strip_suffix(self.config.delimiter())
            .filter(|segment| !segment.is_empty())
    }
}

#[async_trait]
impl<O: ObjectStorage> AssociationStore for ObjectStorageAssociationStore<O> {
    async fn put(&self, primary_id: &PrimaryId, resource_id: ResourceId) -> AssociationResult<()> {
        let marker_prefix = self.marker_prefix(primary_id)?;
        self.remove_markers(&marker_prefix).await?;
        let key = format!("{marker_prefix}{resource_id}{}", self.config.delimiter());
        debug!(bucket = self.config.bucket(), key = %key, "writing association marker");
        self.storage
            .put_marker(self.config.bucket(), &key)
            .await
            .map_err(AssociationError::backend)
    }

    async fn get(&self, primary_id: &PrimaryId) -> AssociationResult<Option<ResourceId>> {
        let marker_prefix = self.marker_prefix(primary_id)?;
        let prefixes = self
            .storage
            .list_common_prefixes(self.config.bucket(), &marker_prefix, self.config.delimiter())
            .await
            .map_err(AssociationError::backend)?;
        match prefixes.as_slice() {
            [] => Ok(None),
            [single] => {
                let segment = self.segment(single, &marker_prefix).ok_or_else(|| {
                    AssociationError::malformed(primary_id, format!("empty marker {single}"))
                })?;
                segment.parse::<ResourceId>().map(Some).map_err(|err| {
                    AssociationError::malformed(primary_id, err.to_string())
                })
            }
            many => Err(AssociationError::malformed(
                primary_id,
                format!("{} markers found", many.len()),
            )),
        }
    }

    async fn delete(&self, primary_id: &PrimaryId) -> AssociationResult<()> {
        let marker_prefix = self.marker_prefix(primary_id)?;
        self.remove_markers(&marker_prefix).await
    }

    async fn keys(&self) -> AssociationResult<Vec<PrimaryId>> {
        let root = self.root();
        let prefixes = self
            .storage
            .list_common_prefixes(self.config.bucket(), &root, self.config.delimiter())
            .await
            .map_err(AssociationError::backend)?;
        let mut keys: Vec<PrimaryId> = prefixes
            .iter()
            .filter_map(|prefix| self.segment(prefix, &root))
            .filter_map(|segment| PrimaryId::new(segment).ok())
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn scoped(&self, namespace: &Namespace) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            namespace: namespace.clone(),
        }
    }
}
