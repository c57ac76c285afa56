//! Amazon S3 implementation of the object storage port.

use async_trait::async_trait;
use aws_sdk_s3::Client;

use crate::association::ports::{ObjectStorage, ObjectStorageError, ObjectStorageResult};

/// Object storage backed by an S3 client.
#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    client: Client,
}

impl S3ObjectStorage {
    /// Creates storage over a pre-built S3 client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates storage using the standard AWS config chain (environment,
    /// profiles, instance metadata).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn list_common_prefixes(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> ObjectStorageResult<Vec<String>> {
        let mut prefixes = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .delimiter(delimiter)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(ObjectStorageError::backend)?;
            prefixes.extend(
                output
                    .common_prefixes()
                    .iter()
                    .filter_map(|common| common.prefix().map(str::to_owned)),
            );
            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_owned());
                }
                _ => return Ok(prefixes),
            }
        }
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> ObjectStorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(ObjectStorageError::backend)?;
            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_owned)),
            );
            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_owned());
                }
                _ => return Ok(keys),
            }
        }
    }

    async fn put_marker(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(ObjectStorageError::backend)?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(ObjectStorageError::backend)?;
        Ok(())
    }
}
