//! Remote task API port.

use crate::association::domain::ResourceId;
use crate::lifecycle::domain::{Operation, RemoteTask, ResourceKind, TaskId};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote API calls.
pub type RemoteApiResult<T> = Result<T, RemoteApiError>;

/// Mutating request that the remote API acknowledges with a new task.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRequest {
    /// `POST` a new resource to the collection.
    Create {
        /// Target resource kind.
        kind: ResourceKind,
        /// Resource payload.
        body: Value,
    },
    /// `PUT` a new representation of an existing resource.
    Update {
        /// Target resource kind.
        kind: ResourceKind,
        /// Resource to update.
        resource_id: ResourceId,
        /// Resource payload.
        body: Value,
    },
    /// `DELETE` an existing resource.
    Delete {
        /// Target resource kind.
        kind: ResourceKind,
        /// Resource to delete.
        resource_id: ResourceId,
    },
}

impl SubmitRequest {
    /// Returns the resource kind the request targets.
    #[must_use]
    pub const fn kind(&self) -> &ResourceKind {
        match self {
            Self::Create { kind, .. } | Self::Update { kind, .. } | Self::Delete { kind, .. } => {
                kind
            }
        }
    }

    /// Returns the operation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Update { .. } => Operation::Update,
            Self::Delete { .. } => Operation::Delete,
        }
    }

    /// Returns the target resource id for update and delete.
    #[must_use]
    pub const fn resource_id(&self) -> Option<ResourceId> {
        match self {
            Self::Create { .. } => None,
            Self::Update { resource_id, .. } | Self::Delete { resource_id, .. } => {
                Some(*resource_id)
            }
        }
    }

    /// Returns the request body for create and update.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Create { body, .. } | Self::Update { body, .. } => Some(body),
            Self::Delete { .. } => None,
        }
    }
}

/// Task-tracking REST API the lifecycle controller talks to.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetches a task by id (`GET /tasks/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError`] on transport, status or decoding failure.
    async fn get_task(&self, task_id: &TaskId) -> RemoteApiResult<RemoteTask>;

    /// Fetches the full task history (`GET /tasks/`).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError`] on transport, status or decoding failure.
    async fn list_tasks(&self) -> RemoteApiResult<Vec<RemoteTask>>;

    /// Submits a mutating request and returns the acknowledging task.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Status`] with status 404 when an update or
    /// delete targets a missing resource.
    async fn submit(&self, request: &SubmitRequest) -> RemoteApiResult<RemoteTask>;

    /// Fetches a resource representation (`GET {collection}/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Status`] with status 404 when the resource
    /// does not exist.
    async fn fetch_resource(
        &self,
        kind: &ResourceKind,
        resource_id: ResourceId,
    ) -> RemoteApiResult<Value>;
}

/// Errors returned by remote API implementations.
#[derive(Debug, Clone, Error)]
pub enum RemoteApiError {
    /// The API answered with a non-success status.
    #[error("{method} {path} returned status {status}: {body}")]
    Status {
        /// Request method.
        method: String,
        /// Request path relative to the base URL.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteApiError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Wraps a decoding error.
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }

    /// Builds a [`RemoteApiError::Status`] error.
    pub fn status(
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::Status {
            method: method.into(),
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for a 404 response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
