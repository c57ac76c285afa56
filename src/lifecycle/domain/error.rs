//! Validation errors for lifecycle domain values.

use thiserror::Error;

/// Errors returned while constructing lifecycle domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleDomainError {
    /// The task identifier is empty after trimming.
    #[error("task id must not be empty")]
    EmptyTaskId,

    /// The resource kind name is empty.
    #[error("resource kind name must not be empty")]
    EmptyKindName,

    /// The collection path does not start with `/`.
    #[error("invalid collection path '{0}', expected an absolute path")]
    InvalidCollectionPath(String),
}
