//! Validation errors for association domain values.

use thiserror::Error;

/// Errors returned while constructing association domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssociationDomainError {
    /// The primary identifier is empty after trimming.
    #[error("primary id must not be empty")]
    EmptyPrimaryId,

    /// The namespace contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid namespace '{0}', expected ASCII letters, digits, '-' or '_'")]
    InvalidNamespace(String),

    /// The resource identifier is zero or not an unsigned integer.
    #[error("invalid resource id '{0}', expected a positive integer")]
    InvalidResourceId(String),
}
