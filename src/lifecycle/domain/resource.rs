//! Resource kinds and the operations the controller drives on them.

use super::LifecycleDomainError;
use crate::association::domain::{Namespace, ResourceId};
use std::fmt;

/// Mutating operation submitted to the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST` on the collection.
    Create,
    /// `PUT` on an instance.
    Update,
    /// `DELETE` on an instance.
    Delete,
}

impl Operation {
    /// Returns the command type fragment, e.g. `Create`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    /// Returns `true` when a completed task reports the affected resource id.
    #[must_use]
    pub const fn reports_resource_id(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind of remote resource managed through the task API.
///
/// The kind names the REST collection, the command type prefix reported by
/// tasks (`cloudAccountCreateRequest`, ...) and the association namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    name: String,
    collection_path: String,
    namespace: Namespace,
}

impl ResourceKind {
    /// Creates a resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError`] when `name` is empty or
    /// `collection_path` is not absolute.
    pub fn new(
        name: impl Into<String>,
        collection_path: impl Into<String>,
        namespace: Namespace,
    ) -> Result<Self, LifecycleDomainError> {
        let kind_name = name.into();
        if kind_name.trim().is_empty() {
            return Err(LifecycleDomainError::EmptyKindName);
        }
        let path = collection_path.into();
        if !path.starts_with('/') {
            return Err(LifecycleDomainError::InvalidCollectionPath(path));
        }
        Ok(Self {
            name: kind_name,
            collection_path: path.trim_end_matches('/').to_owned(),
            namespace,
        })
    }

    /// Cloud provider accounts (`/cloud-accounts`).
    #[must_use]
    pub fn cloud_account() -> Self {
        Self {
            name: "cloudAccount".to_owned(),
            collection_path: "/cloud-accounts".to_owned(),
            namespace: Namespace::trusted("cloud-accounts"),
        }
    }

    /// Subscriptions (`/subscriptions`).
    #[must_use]
    pub fn subscription() -> Self {
        Self {
            name: "subscription".to_owned(),
            collection_path: "/subscriptions".to_owned(),
            namespace: Namespace::trusted("subscriptions"),
        }
    }

    /// Returns the command type prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the collection path without a trailing slash.
    #[must_use]
    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    /// Returns the path of a single resource in the collection.
    #[must_use]
    pub fn instance_path(&self, resource_id: ResourceId) -> String {
        format!("{}/{resource_id}", self.collection_path)
    }

    /// Returns the association namespace for this kind.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the command type tasks report for `operation` on this kind.
    #[must_use]
    pub fn command_type(&self, operation: Operation) -> super::CommandType {
        super::CommandType::new(format!("{}{}Request", self.name, operation.as_str()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
