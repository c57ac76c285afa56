//! The durable primary id to resource id fact.

use super::{PrimaryId, ResourceId};
use serde::{Deserialize, Serialize};

/// A live association between a logical resource and its remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    primary_id: PrimaryId,
    resource_id: ResourceId,
}

impl Association {
    /// Creates an association.
    #[must_use]
    pub const fn new(primary_id: PrimaryId, resource_id: ResourceId) -> Self {
        Self {
            primary_id,
            resource_id,
        }
    }

    /// Returns the primary id.
    #[must_use]
    pub const fn primary_id(&self) -> &PrimaryId {
        &self.primary_id
    }

    /// Returns the resource id.
    #[must_use]
    pub const fn resource_id(&self) -> ResourceId {
        self.resource_id
    }

    /// Splits the association into its parts.
    #[must_use]
    pub fn into_parts(self) -> (PrimaryId, ResourceId) {
        (self.primary_id, self.resource_id)
    }
}
