//! Identifier types for the association domain.

use super::AssociationDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// Caller-chosen identifier for a logical resource.
///
/// A primary id exists before the remote resource does. Resources created
/// through the lifecycle controller use the id of their create task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryId(String);

impl PrimaryId {
    /// Creates a validated primary identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationDomainError::EmptyPrimaryId`] when the value is
    /// empty or whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, AssociationDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(AssociationDomainError::EmptyPrimaryId);
        }
        Ok(Self(raw))
    }

    /// Wraps a value already known to be non-blank.
    pub(crate) const fn trusted(value: String) -> Self {
        Self(value)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PrimaryId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PrimaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identifier of a materialized remote resource.
///
/// Zero is never a valid resource id; absence is expressed as
/// `Option<ResourceId>` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(NonZeroU64);

impl ResourceId {
    /// Creates a resource id, returning `None` for the zero sentinel.
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        match NonZeroU64::new(value) {
            Some(inner) => Some(Self(inner)),
            None => None,
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for ResourceId {
    type Error = AssociationDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| AssociationDomainError::InvalidResourceId(value.to_string()))
    }
}

impl FromStr for ResourceId {
    type Err = AssociationDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| AssociationDomainError::InvalidResourceId(s.to_owned()))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
