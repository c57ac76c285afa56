//! Namespaces that keep association key spaces apart.

use super::AssociationDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope of an association store.
///
/// The root namespace is the empty string. Named namespaces are restricted to
/// ASCII letters, digits, `-` and `_` so they can be embedded in object keys
/// and SQL values without escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Returns the root (empty) namespace.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Creates a validated, non-empty namespace.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationDomainError::InvalidNamespace`] when the value is
    /// empty or contains characters outside `[A-Za-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, AssociationDomainError> {
        let raw = value.into();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AssociationDomainError::InvalidNamespace(raw));
        }
        Ok(Self(raw))
    }

    /// Builds a namespace from a literal known to be valid.
    pub(crate) fn trusted(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Returns `true` for the root namespace.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the namespace as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}
