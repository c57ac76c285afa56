//! Associations between caller primary ids and remote resource ids.
//!
//! The lifecycle controller records an association when a create task
//! completes and removes it when a delete task completes. Stores are
//! namespaced per resource kind and can be branched with
//! [`ports::AssociationStore::copy`].
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
