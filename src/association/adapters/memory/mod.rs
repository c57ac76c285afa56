//! In-memory association adapters.

mod object_storage;
mod store;

pub use object_storage::InMemoryObjectStorage;
pub use store::InMemoryAssociationStore;
