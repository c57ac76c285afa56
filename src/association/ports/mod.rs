//! Port contracts for association persistence.

pub mod object_storage;
pub mod store;

pub use object_storage::{ObjectStorage, ObjectStorageError, ObjectStorageResult};
pub use store::{AssociationError, AssociationResult, AssociationStore};
