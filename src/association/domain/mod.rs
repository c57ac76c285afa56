//! Domain model for primary id to resource id associations.
//!
//! Associations record which remote resource a caller's logical resource
//! became once its create task completed. They are scoped by [`Namespace`] so
//! that stores for different resource kinds never collide.

mod association;
mod error;
mod ids;
mod namespace;

pub use association::Association;
pub use error::AssociationDomainError;
pub use ids::{PrimaryId, ResourceId};
pub use namespace::Namespace;
