//! `PostgreSQL` adapter for association persistence.
//!
//! Schema lives in `migrations/`; rows are keyed by `(namespace, primary_id)`
//! with the root namespace stored as the empty string.

mod models;
mod schema;
mod store;

pub use store::{AssociationPgPool, PostgresAssociationStore};
