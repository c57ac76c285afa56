//! Adapter implementations of the association ports.
//!
//! - [`memory`]: process-local store and object storage
//! - [`object_storage`]: marker-object store over any [`ObjectStorage`]
//! - `s3`: Amazon S3 object storage (feature `s3`)
//! - `postgres`: `PostgreSQL` store (feature `postgres`)
//!
//! [`ObjectStorage`]: crate::association::ports::ObjectStorage

pub mod memory;
pub mod object_storage;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "s3")]
pub mod s3;
