//! Adapter implementations of the remote task API port.

pub mod http;
pub mod memory;

pub use http::HttpRemoteApi;
pub use memory::InMemoryRemoteApi;
