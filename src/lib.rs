//! Stratus: resumable long-running cloud resource operations.
//!
//! Cloud resources are created, updated and deleted asynchronously behind a
//! task-tracking API. Stratus lets a caller running under a hard wall-clock
//! budget (for example a short-lived function) drive those operations as
//! repeated, idempotent ticks: each tick either completes, or hands back a
//! continuation token to resume with on the next invocation.
//!
//! # Architecture
//!
//! Stratus follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (HTTP, object storage,
//!   databases, in-memory)
//!
//! # Modules
//!
//! - [`association`]: Namespaced primary id to resource id stores
//! - [`lifecycle`]: Task polling, reconciliation and the lifecycle controller
//! - [`config`]: Client configuration
//! - [`client`]: Facade with one controller per resource kind

pub mod association;
pub mod client;
pub mod config;
pub mod lifecycle;
