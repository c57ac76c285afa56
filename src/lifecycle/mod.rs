//! Resumable lifecycles of remote resources behind a task-tracking API.
//!
//! A caller invoked under a hard wall-clock budget drives create, update
//! and delete through repeated bounded ticks. Each tick submits the request
//! at most once, hands the continuation token back to the caller, and waits
//! on the remote task until it is terminal or the budget runs out.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
