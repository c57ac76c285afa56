//! Step definitions for resumable lifecycle scenarios.

mod given;
mod then;
mod when;
pub mod world;
