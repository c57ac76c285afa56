//! Unit tests for the lifecycle context.
