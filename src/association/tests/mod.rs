//! Unit tests for the association context.
