//! Helper utilities for integration tests.

pub mod assertions;
