//! Shared test utilities for the graphfetch workspace
//!
//! This crate provides store implementations for testing the fetch layer
//! without a database:
//!
//! - [`MemoryStore`] - an in-memory store that interprets planned queries,
//!   LEFT OUTER JOINs included, over fixture rows, and records every query
//!   it executes so tests can assert on query counts and shapes
//! - [`FailingStore`] - a store whose every query fails, for error
//!   propagation tests
//! - [`fixtures::sample_store`] - a [`MemoryStore`] pre-loaded with the
//!   sample customer/company catalog used across the test suites

pub mod fixtures;
mod memory;

pub use memory::{FailingStore, MemoryStore};
