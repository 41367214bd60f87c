//! Storage boundary
//!
//! The fetch layer needs exactly one thing from the storage engine: execute
//! a planned SELECT (with its LEFT OUTER JOINs) and hand back rows whose
//! values are addressable by aliased column handle, NULLs included. The
//! [`Store`] trait captures that contract; [`PgStore`] is the production
//! implementation, and the in-memory store used by the test suites lives in
//! the `graphfetch-test-utils` crate.

mod postgres;

pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::query::{SelectQuery, SqlRow};

/// Asynchronous "execute SELECT with joins, return rows" primitive.
///
/// Implementations run queries on a bounded connection pool of their own;
/// the fetch layer never issues unbounded concurrent calls against it; the
/// loader batching caps concurrency at one fetch per entity type per
/// dispatch round.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<SqlRow>, StoreError>;
}
