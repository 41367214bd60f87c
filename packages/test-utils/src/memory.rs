//! In-memory store
//!
//! [`MemoryStore`] interprets a planned [`SelectQuery`] directly over fixture
//! rows: the base table is filtered by the ID filter, then each join clause
//! is applied in order with LEFT OUTER JOIN semantics (no match keeps the row
//! with the foreign alias all-NULL, several matches fan the row out). Every
//! executed query is counted and the most recent one kept, so tests can
//! assert both "how many queries did this take" and "what did the last one
//! look like".

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use graphfetch_core::error::StoreError;
use graphfetch_core::query::{SelectQuery, SqlRow, SqlValue};
use graphfetch_core::schema::TableId;
use graphfetch_core::store::Store;

type FixtureRow = Vec<(&'static str, SqlValue)>;

/// A [`Store`] over in-memory fixture rows.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<TableId, Vec<FixtureRow>>,
    queries: AtomicUsize,
    last: Mutex<Option<SelectQuery>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row to a table. Columns not listed read as absent, which the
    /// row model treats as NULL.
    pub fn insert(&mut self, table: TableId, row: FixtureRow) {
        self.tables.entry(table).or_default().push(row);
    }

    /// Number of queries executed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// The most recently executed query, if any.
    pub fn last_query(&self) -> Option<SelectQuery> {
        self.last.lock().expect("store mutex poisoned").clone()
    }

    fn matches_filter(row: &FixtureRow, query: &SelectQuery) -> bool {
        match &query.id_filter {
            Some(ids) => row_value(row, query.base.id_column())
                .and_then(SqlValue::as_i64)
                .is_some_and(|id| ids.contains(&id)),
            None => true,
        }
    }
}

fn row_value<'a>(row: &'a FixtureRow, column: &str) -> Option<&'a SqlValue> {
    row.iter()
        .find(|(name, _)| *name == column)
        .map(|(_, value)| value)
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<SqlRow>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().expect("store mutex poisoned") = Some(query.clone());

        let empty = Vec::new();
        let base_alias = query.base.table_name();
        let mut rows: Vec<SqlRow> = self
            .tables
            .get(&query.base)
            .unwrap_or(&empty)
            .iter()
            .filter(|row| Self::matches_filter(row, query))
            .map(|fixture| {
                let mut row = SqlRow::new();
                for (column, value) in fixture {
                    row.insert(base_alias, column, value.clone());
                }
                row
            })
            .collect();

        // Clauses arrive in planning order, so each clause's primary alias is
        // already populated when the clause runs.
        for join in &query.joins {
            let foreign_rows = self.tables.get(&join.table).unwrap_or(&empty);
            let mut joined_rows = Vec::with_capacity(rows.len());
            for row in rows {
                let key = row
                    .value(&join.primary_alias, join.primary_column)
                    .cloned()
                    .unwrap_or(SqlValue::Null);
                let matched: Vec<&FixtureRow> = if key.is_present() {
                    foreign_rows
                        .iter()
                        .filter(|fixture| row_value(fixture, join.foreign_column) == Some(&key))
                        .collect()
                } else {
                    Vec::new()
                };
                if matched.is_empty() {
                    let mut unmatched = row;
                    for column in join.table.columns() {
                        unmatched.insert(&join.alias, column.name, SqlValue::Null);
                    }
                    joined_rows.push(unmatched);
                } else {
                    for fixture in matched {
                        let mut joined = row.clone();
                        for (column, value) in fixture {
                            joined.insert(&join.alias, column, value.clone());
                        }
                        joined_rows.push(joined);
                    }
                }
            }
            rows = joined_rows;
        }
        Ok(rows)
    }
}

/// A [`Store`] whose every query fails, for error propagation tests.
pub struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<SqlRow>, StoreError> {
        Err(StoreError::Unsupported(format!(
            "simulated failure querying '{}'",
            query.base.table_name()
        )))
    }
}
