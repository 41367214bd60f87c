//! PostgreSQL store
//!
//! Renders a [`SelectQuery`] to SQL, executes it on a `sqlx` pool and
//! decodes the rows into [`SqlRow`]s. Output columns are aliased
//! `{table alias}__{column}` by the renderer, which is what keeps repeated
//! and self-joined tables readable per alias on the way back out.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::query::{SelectQuery, SqlRow, SqlValue};
use crate::schema::ColumnType;

use super::Store;

/// Production [`Store`] backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    fn decode_row(query: &SelectQuery, row: &PgRow) -> Result<SqlRow, StoreError> {
        let mut decoded = SqlRow::new();
        for (alias, table) in query.selected_tables() {
            for column in table.columns() {
                let name = format!("{alias}__{col}", col = column.name);
                let value = match column.ty {
                    ColumnType::BigInt => row
                        .try_get::<Option<i64>, _>(name.as_str())?
                        .map_or(SqlValue::Null, SqlValue::BigInt),
                    ColumnType::Text => row
                        .try_get::<Option<String>, _>(name.as_str())?
                        .map_or(SqlValue::Null, SqlValue::Text),
                    ColumnType::Double => row
                        .try_get::<Option<f64>, _>(name.as_str())?
                        .map_or(SqlValue::Null, SqlValue::Double),
                };
                decoded.insert(alias, column.name, value);
            }
        }
        Ok(decoded)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<SqlRow>, StoreError> {
        let sql = query.to_sql();
        tracing::debug!(table = query.base.table_name(), %sql, "executing select");

        let mut prepared = sqlx::query(&sql);
        if let Some(ids) = &query.id_filter {
            prepared = prepared.bind(ids.clone());
        }
        let rows = prepared.fetch_all(&self.pool).await?;

        rows.iter().map(|row| Self::decode_row(query, row)).collect()
    }
}
