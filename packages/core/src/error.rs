//! Error types for the data-fetch layer
//!
//! Errors fall into three tiers, matching where they can occur:
//! - [`ConfigError`]: startup-time wiring defects (duplicate join names,
//!   unknown columns). These are fatal and must prevent the process from
//!   serving requests.
//! - [`StoreError`]: failures raised by the storage backend while executing
//!   a query.
//! - [`FetchError`]: per-request failures surfaced to callers of the
//!   repositories and loaders.
//!
//! A missing relationship (an outer join with no match, or a loader key with
//! no entity) is never an error: it is represented as an explicit `None`.

use std::sync::Arc;

use thiserror::Error;

use crate::schema::TableId;

/// Startup configuration errors. Detected while building the join registry
/// and converter set, before any request is served.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Two join definitions with the same name registered for one table.
    #[error("duplicate join '{name}' on table '{table}'", table = .table.table_name())]
    DuplicateJoin { name: String, table: TableId },

    /// A join definition references a column the table does not have.
    #[error("unknown column '{column}' on table '{table}'", table = .table.table_name())]
    UnknownColumn { table: TableId, column: String },

    /// The two sides of a join definition have different column types.
    #[error("join '{name}' column type mismatch: {primary_table}.{primary_column} vs {foreign_table}.{foreign_column}",
            primary_table = .primary_table.table_name(), foreign_table = .foreign_table.table_name())]
    ColumnTypeMismatch {
        name: String,
        primary_table: TableId,
        primary_column: String,
        foreign_table: TableId,
        foreign_column: String,
    },

    /// A converter requires a join name that no definition provides.
    #[error("converter requires join '{name}' which is not registered for table '{table}'",
            table = .table.table_name())]
    UnknownConverterJoin { name: String, table: TableId },

    /// A repository declares a default join that is not registered for its
    /// table.
    #[error("default join '{name}' is not registered for table '{table}'",
            table = .table.table_name())]
    UnknownDefaultJoin { name: String, table: TableId },

    /// Invalid value for an environment variable.
    #[error("invalid value for {0}: {1}")]
    InvalidEnvValue(String, String),
}

/// Errors raised by a [`Store`](crate::store::Store) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database query failed.
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),

    /// The store cannot execute the given query shape.
    #[error("unsupported query: {0}")]
    Unsupported(String),
}

/// Per-request fetch errors, surfaced by repositories and loaders.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The underlying store call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A result row could not be decoded into a record.
    #[error("row decode error: {0}")]
    Decode(String),

    /// A row was missing data for a join the entity construction requires.
    /// Distinct from a legitimately absent relationship: this indicates the
    /// underlying data violates a non-null foreign key the entity relies on.
    #[error("row for table '{table}' is missing required join '{join}'", table = .table.table_name())]
    MissingJoin { table: TableId, join: String },

    /// The batch a load was waiting on was abandoned before completion,
    /// typically because the owning request was cancelled.
    #[error("batch abandoned before completion")]
    Abandoned,
}

/// A batch-level failure shared by every key that joined the batch.
pub type SharedFetchError = Arc<FetchError>;

/// Result alias for per-request fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_names_table() {
        let err = ConfigError::DuplicateJoin {
            name: "company".into(),
            table: TableId::Customer,
        };
        assert_eq!(err.to_string(), "duplicate join 'company' on table 'customer'");
    }

    #[test]
    fn missing_join_display() {
        let err = FetchError::MissingJoin {
            table: TableId::PricingDetails,
            join: "vat_rate".into(),
        };
        assert_eq!(
            err.to_string(),
            "row for table 'pricing_details' is missing required join 'vat_rate'"
        );
    }
}
