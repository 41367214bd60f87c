//! Query representation and result rows
//!
//! [`SelectQuery`] is the planned form of one fetch: a base table, a flat
//! list of aliased LEFT OUTER JOIN clauses, and an optional ID filter. It is
//! storage-agnostic; [`to_sql`](SelectQuery::to_sql) renders it for Postgres
//! and the in-memory store interprets it directly.
//!
//! [`SqlRow`] is the result-row shape every store returns: values addressable
//! by (table alias, column name), with SQL NULL kept distinguishable so the
//! demultiplexer can tell "join produced no match" from real data.

use std::collections::HashMap;
use std::fmt::Write;

use crate::schema::TableId;

/// A single scalar value read from a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    BigInt(i64),
    Text(String),
    Double(f64),
    Null,
}

impl SqlValue {
    /// True for everything except SQL NULL.
    pub fn is_present(&self) -> bool {
        !matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::BigInt(v) => Some(*v),
            _ => None,
        }
    }
}

/// One result row, keyed by table alias then column name.
///
/// An alias that is entirely absent (the outer join matched nothing and the
/// store chose not to emit its columns) reads the same as a row of NULLs.
#[derive(Debug, Clone, Default)]
pub struct SqlRow {
    tables: HashMap<String, HashMap<&'static str, SqlValue>>,
}

impl SqlRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: &str, column: &'static str, value: SqlValue) {
        self.tables
            .entry(alias.to_owned())
            .or_default()
            .insert(column, value);
    }

    /// The value at an aliased column, or `None` if the alias/column was not
    /// part of the result set.
    pub fn value(&self, alias: &str, column: &str) -> Option<&SqlValue> {
        self.tables.get(alias).and_then(|cols| cols.get(column))
    }

    /// True when the aliased column holds a non-NULL value.
    pub fn is_present(&self, alias: &str, column: &str) -> bool {
        self.value(alias, column).is_some_and(SqlValue::is_present)
    }
}

/// One LEFT OUTER JOIN in a planned query.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Table on the foreign side of the join.
    pub table: TableId,
    /// Unique alias the foreign table is joined under.
    pub alias: String,
    /// Alias of the primary side (the base table name, or a previous clause's
    /// alias for nested joins).
    pub primary_alias: String,
    pub primary_column: &'static str,
    pub foreign_column: &'static str,
}

/// A planned SELECT over the base table plus its requested joins.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub base: TableId,
    pub joins: Vec<JoinClause>,
    /// When set, restrict the base table to these primary key values.
    pub id_filter: Option<Vec<i64>>,
}

impl SelectQuery {
    pub fn new(base: TableId) -> Self {
        Self {
            base,
            joins: Vec::new(),
            id_filter: None,
        }
    }

    /// Every (alias, table) pair the query projects, base table first, then
    /// join clauses in planning order.
    pub fn selected_tables(&self) -> Vec<(&str, TableId)> {
        let mut tables = vec![(self.base.table_name(), self.base)];
        tables.extend(self.joins.iter().map(|j| (j.alias.as_str(), j.table)));
        tables
    }

    /// Renders the query as Postgres SQL. Output columns are named
    /// `{alias}__{column}` so rows can be read back by aliased handle.
    /// The ID filter, when present, is the single bind parameter `$1`.
    pub fn to_sql(&self) -> String {
        let mut select_list = String::new();
        for (alias, table) in self.selected_tables() {
            for column in table.columns() {
                if !select_list.is_empty() {
                    select_list.push_str(", ");
                }
                let _ = write!(
                    select_list,
                    "\"{alias}\".\"{col}\" AS \"{alias}__{col}\"",
                    col = column.name
                );
            }
        }

        let base = self.base.table_name();
        let mut sql = format!("SELECT {select_list} FROM \"{base}\"");
        for join in &self.joins {
            let _ = write!(
                sql,
                " LEFT OUTER JOIN \"{table}\" AS \"{alias}\" ON \"{primary_alias}\".\"{primary_col}\" = \"{alias}\".\"{foreign_col}\"",
                table = join.table.table_name(),
                alias = join.alias,
                primary_alias = join.primary_alias,
                primary_col = join.primary_column,
                foreign_col = join.foreign_column,
            );
        }
        if self.id_filter.is_some() {
            let _ = write!(sql, " WHERE \"{base}\".\"{id}\" = ANY($1)", id = self.base.id_column());
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_null_handling() {
        let mut row = SqlRow::new();
        row.insert("customer", "id", SqlValue::BigInt(1));
        row.insert("customer", "out_of_office_delegate", SqlValue::Null);

        assert!(row.is_present("customer", "id"));
        assert!(!row.is_present("customer", "out_of_office_delegate"));
        // Absent alias reads as NULL.
        assert!(!row.is_present("customer_company", "id"));
        assert_eq!(row.value("customer_company", "id"), None);
    }

    #[test]
    fn renders_plain_select() {
        let query = SelectQuery::new(TableId::VatRate);
        assert_eq!(
            query.to_sql(),
            "SELECT \"vat_rate\".\"id\" AS \"vat_rate__id\", \
             \"vat_rate\".\"description\" AS \"vat_rate__description\", \
             \"vat_rate\".\"value\" AS \"vat_rate__value\" FROM \"vat_rate\""
        );
    }

    #[test]
    fn renders_join_and_filter() {
        let mut query = SelectQuery::new(TableId::Customer);
        query.joins.push(JoinClause {
            table: TableId::Company,
            alias: "customer_company".into(),
            primary_alias: "customer".into(),
            primary_column: "company_id",
            foreign_column: "id",
        });
        query.id_filter = Some(vec![1, 2]);

        let sql = query.to_sql();
        assert!(sql.contains(
            "LEFT OUTER JOIN \"company\" AS \"customer_company\" \
             ON \"customer\".\"company_id\" = \"customer_company\".\"id\""
        ));
        assert!(sql.ends_with("WHERE \"customer\".\"id\" = ANY($1)"));
        assert!(sql.contains("\"customer_company\".\"name\" AS \"customer_company__name\""));
    }
}
