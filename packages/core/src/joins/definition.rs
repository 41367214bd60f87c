//! Join definitions and the process-wide registry
//!
//! A [`JoinDefinition`] declares a foreign-key-like edge between two tables:
//! a name (matching the client-facing field that exposes the relationship),
//! the column on the primary side, and the column on the foreign side. The
//! foreign table may be the primary table itself (self-join).
//!
//! Definitions are registered once at startup into a [`JoinRegistry`] and are
//! read-only afterwards, so concurrent request handling needs no locking.
//! Trees built on top of definitions refer to them by [`JoinDefId`] index
//! rather than by reference, which keeps request/instance/result trees free
//! of lifetimes and cyclic ownership.

use crate::error::ConfigError;
use crate::schema::TableId;

/// A reference to one column of one table in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: TableId,
    pub column: &'static str,
}

impl ColumnRef {
    pub fn new(table: TableId, column: &'static str) -> Self {
        Self { table, column }
    }
}

/// Opaque index of a registered [`JoinDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinDefId(usize);

/// A statically declared relationship between two tables.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinDefinition {
    /// Client-facing name of the relationship, e.g. `"company"`.
    pub name: String,
    /// Column on the owning side of the edge.
    pub primary: ColumnRef,
    /// Column on the referenced side of the edge.
    pub foreign: ColumnRef,
}

impl JoinDefinition {
    pub fn new(name: impl Into<String>, primary: ColumnRef, foreign: ColumnRef) -> Self {
        Self {
            name: name.into(),
            primary,
            foreign,
        }
    }
}

/// Registry of every join definition in the system, in registration order.
#[derive(Debug, Default)]
pub struct JoinRegistry {
    definitions: Vec<JoinDefinition>,
}

impl JoinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, validating it against the catalog. Two
    /// definitions with the same name and primary table, an unknown column,
    /// or mismatched column types on the two sides are configuration errors.
    pub fn register(&mut self, definition: JoinDefinition) -> Result<JoinDefId, ConfigError> {
        let primary = definition
            .primary
            .table
            .column(definition.primary.column)
            .ok_or_else(|| ConfigError::UnknownColumn {
                table: definition.primary.table,
                column: definition.primary.column.to_owned(),
            })?;
        let foreign = definition
            .foreign
            .table
            .column(definition.foreign.column)
            .ok_or_else(|| ConfigError::UnknownColumn {
                table: definition.foreign.table,
                column: definition.foreign.column.to_owned(),
            })?;
        if primary.ty != foreign.ty {
            return Err(ConfigError::ColumnTypeMismatch {
                name: definition.name,
                primary_table: definition.primary.table,
                primary_column: definition.primary.column.to_owned(),
                foreign_table: definition.foreign.table,
                foreign_column: definition.foreign.column.to_owned(),
            });
        }
        if self
            .definitions
            .iter()
            .any(|d| d.name == definition.name && d.primary.table == definition.primary.table)
        {
            return Err(ConfigError::DuplicateJoin {
                name: definition.name,
                table: definition.primary.table,
            });
        }

        let id = JoinDefId(self.definitions.len());
        self.definitions.push(definition);
        Ok(id)
    }

    pub fn get(&self, id: JoinDefId) -> &JoinDefinition {
        &self.definitions[id.0]
    }

    /// All definitions whose primary side belongs to `table`, in registration
    /// order.
    pub fn definitions_from(
        &self,
        table: TableId,
    ) -> impl Iterator<Item = (JoinDefId, &JoinDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .filter(move |(_, d)| d.primary.table == table)
            .map(|(i, d)| (JoinDefId(i), d))
    }

    /// Looks up a definition by primary table and name.
    pub fn lookup(&self, table: TableId, name: &str) -> Option<JoinDefId> {
        self.definitions_from(table)
            .find(|(_, d)| d.name == name)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn customer_company() -> JoinDefinition {
        JoinDefinition::new(
            "company",
            ColumnRef::new(TableId::Customer, "company_id"),
            ColumnRef::new(TableId::Company, "id"),
        )
    }

    #[test]
    fn registers_and_looks_up() {
        let mut registry = JoinRegistry::new();
        let id = registry.register(customer_company()).unwrap();
        assert_eq!(registry.get(id).name, "company");
        assert_eq!(registry.lookup(TableId::Customer, "company"), Some(id));
        assert_eq!(registry.lookup(TableId::Company, "company"), None);
    }

    #[test]
    fn duplicate_name_on_same_table_fails() {
        let mut registry = JoinRegistry::new();
        registry.register(customer_company()).unwrap();
        let err = registry
            .register(JoinDefinition::new(
                "company",
                ColumnRef::new(TableId::Customer, "out_of_office_delegate"),
                ColumnRef::new(TableId::Company, "id"),
            ))
            .unwrap_err();
        assert_matches!(err, ConfigError::DuplicateJoin { .. });
    }

    #[test]
    fn same_name_on_different_tables_is_fine() {
        let mut registry = JoinRegistry::new();
        registry
            .register(JoinDefinition::new(
                "pricing_details",
                ColumnRef::new(TableId::Customer, "pricing_details_id"),
                ColumnRef::new(TableId::PricingDetails, "id"),
            ))
            .unwrap();
        registry
            .register(JoinDefinition::new(
                "pricing_details",
                ColumnRef::new(TableId::Company, "pricing_details_id"),
                ColumnRef::new(TableId::PricingDetails, "id"),
            ))
            .unwrap();
    }

    #[test]
    fn unknown_column_fails() {
        let mut registry = JoinRegistry::new();
        let err = registry
            .register(JoinDefinition::new(
                "company",
                ColumnRef::new(TableId::Customer, "employer_id"),
                ColumnRef::new(TableId::Company, "id"),
            ))
            .unwrap_err();
        assert_matches!(err, ConfigError::UnknownColumn { .. });
    }

    #[test]
    fn column_type_mismatch_fails() {
        let mut registry = JoinRegistry::new();
        let err = registry
            .register(JoinDefinition::new(
                "odd",
                ColumnRef::new(TableId::Customer, "first_name"),
                ColumnRef::new(TableId::Company, "id"),
            ))
            .unwrap_err();
        assert_matches!(err, ConfigError::ColumnTypeMismatch { .. });
    }

    #[test]
    fn definitions_from_preserves_registration_order() {
        let mut registry = JoinRegistry::new();
        registry.register(customer_company()).unwrap();
        registry
            .register(JoinDefinition::new(
                "out_of_office_delegate",
                ColumnRef::new(TableId::Customer, "out_of_office_delegate"),
                ColumnRef::new(TableId::Customer, "id"),
            ))
            .unwrap();
        let names: Vec<_> = registry
            .definitions_from(TableId::Customer)
            .map(|(_, d)| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["company", "out_of_office_delegate"]);
    }
}
