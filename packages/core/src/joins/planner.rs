//! Join planning and execution
//!
//! Consumes a [`JoinRequest`] tree and attaches one LEFT OUTER JOIN per node
//! to a [`SelectQuery`]. Each foreign table is joined under a unique alias
//! derived from its path (`{parent alias}_{join name}`), so the same logical
//! table can appear several times in one statement, repeated joins and
//! self-joins included. The returned [`JoinInstance`] tree carries the
//! aliased column handles needed to read the joined data back out of each
//! result row.

use crate::joins::definition::{JoinDefId, JoinRegistry};
use crate::query::{JoinClause, SelectQuery};
use crate::schema::TableId;

/// A request for one join (and its nested joins) to be part of a query.
/// Built by the mapper, consumed by [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub definition: JoinDefId,
    pub children: Vec<JoinRequest>,
}

impl JoinRequest {
    /// A request with no nested joins.
    pub fn leaf(definition: JoinDefId) -> Self {
        Self {
            definition,
            children: Vec::new(),
        }
    }
}

/// An aliased column in an executed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHandle {
    pub alias: String,
    pub column: &'static str,
}

/// The live realization of one [`JoinRequest`] inside a planned query:
/// which alias the foreign table ended up under, and the handles of the two
/// key columns. Valid for the lifetime of one query execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinInstance {
    pub definition: JoinDefId,
    pub foreign_table: TableId,
    pub foreign_alias: String,
    /// Key column on the primary side, under the primary side's alias.
    pub primary_key: ColumnHandle,
    /// Key column on the foreign side, under [`Self::foreign_alias`].
    pub foreign_key: ColumnHandle,
    pub children: Vec<JoinInstance>,
}

/// Adds the requested joins to `query` and returns their instances.
///
/// Column-type compatibility of the two sides was checked when the
/// definitions were registered, so planning itself cannot fail.
pub fn plan(
    registry: &JoinRegistry,
    query: &mut SelectQuery,
    requests: &[JoinRequest],
) -> Vec<JoinInstance> {
    let base_alias = query.base.table_name().to_owned();
    requests
        .iter()
        .map(|request| add_join(registry, query, &base_alias, request))
        .collect()
}

fn add_join(
    registry: &JoinRegistry,
    query: &mut SelectQuery,
    primary_alias: &str,
    request: &JoinRequest,
) -> JoinInstance {
    let definition = registry.get(request.definition);
    let alias = format!("{primary_alias}_{name}", name = definition.name);

    query.joins.push(JoinClause {
        table: definition.foreign.table,
        alias: alias.clone(),
        primary_alias: primary_alias.to_owned(),
        primary_column: definition.primary.column,
        foreign_column: definition.foreign.column,
    });

    let children = request
        .children
        .iter()
        .map(|child| add_join(registry, query, &alias, child))
        .collect();

    JoinInstance {
        definition: request.definition,
        foreign_table: definition.foreign.table,
        foreign_alias: alias.clone(),
        primary_key: ColumnHandle {
            alias: primary_alias.to_owned(),
            column: definition.primary.column,
        },
        foreign_key: ColumnHandle {
            alias,
            column: definition.foreign.column,
        },
        children,
    }
}
