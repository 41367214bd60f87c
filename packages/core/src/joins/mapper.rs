//! Selection-to-join mapping
//!
//! Turns the client's requested field tree into the minimal set of join
//! requests: a join is added only when a child field's name matches a
//! registered definition for the current table, recursively. Unmatched
//! fields contribute nothing; they are either scalar columns of the primary
//! table or resolved later through a loader.
//!
//! Mapping runs once per request and is linear in requested fields times
//! definitions per table; it never touches data.

use crate::joins::definition::JoinRegistry;
use crate::joins::planner::JoinRequest;
use crate::schema::TableId;

/// One node of the client's requested field tree: a field name plus its
/// nested child selections, in request order. Supplied by the surrounding
/// query-execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub children: Vec<Selection>,
}

impl Selection {
    /// A leaf field with no children.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// A field with nested child selections.
    pub fn with_children(name: impl Into<String>, children: Vec<Selection>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// Maps the children of `selection` onto join requests against `table`.
///
/// For each child field, the first definition registered for `table` under
/// that name wins (the registry guarantees there is at most one); the child's
/// own children are then mapped against the definition's foreign table.
pub fn join_requests(
    registry: &JoinRegistry,
    selection: &Selection,
    table: TableId,
) -> Vec<JoinRequest> {
    selection
        .children
        .iter()
        .filter_map(|child| {
            registry
                .definitions_from(table)
                .find(|(_, d)| d.name == child.name)
                .map(|(id, definition)| JoinRequest {
                    definition: id,
                    children: join_requests(registry, child, definition.foreign.table),
                })
        })
        .collect()
}
