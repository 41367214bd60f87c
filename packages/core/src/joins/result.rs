//! Row demultiplexing
//!
//! After a planned query executes, each result row carries the base table's
//! columns plus the columns of every joined alias. [`demux`] walks the
//! [`JoinInstance`] tree for one row and extracts a [`JoinResult`] for every
//! join whose foreign side actually matched. An outer join that found no row
//! simply produces no result; that branch is omitted, it is not an error.
//!
//! Cost is proportional to the number of planned joins, not to row width.

use crate::error::FetchResult;
use crate::joins::planner::JoinInstance;
use crate::query::SqlRow;
use crate::schema::{read_record, Record};

use super::JoinDefId;

/// The materialized data of one join for one row: the record on the foreign
/// side, plus the results of any nested joins hanging off it.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinResult {
    pub definition: JoinDefId,
    pub foreign: Record,
    pub children: Vec<JoinResult>,
}

/// Extracts the join results present in `row` for the given instances.
///
/// A result exists iff both key columns are non-NULL: the primary side can be
/// NULL for optional edges (no relationship), and the foreign side is NULL
/// when the outer join matched nothing.
pub fn demux(row: &SqlRow, instances: &[JoinInstance]) -> FetchResult<Vec<JoinResult>> {
    let mut results = Vec::new();
    for instance in instances {
        let matched = row.is_present(&instance.primary_key.alias, instance.primary_key.column)
            && row.is_present(&instance.foreign_key.alias, instance.foreign_key.column);
        if !matched {
            continue;
        }
        let foreign = read_record(row, instance.foreign_table, &instance.foreign_alias)?;
        results.push(JoinResult {
            definition: instance.definition,
            foreign,
            children: demux(row, &instance.children)?,
        });
    }
    Ok(results)
}
