//! Shared repository machinery
//!
//! [`TableRepository`] implements the whole find pipeline once, generically
//! over the entity type; the typed repositories configure it with their
//! table, their default joins and their primary-entity construction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{FetchError, FetchResult};
use crate::joins::{demux, join_requests, plan, JoinConfig, JoinRegistry, JoinRequest, JoinResult, Selection};
use crate::models::{Entity, Keyed};
use crate::query::SelectQuery;
use crate::schema::{read_record, Record, TableId};
use crate::store::Store;

/// Repository contract per entity type: fetch all entities, or those with
/// the given IDs, honoring the client's selection when one is supplied.
///
/// `find_by_ids` returns rows in store order; callers that need key order
/// re-sort themselves (the loader does exactly that).
#[async_trait]
pub trait EntityRepository<E>: Send + Sync
where
    E: Keyed + Clone + Send + Sync,
{
    async fn find_all(
        &self,
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<E>>;

    async fn find_by_ids(
        &self,
        ids: &[i64],
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<E>>;
}

/// Builds the repository's primary entity from the base-table record and the
/// row's join results.
pub type PrimaryConvert<E> = fn(&Record, &[JoinResult], &JoinRegistry) -> FetchResult<E>;

/// Generic single-query find pipeline over one base table.
pub struct TableRepository<E> {
    store: Arc<dyn Store>,
    config: Arc<JoinConfig>,
    table: TableId,
    /// Joins this repository always adds, selection or not, because its
    /// primary entity cannot be built without them.
    default_joins: Vec<JoinRequest>,
    primary: PrimaryConvert<E>,
}

impl<E> TableRepository<E>
where
    E: Keyed<Key = i64> + Clone + Into<Entity> + Send + Sync,
{
    pub fn new(
        store: Arc<dyn Store>,
        config: Arc<JoinConfig>,
        table: TableId,
        primary: PrimaryConvert<E>,
    ) -> Self {
        Self {
            store,
            config,
            table,
            default_joins: Vec::new(),
            primary,
        }
    }

    pub fn with_default_joins(mut self, default_joins: Vec<JoinRequest>) -> Self {
        self.default_joins = default_joins;
        self
    }

    pub async fn find_all(
        &self,
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<E>> {
        self.find(None, selection, ctx).await
    }

    pub async fn find_by_ids(
        &self,
        ids: &[i64],
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<E>> {
        self.find(Some(ids), selection, ctx).await
    }

    async fn find(
        &self,
        ids: Option<&[i64]>,
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<E>> {
        let registry = &self.config.registry;

        let mut requests = self.default_joins.clone();
        if let Some(selection) = selection {
            for request in join_requests(registry, selection, self.table) {
                // A default join already covers this edge; adding a second
                // clause would alias the same table twice under one name, but
                // the selection's nested joins still have to ride along.
                match requests
                    .iter_mut()
                    .find(|r| r.definition == request.definition)
                {
                    Some(existing) => existing.children.extend(request.children),
                    None => requests.push(request),
                }
            }
        }

        let mut query = SelectQuery::new(self.table);
        query.id_filter = ids.map(<[i64]>::to_vec);
        let instances = plan(registry, &mut query, &requests);

        tracing::debug!(
            table = self.table.table_name(),
            joins = query.joins.len(),
            ids = ?ids,
            "querying table"
        );
        let rows = self.store.select(&query).await?;
        tracing::debug!(table = self.table.table_name(), rows = rows.len(), "rows received");

        let base_alias = self.table.table_name();
        let mut entities = Vec::with_capacity(rows.len());
        for row in &rows {
            let primary_record = read_record(row, self.table, base_alias)?;
            let results = demux(row, &instances)?;
            let entity = (self.primary)(&primary_record, &results, registry)?;

            if let Some(ctx) = ctx {
                ctx.prime(&entity.clone().into());
                for secondary in
                    self.config
                        .converters
                        .harvest(registry, &primary_record, &results)
                {
                    ctx.prime(&secondary);
                }
            }
            entities.push(entity);
        }
        Ok(entities)
    }
}

/// Finds the foreign record of a required join among a row's results.
/// Used by repositories whose primary entity aggregates joined tables.
pub(crate) fn required_join<'a>(
    results: &'a [JoinResult],
    registry: &JoinRegistry,
    table: TableId,
    name: &str,
) -> FetchResult<&'a Record> {
    results
        .iter()
        .find(|r| registry.get(r.definition).name == name)
        .map(|r| &r.foreign)
        .ok_or_else(|| FetchError::MissingJoin {
            table,
            join: name.to_owned(),
        })
}
