use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{FetchError, FetchResult};
use crate::joins::{JoinConfig, JoinRegistry, JoinResult, Selection};
use crate::models::Company;
use crate::schema::{Record, TableId};
use crate::store::Store;

use super::entity::{EntityRepository, TableRepository};

/// Fetches [`Company`] entities.
pub struct CompanyRepository {
    inner: TableRepository<Company>,
}

impl CompanyRepository {
    pub fn new(store: Arc<dyn Store>, config: Arc<JoinConfig>) -> Self {
        Self {
            inner: TableRepository::new(store, config, TableId::Company, primary),
        }
    }
}

fn primary(record: &Record, _results: &[JoinResult], _registry: &JoinRegistry) -> FetchResult<Company> {
    match record {
        Record::Company(r) => Ok(Company::from(r)),
        other => Err(FetchError::Decode(format!(
            "expected a company record, got one for table '{}'",
            other.table().table_name()
        ))),
    }
}

#[async_trait]
impl EntityRepository<Company> for CompanyRepository {
    async fn find_all(
        &self,
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<Company>> {
        self.inner.find_all(selection, ctx).await
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<Company>> {
        self.inner.find_by_ids(ids, selection, ctx).await
    }
}
