use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{FetchError, FetchResult};
use crate::joins::{JoinConfig, JoinRegistry, JoinResult, Selection};
use crate::models::Customer;
use crate::schema::{Record, TableId};
use crate::store::Store;

use super::entity::{EntityRepository, TableRepository};

/// Fetches [`Customer`] entities. A customer stands on its own row, so no
/// default joins are needed; any joins present come from the selection.
pub struct CustomerRepository {
    inner: TableRepository<Customer>,
}

impl CustomerRepository {
    pub fn new(store: Arc<dyn Store>, config: Arc<JoinConfig>) -> Self {
        Self {
            inner: TableRepository::new(store, config, TableId::Customer, primary),
        }
    }
}

fn primary(record: &Record, _results: &[JoinResult], _registry: &JoinRegistry) -> FetchResult<Customer> {
    match record {
        Record::Customer(r) => Ok(Customer::from(r)),
        other => Err(FetchError::Decode(format!(
            "expected a customer record, got one for table '{}'",
            other.table().table_name()
        ))),
    }
}

#[async_trait]
impl EntityRepository<Customer> for CustomerRepository {
    async fn find_all(
        &self,
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<Customer>> {
        self.inner.find_all(selection, ctx).await
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<Customer>> {
        self.inner.find_by_ids(ids, selection, ctx).await
    }
}
