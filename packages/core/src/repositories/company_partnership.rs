use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{ConfigError, FetchError, FetchResult};
use crate::joins::{JoinConfig, JoinRegistry, JoinRequest, JoinResult, Selection};
use crate::models::{Company, CompanyPartnership};
use crate::schema::{Record, TableId};
use crate::store::Store;

use super::entity::{required_join, EntityRepository, TableRepository};

const DEFAULT_JOINS: [&str; 2] = ["partnership_company_a", "partnership_company_b"];

/// Fetches [`CompanyPartnership`] entities. A partnership is nothing without
/// its two companies, so both joins to the company table ride along on every
/// query; each gets its own alias.
pub struct CompanyPartnershipRepository {
    inner: TableRepository<CompanyPartnership>,
}

impl CompanyPartnershipRepository {
    pub fn new(store: Arc<dyn Store>, config: Arc<JoinConfig>) -> Result<Self, ConfigError> {
        let default_joins = DEFAULT_JOINS
            .iter()
            .map(|name| {
                config
                    .registry
                    .lookup(TableId::CompanyPartnership, name)
                    .map(JoinRequest::leaf)
                    .ok_or_else(|| ConfigError::UnknownDefaultJoin {
                        name: (*name).to_owned(),
                        table: TableId::CompanyPartnership,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            inner: TableRepository::new(store, config, TableId::CompanyPartnership, primary)
                .with_default_joins(default_joins),
        })
    }
}

fn primary(
    record: &Record,
    results: &[JoinResult],
    registry: &JoinRegistry,
) -> FetchResult<CompanyPartnership> {
    let Record::CompanyPartnership(partnership) = record else {
        return Err(FetchError::Decode(format!(
            "expected a company partnership record, got one for table '{}'",
            record.table().table_name()
        )));
    };
    let company = |name: &str| -> FetchResult<Company> {
        let joined = required_join(results, registry, TableId::CompanyPartnership, name)?;
        match joined {
            Record::Company(r) => Ok(Company::from(r)),
            _ => Err(FetchError::Decode(
                "partnership join produced a record of the wrong table".to_owned(),
            )),
        }
    };
    Ok(CompanyPartnership {
        id: partnership.id,
        company_a: company("partnership_company_a")?,
        company_b: company("partnership_company_b")?,
    })
}

#[async_trait]
impl EntityRepository<CompanyPartnership> for CompanyPartnershipRepository {
    async fn find_all(
        &self,
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<CompanyPartnership>> {
        self.inner.find_all(selection, ctx).await
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<CompanyPartnership>> {
        self.inner.find_by_ids(ids, selection, ctx).await
    }
}
