use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{ConfigError, FetchError, FetchResult};
use crate::joins::{JoinConfig, JoinRegistry, JoinRequest, JoinResult, Selection};
use crate::models::PricingDetails;
use crate::schema::{Record, TableId};
use crate::store::Store;

use super::entity::{required_join, EntityRepository, TableRepository};

/// Joins the aggregate cannot be built without; always part of the query,
/// whatever the selection asks for.
const DEFAULT_JOINS: [&str; 3] = ["vat_rate", "discount_rate", "preferred_payment_method"];

/// Fetches [`PricingDetails`] aggregates. The entity embeds its VAT rate,
/// discount rate and payment method, so those three joins ride along on
/// every query this repository issues.
pub struct PricingDetailsRepository {
    inner: TableRepository<PricingDetails>,
}

impl PricingDetailsRepository {
    pub fn new(store: Arc<dyn Store>, config: Arc<JoinConfig>) -> Result<Self, ConfigError> {
        let default_joins = DEFAULT_JOINS
            .iter()
            .map(|name| {
                config
                    .registry
                    .lookup(TableId::PricingDetails, name)
                    .map(JoinRequest::leaf)
                    .ok_or_else(|| ConfigError::UnknownDefaultJoin {
                        name: (*name).to_owned(),
                        table: TableId::PricingDetails,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            inner: TableRepository::new(store, config, TableId::PricingDetails, primary)
                .with_default_joins(default_joins),
        })
    }
}

fn primary(
    record: &Record,
    results: &[JoinResult],
    registry: &JoinRegistry,
) -> FetchResult<PricingDetails> {
    let Record::PricingDetails(details) = record else {
        return Err(FetchError::Decode(format!(
            "expected a pricing details record, got one for table '{}'",
            record.table().table_name()
        )));
    };
    let joined = (
        required_join(results, registry, TableId::PricingDetails, "vat_rate")?,
        required_join(results, registry, TableId::PricingDetails, "discount_rate")?,
        required_join(
            results,
            registry,
            TableId::PricingDetails,
            "preferred_payment_method",
        )?,
    );
    let (Record::VatRate(vat), Record::DiscountRate(discount), Record::PaymentMethod(method)) =
        joined
    else {
        return Err(FetchError::Decode(
            "pricing details join produced a record of the wrong table".to_owned(),
        ));
    };
    Ok(PricingDetails::from_records(details, vat, discount, method))
}

#[async_trait]
impl EntityRepository<PricingDetails> for PricingDetailsRepository {
    async fn find_all(
        &self,
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<PricingDetails>> {
        self.inner.find_all(selection, ctx).await
    }

    async fn find_by_ids(
        &self,
        ids: &[i64],
        selection: Option<&Selection>,
        ctx: Option<&RequestContext>,
    ) -> FetchResult<Vec<PricingDetails>> {
        self.inner.find_by_ids(ids, selection, ctx).await
    }
}
