//! Join planning
//!
//! Everything between "the client asked for these nested fields" and "one
//! SELECT with the right LEFT OUTER JOINs, demultiplexed back into entities":
//!
//! - [`definition`]: the static registry of relationships between tables
//! - [`mapper`]: selection tree -> [`JoinRequest`] tree
//! - [`planner`]: [`JoinRequest`] tree -> aliased join clauses + live
//!   [`JoinInstance`] handles
//! - [`result`]: one result row + instances -> [`JoinResult`] tree
//! - [`convert`]: join results -> domain entities

pub mod convert;
pub mod definition;
pub mod mapper;
pub mod planner;
pub mod result;

pub use convert::{ConverterSet, RecordConverter};
pub use definition::{ColumnRef, JoinDefId, JoinDefinition, JoinRegistry};
pub use mapper::{join_requests, Selection};
pub use planner::{plan, JoinInstance, JoinRequest};
pub use result::{demux, JoinResult};

use crate::error::ConfigError;
use crate::models::{Company, Customer, Entity, PricingDetails};
use crate::schema::{Record, TableId};

/// The validated pair of join registry and converter set a fetch layer runs
/// with. Built once at startup; read-only and safe to share across requests.
pub struct JoinConfig {
    pub registry: JoinRegistry,
    pub converters: ConverterSet,
}

impl JoinConfig {
    /// Validates the converter set against the registry and wires the two
    /// together. Any inconsistency is a startup failure.
    pub fn new(registry: JoinRegistry, converters: ConverterSet) -> Result<Self, ConfigError> {
        converters.validate(&registry)?;
        Ok(Self {
            registry,
            converters,
        })
    }

    /// The standard wiring for the catalog in [`crate::schema`]: every
    /// relationship of the sample database plus the converters that turn
    /// joined rows into [`Entity`] values.
    pub fn standard() -> Result<Self, ConfigError> {
        let mut registry = JoinRegistry::new();

        registry.register(JoinDefinition::new(
            "company",
            ColumnRef::new(TableId::Customer, "company_id"),
            ColumnRef::new(TableId::Company, "id"),
        ))?;
        // Self-join: a customer's delegate is another customer.
        registry.register(JoinDefinition::new(
            "out_of_office_delegate",
            ColumnRef::new(TableId::Customer, "out_of_office_delegate"),
            ColumnRef::new(TableId::Customer, "id"),
        ))?;
        registry.register(JoinDefinition::new(
            "pricing_details",
            ColumnRef::new(TableId::Customer, "pricing_details_id"),
            ColumnRef::new(TableId::PricingDetails, "id"),
        ))?;
        registry.register(JoinDefinition::new(
            "primary_contact",
            ColumnRef::new(TableId::Company, "primary_contact"),
            ColumnRef::new(TableId::Customer, "id"),
        ))?;
        registry.register(JoinDefinition::new(
            "pricing_details",
            ColumnRef::new(TableId::Company, "pricing_details_id"),
            ColumnRef::new(TableId::PricingDetails, "id"),
        ))?;
        registry.register(JoinDefinition::new(
            "vat_rate",
            ColumnRef::new(TableId::PricingDetails, "vat_rate_id"),
            ColumnRef::new(TableId::VatRate, "id"),
        ))?;
        registry.register(JoinDefinition::new(
            "discount_rate",
            ColumnRef::new(TableId::PricingDetails, "discount_rate_id"),
            ColumnRef::new(TableId::DiscountRate, "id"),
        ))?;
        registry.register(JoinDefinition::new(
            "preferred_payment_method",
            ColumnRef::new(TableId::PricingDetails, "preferred_payment_method_id"),
            ColumnRef::new(TableId::PaymentMethod, "id"),
        ))?;
        // Two joins from one table to the same foreign table; the planner
        // aliases each one independently.
        registry.register(JoinDefinition::new(
            "partnership_company_a",
            ColumnRef::new(TableId::CompanyPartnership, "company_a"),
            ColumnRef::new(TableId::Company, "id"),
        ))?;
        registry.register(JoinDefinition::new(
            "partnership_company_b",
            ColumnRef::new(TableId::CompanyPartnership, "company_b"),
            ColumnRef::new(TableId::Company, "id"),
        ))?;

        let converters = ConverterSet::of(vec![
            RecordConverter::single(TableId::Customer, |record| match record {
                Record::Customer(r) => Some(Entity::Customer(Customer::from(r))),
                _ => None,
            }),
            RecordConverter::single(TableId::Company, |record| match record {
                Record::Company(r) => Some(Entity::Company(Company::from(r))),
                _ => None,
            }),
            RecordConverter::multi(
                TableId::PricingDetails,
                &[
                    ("vat_rate", TableId::VatRate),
                    ("discount_rate", TableId::DiscountRate),
                    ("preferred_payment_method", TableId::PaymentMethod),
                ],
                |record, joined| {
                    let (
                        Record::PricingDetails(details),
                        Some(Record::VatRate(vat)),
                        Some(Record::DiscountRate(discount)),
                        Some(Record::PaymentMethod(method)),
                    ) = (
                        record,
                        joined.get("vat_rate").copied(),
                        joined.get("discount_rate").copied(),
                        joined.get("preferred_payment_method").copied(),
                    )
                    else {
                        return None;
                    };
                    Some(Entity::PricingDetails(PricingDetails::from_records(
                        details, vat, discount, method,
                    )))
                },
            ),
        ]);

        Self::new(registry, converters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_builds() {
        let config = JoinConfig::standard().unwrap();
        let from_customer: Vec<_> = config
            .registry
            .definitions_from(TableId::Customer)
            .map(|(_, d)| d.name.as_str())
            .collect();
        assert_eq!(
            from_customer,
            vec!["company", "out_of_office_delegate", "pricing_details"]
        );
    }
}
