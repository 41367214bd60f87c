//! Record-to-entity conversion
//!
//! A [`ConverterSet`] turns the joined data of one result row into domain
//! entities. Two converter shapes exist, mirroring the two ways an entity
//! relates to tables:
//!
//! - **single-type**: the entity is built from one foreign record. Every
//!   join result (at any nesting level) whose foreign record comes from the
//!   converter's table yields one entity, so a row joining two copies of a
//!   table yields two entities.
//! - **multi-type**: the entity needs the primary record plus a specific
//!   named set of joins, all present at once. A partial match yields
//!   nothing; no half-built entity is ever emitted.
//!
//! The set is validated against the join registry at startup: requiring a
//! join name that no definition provides is a configuration error.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::joins::definition::JoinRegistry;
use crate::joins::result::JoinResult;
use crate::models::Entity;
use crate::schema::{Record, TableId};

/// Converts one foreign record into an entity. Returns `None` when the
/// record is not the expected variant.
pub type SingleConvert = fn(&Record) -> Option<Entity>;

/// Converts a primary record plus its required joined records (keyed by join
/// name) into an entity.
pub type MultiConvert = fn(&Record, &HashMap<&'static str, &Record>) -> Option<Entity>;

/// One converter in the set.
pub enum RecordConverter {
    Single {
        foreign_table: TableId,
        convert: SingleConvert,
    },
    Multi {
        primary_table: TableId,
        /// Required joins: name and expected foreign table, all-or-nothing.
        required: &'static [(&'static str, TableId)],
        convert: MultiConvert,
    },
}

impl RecordConverter {
    pub fn single(foreign_table: TableId, convert: SingleConvert) -> Self {
        Self::Single {
            foreign_table,
            convert,
        }
    }

    pub fn multi(
        primary_table: TableId,
        required: &'static [(&'static str, TableId)],
        convert: MultiConvert,
    ) -> Self {
        Self::Multi {
            primary_table,
            required,
            convert,
        }
    }
}

/// The full set of converters known to the fetch layer.
pub struct ConverterSet {
    converters: Vec<RecordConverter>,
}

impl ConverterSet {
    pub fn of(converters: Vec<RecordConverter>) -> Self {
        Self { converters }
    }

    /// Checks that every join name a multi-type converter requires is
    /// registered for its primary table with the expected foreign table.
    pub fn validate(&self, registry: &JoinRegistry) -> Result<(), ConfigError> {
        for converter in &self.converters {
            let RecordConverter::Multi {
                primary_table,
                required,
                ..
            } = converter
            else {
                continue;
            };
            for (name, foreign_table) in *required {
                let found = registry
                    .definitions_from(*primary_table)
                    .any(|(_, d)| d.name == *name && d.foreign.table == *foreign_table);
                if !found {
                    return Err(ConfigError::UnknownConverterJoin {
                        name: (*name).to_owned(),
                        table: *primary_table,
                    });
                }
            }
        }
        Ok(())
    }

    /// Produces every entity available from one primary record and its join
    /// results, recursing into nested joins with the foreign record as the
    /// new primary.
    pub fn harvest(
        &self,
        registry: &JoinRegistry,
        primary: &Record,
        results: &[JoinResult],
    ) -> Vec<Entity> {
        let mut entities = Vec::new();
        self.harvest_into(registry, primary, results, &mut entities);
        entities
    }

    fn harvest_into(
        &self,
        registry: &JoinRegistry,
        primary: &Record,
        results: &[JoinResult],
        out: &mut Vec<Entity>,
    ) {
        for converter in &self.converters {
            match converter {
                RecordConverter::Single {
                    foreign_table,
                    convert,
                } => {
                    for result in results {
                        if result.foreign.table() == *foreign_table {
                            out.extend(convert(&result.foreign));
                        }
                    }
                }
                RecordConverter::Multi {
                    primary_table,
                    required,
                    convert,
                } => {
                    if primary.table() != *primary_table {
                        continue;
                    }
                    if let Some(joined) = collect_required(registry, required, results) {
                        out.extend(convert(primary, &joined));
                    }
                }
            }
        }
        for result in results {
            self.harvest_into(registry, &result.foreign, &result.children, out);
        }
    }
}

/// Matches the required joins against the results at this level. Returns the
/// foreign records keyed by join name when every requirement is met, `None`
/// otherwise.
fn collect_required<'a>(
    registry: &JoinRegistry,
    required: &'static [(&'static str, TableId)],
    results: &'a [JoinResult],
) -> Option<HashMap<&'static str, &'a Record>> {
    let mut joined = HashMap::with_capacity(required.len());
    for (name, foreign_table) in required {
        let matched = results.iter().find(|r| {
            registry.get(r.definition).name == *name && r.foreign.table() == *foreign_table
        })?;
        joined.insert(*name, &matched.foreign);
    }
    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joins::JoinConfig;
    use crate::schema::{
        CompanyRecord, CustomerRecord, DiscountRateRecord, PaymentMethodRecord,
        PricingDetailsRecord, VatRateRecord,
    };
    use assert_matches::assert_matches;

    fn config() -> JoinConfig {
        JoinConfig::standard().unwrap()
    }

    fn customer_record(id: i64) -> Record {
        Record::Customer(CustomerRecord {
            id,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            company_id: 1,
            pricing_details_id: 1,
            out_of_office_delegate: None,
        })
    }

    fn company_record(id: i64, name: &str) -> Record {
        Record::Company(CompanyRecord {
            id,
            name: name.into(),
            address: "1 Main St".into(),
            pricing_details_id: 1,
            primary_contact: None,
        })
    }

    fn pricing_record(id: i64) -> Record {
        Record::PricingDetails(PricingDetailsRecord {
            id,
            description: "Standard terms".into(),
            vat_rate_id: 1,
            discount_rate_id: 1,
            preferred_payment_method_id: 1,
        })
    }

    fn pricing_join_results(config: &JoinConfig, skip: Option<&str>) -> Vec<JoinResult> {
        let mut results = Vec::new();
        let mut push = |name: &str, foreign: Record| {
            if skip == Some(name) {
                return;
            }
            results.push(JoinResult {
                definition: config
                    .registry
                    .lookup(TableId::PricingDetails, name)
                    .unwrap(),
                foreign,
                children: Vec::new(),
            });
        };
        push(
            "vat_rate",
            Record::VatRate(VatRateRecord {
                id: 1,
                description: "Standard".into(),
                value: 20.0,
            }),
        );
        push(
            "discount_rate",
            Record::DiscountRate(DiscountRateRecord {
                id: 1,
                description: "None".into(),
                value: 0.0,
            }),
        );
        push(
            "preferred_payment_method",
            Record::PaymentMethod(PaymentMethodRecord {
                id: 1,
                description: "Card".into(),
                charge: 1.5,
            }),
        );
        results
    }

    #[test]
    fn single_type_converts_each_matching_join() {
        let config = config();
        let company_join = config.registry.lookup(TableId::Customer, "company").unwrap();
        let delegate_join = config
            .registry
            .lookup(TableId::Customer, "out_of_office_delegate")
            .unwrap();
        let results = vec![
            JoinResult {
                definition: company_join,
                foreign: company_record(1, "Acme"),
                children: Vec::new(),
            },
            JoinResult {
                definition: delegate_join,
                foreign: customer_record(42),
                children: Vec::new(),
            },
        ];

        let entities = config
            .converters
            .harvest(&config.registry, &customer_record(10), &results);
        assert_eq!(entities.len(), 2);
        // Converter order, not join order: the customer converter runs first.
        assert_matches!(&entities[0], Entity::Customer(c) if c.id == 42);
        assert_matches!(&entities[1], Entity::Company(c) if c.id == 1);
    }

    #[test]
    fn multi_type_requires_every_join() {
        let config = config();
        let primary = pricing_record(5);

        // All three joins present: exactly one entity.
        let entities = config.converters.harvest(
            &config.registry,
            &primary,
            &pricing_join_results(&config, None),
        );
        assert_eq!(entities.len(), 1);
        assert_matches!(&entities[0], Entity::PricingDetails(p) => {
            assert_eq!(p.id, 5);
            assert_eq!(p.vat_rate.value, 20.0);
            assert_eq!(p.preferred_payment_method.charge, 1.5);
        });

        // N-1 of N joins: nothing at all.
        let entities = config.converters.harvest(
            &config.registry,
            &primary,
            &pricing_join_results(&config, Some("discount_rate")),
        );
        assert!(entities.is_empty());
    }

    #[test]
    fn harvest_recurses_into_nested_results() {
        let config = config();
        let company_join = config.registry.lookup(TableId::Customer, "company").unwrap();
        let pricing_join = config
            .registry
            .lookup(TableId::Company, "pricing_details")
            .unwrap();

        let results = vec![JoinResult {
            definition: company_join,
            foreign: company_record(1, "Acme"),
            children: vec![JoinResult {
                definition: pricing_join,
                foreign: pricing_record(5),
                children: pricing_join_results(&config, None),
            }],
        }];

        let entities = config
            .converters
            .harvest(&config.registry, &customer_record(10), &results);
        // Company from the first level, pricing details from the nested one.
        assert_eq!(entities.len(), 2);
        assert_matches!(&entities[0], Entity::Company(_));
        assert_matches!(&entities[1], Entity::PricingDetails(_));
    }

    #[test]
    fn unknown_required_join_fails_validation() {
        let config = config();
        let set = ConverterSet::of(vec![RecordConverter::multi(
            TableId::PricingDetails,
            &[("no_such_join", TableId::VatRate)],
            |_, _| None,
        )]);
        let err = set.validate(&config.registry).unwrap_err();
        assert_matches!(err, ConfigError::UnknownConverterJoin { .. });
    }
}
