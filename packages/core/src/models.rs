//! Domain entities
//!
//! Entities are the immutable value objects the fetch layer hands to
//! resolvers. They hold forward references to related entities by ID (for
//! example a customer's `company_id`); the related entity itself is obtained
//! through a loader or a joined query, never embedded. The exception is
//! aggregates like [`PricingDetails`] and [`CompanyPartnership`] whose parts
//! have no independent life of their own.

use serde::Serialize;

use crate::schema::{
    CompanyRecord, CustomerRecord, DiscountRateRecord, PaymentMethodRecord, PricingDetailsRecord,
    VatRateRecord,
};

/// A value that can be cached in a loader under its unique key.
pub trait Keyed {
    type Key: std::fmt::Debug + std::hash::Hash + Eq + Clone + Send + Sync;

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub company_id: i64,
    pub pricing_details_id: i64,
    /// Customer covering for this one while out of office, if any.
    pub out_of_office_delegate: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub pricing_details_id: i64,
    pub primary_contact: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VatRate {
    pub id: i64,
    pub description: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountRate {
    pub id: i64,
    pub description: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub description: String,
    pub charge: f64,
}

/// Pricing terms for a customer or company. Aggregates the rate and payment
/// method rows it references, so constructing one requires all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingDetails {
    pub id: i64,
    pub description: String,
    pub vat_rate: VatRate,
    pub discount_rate: DiscountRate,
    pub preferred_payment_method: PaymentMethod,
}

impl PricingDetails {
    /// Builds the aggregate from its four underlying rows.
    pub fn from_records(
        details: &PricingDetailsRecord,
        vat_rate: &VatRateRecord,
        discount_rate: &DiscountRateRecord,
        payment_method: &PaymentMethodRecord,
    ) -> Self {
        Self {
            id: details.id,
            description: details.description.clone(),
            vat_rate: VatRate {
                id: vat_rate.id,
                description: vat_rate.description.clone(),
                value: vat_rate.value,
            },
            discount_rate: DiscountRate {
                id: discount_rate.id,
                description: discount_rate.description.clone(),
                value: discount_rate.value,
            },
            preferred_payment_method: PaymentMethod {
                id: payment_method.id,
                description: payment_method.description.clone(),
                charge: payment_method.charge,
            },
        }
    }
}

/// A partnership between two companies. Both companies are fetched with the
/// partnership row itself, so the entity embeds them whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyPartnership {
    pub id: i64,
    pub company_a: Company,
    pub company_b: Company,
}

/// Every entity kind the fetch layer can produce, tagged for dispatch into
/// the per-request loaders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Entity {
    Customer(Customer),
    Company(Company),
    PricingDetails(PricingDetails),
    CompanyPartnership(CompanyPartnership),
}

impl From<&CustomerRecord> for Customer {
    fn from(record: &CustomerRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            company_id: record.company_id,
            pricing_details_id: record.pricing_details_id,
            out_of_office_delegate: record.out_of_office_delegate,
        }
    }
}

impl From<&CompanyRecord> for Company {
    fn from(record: &CompanyRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            address: record.address.clone(),
            pricing_details_id: record.pricing_details_id,
            primary_contact: record.primary_contact,
        }
    }
}

impl From<Customer> for Entity {
    fn from(value: Customer) -> Self {
        Entity::Customer(value)
    }
}

impl From<Company> for Entity {
    fn from(value: Company) -> Self {
        Entity::Company(value)
    }
}

impl From<PricingDetails> for Entity {
    fn from(value: PricingDetails) -> Self {
        Entity::PricingDetails(value)
    }
}

impl From<CompanyPartnership> for Entity {
    fn from(value: CompanyPartnership) -> Self {
        Entity::CompanyPartnership(value)
    }
}

impl Keyed for Customer {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Company {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for PricingDetails {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for CompanyPartnership {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}
