//! Static table catalog and row projections
//!
//! The set of tables the fetch layer works with is closed and known at
//! compile time, so tables are identified by the [`TableId`] enum and each
//! row projection is a tagged [`Record`] variant. This keeps dispatch over
//! "which table did this joined data come from" an exhaustive match instead
//! of runtime type inspection.

use serde::Serialize;

use crate::error::{FetchError, FetchResult};
use crate::query::{SqlRow, SqlValue};

/// SQL type of a column, as far as this layer needs to distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Text,
    Double,
}

/// A column in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty }
}

/// Identifier of a table in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TableId {
    Customer,
    Company,
    PricingDetails,
    VatRate,
    DiscountRate,
    PaymentMethod,
    CompanyPartnership,
}

use ColumnType::{BigInt, Double, Text};

const CUSTOMER_COLUMNS: &[Column] = &[
    col("id", BigInt),
    col("first_name", Text),
    col("last_name", Text),
    col("company_id", BigInt),
    col("pricing_details_id", BigInt),
    col("out_of_office_delegate", BigInt),
];

const COMPANY_COLUMNS: &[Column] = &[
    col("id", BigInt),
    col("name", Text),
    col("address", Text),
    col("pricing_details_id", BigInt),
    col("primary_contact", BigInt),
];

const PRICING_DETAILS_COLUMNS: &[Column] = &[
    col("id", BigInt),
    col("description", Text),
    col("vat_rate_id", BigInt),
    col("discount_rate_id", BigInt),
    col("preferred_payment_method_id", BigInt),
];

const RATE_COLUMNS: &[Column] = &[
    col("id", BigInt),
    col("description", Text),
    col("value", Double),
];

const PAYMENT_METHOD_COLUMNS: &[Column] = &[
    col("id", BigInt),
    col("description", Text),
    col("charge", Double),
];

const COMPANY_PARTNERSHIP_COLUMNS: &[Column] = &[
    col("id", BigInt),
    col("company_a", BigInt),
    col("company_b", BigInt),
];

impl TableId {
    /// The table's name in the database.
    pub fn table_name(self) -> &'static str {
        match self {
            TableId::Customer => "customer",
            TableId::Company => "company",
            TableId::PricingDetails => "pricing_details",
            TableId::VatRate => "vat_rate",
            TableId::DiscountRate => "discount_rate",
            TableId::PaymentMethod => "payment_method",
            TableId::CompanyPartnership => "company_partnership",
        }
    }

    /// All columns of the table, in declaration order.
    pub fn columns(self) -> &'static [Column] {
        match self {
            TableId::Customer => CUSTOMER_COLUMNS,
            TableId::Company => COMPANY_COLUMNS,
            TableId::PricingDetails => PRICING_DETAILS_COLUMNS,
            TableId::VatRate => RATE_COLUMNS,
            TableId::DiscountRate => RATE_COLUMNS,
            TableId::PaymentMethod => PAYMENT_METHOD_COLUMNS,
            TableId::CompanyPartnership => COMPANY_PARTNERSHIP_COLUMNS,
        }
    }

    /// Looks up a column by name.
    pub fn column(self, name: &str) -> Option<Column> {
        self.columns().iter().copied().find(|c| c.name == name)
    }

    /// The primary key column. Every table in the catalog is keyed by `id`.
    pub fn id_column(self) -> &'static str {
        "id"
    }
}

/// One row of the `customer` table.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub company_id: i64,
    pub pricing_details_id: i64,
    pub out_of_office_delegate: Option<i64>,
}

/// One row of the `company` table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub pricing_details_id: i64,
    pub primary_contact: Option<i64>,
}

/// One row of the `pricing_details` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingDetailsRecord {
    pub id: i64,
    pub description: String,
    pub vat_rate_id: i64,
    pub discount_rate_id: i64,
    pub preferred_payment_method_id: i64,
}

/// One row of the `vat_rate` table.
#[derive(Debug, Clone, PartialEq)]
pub struct VatRateRecord {
    pub id: i64,
    pub description: String,
    pub value: f64,
}

/// One row of the `discount_rate` table.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountRateRecord {
    pub id: i64,
    pub description: String,
    pub value: f64,
}

/// One row of the `payment_method` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethodRecord {
    pub id: i64,
    pub description: String,
    pub charge: f64,
}

/// One row of the `company_partnership` table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyPartnershipRecord {
    pub id: i64,
    pub company_a: i64,
    pub company_b: i64,
}

/// A row projected onto one table of the catalog, tagged by table.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Customer(CustomerRecord),
    Company(CompanyRecord),
    PricingDetails(PricingDetailsRecord),
    VatRate(VatRateRecord),
    DiscountRate(DiscountRateRecord),
    PaymentMethod(PaymentMethodRecord),
    CompanyPartnership(CompanyPartnershipRecord),
}

impl Record {
    /// The table this record was projected from.
    pub fn table(&self) -> TableId {
        match self {
            Record::Customer(_) => TableId::Customer,
            Record::Company(_) => TableId::Company,
            Record::PricingDetails(_) => TableId::PricingDetails,
            Record::VatRate(_) => TableId::VatRate,
            Record::DiscountRate(_) => TableId::DiscountRate,
            Record::PaymentMethod(_) => TableId::PaymentMethod,
            Record::CompanyPartnership(_) => TableId::CompanyPartnership,
        }
    }
}

fn decode_err(alias: &str, column: &str, what: &str) -> FetchError {
    FetchError::Decode(format!("{alias}.{column}: {what}"))
}

fn req_i64(row: &SqlRow, alias: &str, column: &str) -> FetchResult<i64> {
    match row.value(alias, column) {
        Some(SqlValue::BigInt(v)) => Ok(*v),
        Some(SqlValue::Null) | None => Err(decode_err(alias, column, "unexpected NULL")),
        Some(other) => Err(decode_err(alias, column, &format!("expected bigint, got {other:?}"))),
    }
}

fn opt_i64(row: &SqlRow, alias: &str, column: &str) -> FetchResult<Option<i64>> {
    match row.value(alias, column) {
        Some(SqlValue::BigInt(v)) => Ok(Some(*v)),
        Some(SqlValue::Null) | None => Ok(None),
        Some(other) => Err(decode_err(alias, column, &format!("expected bigint, got {other:?}"))),
    }
}

fn req_text(row: &SqlRow, alias: &str, column: &str) -> FetchResult<String> {
    match row.value(alias, column) {
        Some(SqlValue::Text(v)) => Ok(v.clone()),
        Some(SqlValue::Null) | None => Err(decode_err(alias, column, "unexpected NULL")),
        Some(other) => Err(decode_err(alias, column, &format!("expected text, got {other:?}"))),
    }
}

fn req_f64(row: &SqlRow, alias: &str, column: &str) -> FetchResult<f64> {
    match row.value(alias, column) {
        Some(SqlValue::Double(v)) => Ok(*v),
        Some(SqlValue::Null) | None => Err(decode_err(alias, column, "unexpected NULL")),
        Some(other) => Err(decode_err(alias, column, &format!("expected double, got {other:?}"))),
    }
}

/// Projects the columns of `table`, read under `alias`, out of a result row.
///
/// Fails if the row does not carry the table's non-nullable columns under
/// that alias; callers are expected to check the join's key columns for NULL
/// before projecting an outer-joined table.
pub fn read_record(row: &SqlRow, table: TableId, alias: &str) -> FetchResult<Record> {
    let record = match table {
        TableId::Customer => Record::Customer(CustomerRecord {
            id: req_i64(row, alias, "id")?,
            first_name: req_text(row, alias, "first_name")?,
            last_name: req_text(row, alias, "last_name")?,
            company_id: req_i64(row, alias, "company_id")?,
            pricing_details_id: req_i64(row, alias, "pricing_details_id")?,
            out_of_office_delegate: opt_i64(row, alias, "out_of_office_delegate")?,
        }),
        TableId::Company => Record::Company(CompanyRecord {
            id: req_i64(row, alias, "id")?,
            name: req_text(row, alias, "name")?,
            address: req_text(row, alias, "address")?,
            pricing_details_id: req_i64(row, alias, "pricing_details_id")?,
            primary_contact: opt_i64(row, alias, "primary_contact")?,
        }),
        TableId::PricingDetails => Record::PricingDetails(PricingDetailsRecord {
            id: req_i64(row, alias, "id")?,
            description: req_text(row, alias, "description")?,
            vat_rate_id: req_i64(row, alias, "vat_rate_id")?,
            discount_rate_id: req_i64(row, alias, "discount_rate_id")?,
            preferred_payment_method_id: req_i64(row, alias, "preferred_payment_method_id")?,
        }),
        TableId::VatRate => Record::VatRate(VatRateRecord {
            id: req_i64(row, alias, "id")?,
            description: req_text(row, alias, "description")?,
            value: req_f64(row, alias, "value")?,
        }),
        TableId::DiscountRate => Record::DiscountRate(DiscountRateRecord {
            id: req_i64(row, alias, "id")?,
            description: req_text(row, alias, "description")?,
            value: req_f64(row, alias, "value")?,
        }),
        TableId::PaymentMethod => Record::PaymentMethod(PaymentMethodRecord {
            id: req_i64(row, alias, "id")?,
            description: req_text(row, alias, "description")?,
            charge: req_f64(row, alias, "charge")?,
        }),
        TableId::CompanyPartnership => Record::CompanyPartnership(CompanyPartnershipRecord {
            id: req_i64(row, alias, "id")?,
            company_a: req_i64(row, alias, "company_a")?,
            company_b: req_i64(row, alias, "company_b")?,
        }),
    };
    Ok(record)
}
