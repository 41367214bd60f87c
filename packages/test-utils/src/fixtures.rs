//! Sample catalog fixtures
//!
//! One coherent data set shared by the integration suites: three companies,
//! four customers, three tiers of pricing terms and one partnership. The
//! references are arranged to exercise the interesting join shapes: a
//! customer with a delegate (self-join), companies with and without a
//! primary contact, two customers sharing one company, and pricing terms
//! shared between customers and companies.

use graphfetch_core::query::SqlValue;
use graphfetch_core::schema::TableId;

use crate::MemoryStore;

fn bigint(v: i64) -> SqlValue {
    SqlValue::BigInt(v)
}

fn text(v: &str) -> SqlValue {
    SqlValue::Text(v.to_owned())
}

fn double(v: f64) -> SqlValue {
    SqlValue::Double(v)
}

/// A [`MemoryStore`] pre-loaded with the sample catalog.
pub fn sample_store() -> MemoryStore {
    let mut store = MemoryStore::new();

    for (id, description, value) in [(1, "Zero", 0.0), (2, "Reduced", 5.0), (3, "Standard", 20.0)]
    {
        store.insert(
            TableId::VatRate,
            vec![
                ("id", bigint(id)),
                ("description", text(description)),
                ("value", double(value)),
            ],
        );
    }

    for (id, description, value) in [(1, "None", 0.0), (2, "Staff", 10.0), (3, "Partner", 15.0)] {
        store.insert(
            TableId::DiscountRate,
            vec![
                ("id", bigint(id)),
                ("description", text(description)),
                ("value", double(value)),
            ],
        );
    }

    for (id, description, charge) in [
        (1, "Card", 1.5),
        (2, "Direct debit", 0.0),
        (3, "Invoice", 0.25),
    ] {
        store.insert(
            TableId::PaymentMethod,
            vec![
                ("id", bigint(id)),
                ("description", text(description)),
                ("charge", double(charge)),
            ],
        );
    }

    for (id, description, vat, discount, payment) in [
        (1, "Standard terms", 3, 1, 1),
        (2, "Staff terms", 3, 2, 2),
        (3, "Partner terms", 2, 3, 3),
    ] {
        store.insert(
            TableId::PricingDetails,
            vec![
                ("id", bigint(id)),
                ("description", text(description)),
                ("vat_rate_id", bigint(vat)),
                ("discount_rate_id", bigint(discount)),
                ("preferred_payment_method_id", bigint(payment)),
            ],
        );
    }

    for (id, name, address, pricing, contact) in [
        (1, "Acme Widgets", "1 Main St", 1, Some(2)),
        (2, "Globex", "2 High St", 3, None),
        (3, "Initech", "3 Low Rd", 1, None),
    ] {
        store.insert(
            TableId::Company,
            vec![
                ("id", bigint(id)),
                ("name", text(name)),
                ("address", text(address)),
                ("pricing_details_id", bigint(pricing)),
                (
                    "primary_contact",
                    contact.map_or(SqlValue::Null, SqlValue::BigInt),
                ),
            ],
        );
    }

    for (id, first, last, company, pricing, delegate) in [
        (1, "Ada", "Lovelace", 1, 1, Some(2)),
        (2, "Grace", "Hopper", 1, 2, None),
        (3, "Alan", "Turing", 2, 1, None),
        (4, "Edsger", "Dijkstra", 2, 3, Some(1)),
    ] {
        store.insert(
            TableId::Customer,
            vec![
                ("id", bigint(id)),
                ("first_name", text(first)),
                ("last_name", text(last)),
                ("company_id", bigint(company)),
                ("pricing_details_id", bigint(pricing)),
                (
                    "out_of_office_delegate",
                    delegate.map_or(SqlValue::Null, SqlValue::BigInt),
                ),
            ],
        );
    }

    store.insert(
        TableId::CompanyPartnership,
        vec![
            ("id", bigint(1)),
            ("company_a", bigint(1)),
            ("company_b", bigint(2)),
        ],
    );

    store
}
