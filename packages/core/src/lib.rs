//! Data-fetch layer for graph-shaped query APIs
//!
//! Serving a nested query naively issues one database round trip per parent
//! entity per level (the N+1 problem). This crate avoids that with two
//! cooperating mechanisms:
//!
//! - **Join planning** ([`joins`]): a client selection is mapped onto the
//!   registered relationships between tables, planned into a single SELECT
//!   with one aliased LEFT OUTER JOIN per relationship, and each result row
//!   is demultiplexed back into per-table records and converted to entities.
//! - **Batched loading** ([`loader`], [`context`]): a per-request cache per
//!   entity type that deduplicates keys and fetches each batch with one
//!   query. Repositories prime the loaders with every entity their joined
//!   queries already brought back, so related data fetched via a join is
//!   never fetched again.
//!
//! [`repositories`] ties the two together: one repository per entity type,
//! each running the map-plan-execute-demultiplex-convert-prime pipeline over
//! a [`store::Store`].

pub mod config;
pub mod context;
pub mod error;
pub mod joins;
pub mod loader;
pub mod models;
pub mod query;
pub mod repositories;
pub mod schema;
pub mod store;

pub use config::DatabaseConfig;
pub use context::{Repositories, RequestContext};
pub use error::{ConfigError, FetchError, FetchResult, SharedFetchError, StoreError};
pub use joins::{JoinConfig, Selection};
pub use loader::{BatchFetch, LoadResult, Loader};
pub use models::{
    Company, CompanyPartnership, Customer, DiscountRate, Entity, Keyed, PaymentMethod,
    PricingDetails, VatRate,
};
pub use store::{PgStore, Store};
