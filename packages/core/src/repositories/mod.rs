//! Repository layer
//!
//! One repository per entity type, all built on the shared machinery in
//! [`entity`]: map the requested selection onto joins, plan and execute a
//! single query, demultiplex each row, convert to entities, prime every
//! secondary entity into the request's loaders, and return the primary
//! entities in row order.

pub mod company;
pub mod company_partnership;
pub mod customer;
pub mod entity;
pub mod pricing_details;

pub use company::CompanyRepository;
pub use company_partnership::CompanyPartnershipRepository;
pub use customer::CustomerRepository;
pub use entity::EntityRepository;
pub use pricing_details::PricingDetailsRepository;
