//! Per-request fetch context
//!
//! A [`RequestContext`] lives for exactly one client request and owns one
//! [`Loader`] per entity type. Resolvers load related entities through it;
//! repositories prime it with every entity their joined queries brought
//! back, so a later load for an already-seen entity never touches the store.
//!
//! The loaders batch-fetch through the shared [`Repositories`], without the
//! context itself, so a loader-driven fetch primes nothing and cannot
//! re-enter the context it belongs to.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ConfigError, FetchError, SharedFetchError};
use crate::joins::JoinConfig;
use crate::loader::{BatchFetch, Loader};
use crate::models::{Company, CompanyPartnership, Customer, Entity, Keyed, PricingDetails};
use crate::repositories::{
    CompanyPartnershipRepository, CompanyRepository, CustomerRepository, EntityRepository,
    PricingDetailsRepository,
};
use crate::store::Store;

/// The request-independent repository set, built once at startup and shared
/// by every request.
pub struct Repositories {
    pub customers: Arc<CustomerRepository>,
    pub companies: Arc<CompanyRepository>,
    pub pricing_details: Arc<PricingDetailsRepository>,
    pub company_partnerships: Arc<CompanyPartnershipRepository>,
}

impl Repositories {
    pub fn new(store: Arc<dyn Store>, config: Arc<JoinConfig>) -> Result<Self, ConfigError> {
        Ok(Self {
            customers: Arc::new(CustomerRepository::new(store.clone(), config.clone())),
            companies: Arc::new(CompanyRepository::new(store.clone(), config.clone())),
            pricing_details: Arc::new(PricingDetailsRepository::new(
                store.clone(),
                config.clone(),
            )?),
            company_partnerships: Arc::new(CompanyPartnershipRepository::new(store, config)?),
        })
    }
}

/// Adapts a repository's `find_by_ids` into a loader's batch fetch. No
/// selection and no context: a batch fetch retrieves the entities themselves
/// and nothing beyond them.
struct RepositoryFetch<R>(Arc<R>);

#[async_trait]
impl<R, E> BatchFetch<E> for RepositoryFetch<R>
where
    R: EntityRepository<E>,
    E: Keyed<Key = i64> + Clone + Send + Sync + 'static,
{
    async fn fetch_by_keys(&self, keys: &[i64]) -> Result<Vec<E>, FetchError> {
        self.0.find_by_ids(keys, None, None).await
    }
}

/// One request's worth of loaders, one per entity type.
pub struct RequestContext {
    pub customers: Loader<Customer>,
    pub companies: Loader<Company>,
    pub pricing_details: Loader<PricingDetails>,
    pub company_partnerships: Loader<CompanyPartnership>,
}

impl RequestContext {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            customers: Loader::new(Arc::new(RepositoryFetch(repositories.customers.clone()))),
            companies: Loader::new(Arc::new(RepositoryFetch(repositories.companies.clone()))),
            pricing_details: Loader::new(Arc::new(RepositoryFetch(
                repositories.pricing_details.clone(),
            ))),
            company_partnerships: Loader::new(Arc::new(RepositoryFetch(
                repositories.company_partnerships.clone(),
            ))),
        }
    }

    /// Routes an entity into the loader for its type.
    pub fn prime(&self, entity: &Entity) {
        match entity {
            Entity::Customer(c) => self.customers.prime(c.clone()),
            Entity::Company(c) => self.companies.prime(c.clone()),
            Entity::PricingDetails(p) => self.pricing_details.prime(p.clone()),
            Entity::CompanyPartnership(p) => self.company_partnerships.prime(p.clone()),
        }
    }

    /// Keys queued across all loaders, i.e. how much work the next dispatch
    /// round has.
    pub fn pending(&self) -> usize {
        self.customers.pending()
            + self.companies.pending()
            + self.pricing_details.pending()
            + self.company_partnerships.pending()
    }

    /// Runs one dispatch round over every loader. The execution engine calls
    /// this whenever all currently-runnable resolution has suspended on a
    /// load; each loader with pending keys issues exactly one fetch.
    ///
    /// Every loader is dispatched even when an earlier one fails: a batch
    /// failure belongs to the keys that shared that batch, not to the round.
    /// The first error is returned after the round completes.
    pub async fn dispatch_all(&self) -> Result<(), SharedFetchError> {
        [
            self.customers.dispatch().await,
            self.companies.dispatch().await,
            self.pricing_details.dispatch().await,
            self.company_partnerships.dispatch().await,
        ]
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::query::{SelectQuery, SqlRow};

    struct UnreachableStore;

    #[async_trait]
    impl Store for UnreachableStore {
        async fn select(&self, _query: &SelectQuery) -> Result<Vec<SqlRow>, StoreError> {
            panic!("store must not be hit in this test");
        }
    }

    fn context() -> RequestContext {
        let config = Arc::new(JoinConfig::standard().unwrap());
        let repositories = Repositories::new(Arc::new(UnreachableStore), config).unwrap();
        RequestContext::new(&repositories)
    }

    #[tokio::test]
    async fn prime_routes_by_entity_type() {
        let ctx = context();
        let company = Company {
            id: 3,
            name: "Acme".into(),
            address: "1 Main St".into(),
            pricing_details_id: 1,
            primary_contact: None,
        };
        ctx.prime(&Entity::Company(company.clone()));

        assert_eq!(ctx.companies.load(3).await.unwrap(), Some(company));
        assert_eq!(ctx.pending(), 0);
    }

    #[tokio::test]
    async fn dispatch_all_is_a_no_op_when_nothing_is_pending() {
        let ctx = context();
        ctx.dispatch_all().await.unwrap();
    }
}
