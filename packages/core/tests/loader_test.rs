//! Loader batching behavior, driven through an instrumented batch fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use graphfetch_core::error::FetchError;
use graphfetch_core::loader::{BatchFetch, Loader};
use graphfetch_core::models::Customer;

/// Serves customers from a fixed map, in map iteration order (deliberately
/// unrelated to key order), recording the keys of every batch.
struct RecordingFetch {
    customers: HashMap<i64, Customer>,
    batches: Mutex<Vec<Vec<i64>>>,
}

impl RecordingFetch {
    fn with_ids(ids: &[i64]) -> Arc<Self> {
        Arc::new(Self {
            customers: ids.iter().map(|id| (*id, customer(*id))).collect(),
            batches: Mutex::new(Vec::new()),
        })
    }

    fn batches(&self) -> Vec<Vec<i64>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchFetch<Customer> for RecordingFetch {
    async fn fetch_by_keys(&self, keys: &[i64]) -> Result<Vec<Customer>, FetchError> {
        self.batches.lock().unwrap().push(keys.to_vec());
        Ok(self
            .customers
            .values()
            .filter(|c| keys.contains(&c.id))
            .cloned()
            .collect())
    }
}

struct FailingFetch;

#[async_trait]
impl BatchFetch<Customer> for FailingFetch {
    async fn fetch_by_keys(&self, _keys: &[i64]) -> Result<Vec<Customer>, FetchError> {
        Err(FetchError::Decode("boom".into()))
    }
}

fn customer(id: i64) -> Customer {
    Customer {
        id,
        first_name: format!("Customer{id}"),
        last_name: "Test".into(),
        company_id: 1,
        pricing_details_id: 1,
        out_of_office_delegate: None,
    }
}

#[tokio::test]
async fn results_align_with_key_order() {
    let fetch = RecordingFetch::with_ids(&[1, 3]);
    let loader = Loader::new(fetch.clone() as Arc<dyn BatchFetch<Customer>>);

    let pending = loader.load_many(vec![2, 1, 3]);
    loader.dispatch().await.unwrap();
    let loaded = pending.await.unwrap();

    // Key 2 has no entity; its position holds None rather than shifting the
    // rest.
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0], None);
    assert_eq!(loaded[1].as_ref().map(|c| c.id), Some(1));
    assert_eq!(loaded[2].as_ref().map(|c| c.id), Some(3));
    assert_eq!(fetch.batches(), vec![vec![2, 1, 3]]);
}

#[tokio::test]
async fn concurrent_loads_of_one_key_share_a_fetch() {
    let fetch = RecordingFetch::with_ids(&[5]);
    let loader = Loader::new(fetch.clone() as Arc<dyn BatchFetch<Customer>>);

    let first = loader.load(5);
    let second = loader.load(5);
    assert_eq!(loader.pending(), 1);

    loader.dispatch().await.unwrap();
    assert_eq!(first.await.unwrap().map(|c| c.id), Some(5));
    assert_eq!(second.await.unwrap().map(|c| c.id), Some(5));
    assert_eq!(fetch.batches(), vec![vec![5]]);
}

#[tokio::test]
async fn primed_keys_stay_out_of_the_batch() {
    let fetch = RecordingFetch::with_ids(&[1, 2]);
    let loader = Loader::new(fetch.clone() as Arc<dyn BatchFetch<Customer>>);
    loader.prime(customer(1));

    let one = loader.load(1);
    let two = loader.load(2);
    loader.dispatch().await.unwrap();

    assert_eq!(one.await.unwrap().map(|c| c.id), Some(1));
    assert_eq!(two.await.unwrap().map(|c| c.id), Some(2));
    assert_eq!(fetch.batches(), vec![vec![2]]);
}

#[tokio::test]
async fn failed_batch_shares_one_error_and_frees_the_keys() {
    let loader = Loader::new(Arc::new(FailingFetch) as Arc<dyn BatchFetch<Customer>>);

    let first = loader.load(1);
    let second = loader.load(2);
    let dispatch_err = loader.dispatch().await.unwrap_err();

    let first_err = first.await.unwrap_err();
    let second_err = second.await.unwrap_err();
    assert!(Arc::ptr_eq(&first_err, &second_err));
    assert!(Arc::ptr_eq(&first_err, &dispatch_err));
    assert!(matches!(*first_err, FetchError::Decode(_)));

    // The keys went back to unrequested, so a retry re-queues them.
    assert_eq!(loader.pending(), 0);
    let _retry = loader.load(1);
    assert_eq!(loader.pending(), 1);
}

#[tokio::test]
async fn dispatch_only_covers_keys_pending_at_the_time() {
    let fetch = RecordingFetch::with_ids(&[1, 2]);
    let loader = Loader::new(fetch.clone() as Arc<dyn BatchFetch<Customer>>);

    let first = loader.load(1);
    loader.dispatch().await.unwrap();
    assert_eq!(first.await.unwrap().map(|c| c.id), Some(1));

    let second = loader.load(2);
    loader.dispatch().await.unwrap();
    assert_eq!(second.await.unwrap().map(|c| c.id), Some(2));

    assert_eq!(fetch.batches(), vec![vec![1], vec![2]]);
}
