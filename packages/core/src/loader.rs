//! Batched per-request loader
//!
//! A [`Loader`] is a per-request, per-entity-type cache that deduplicates
//! and batches fetches by key. Each key moves through a small state machine:
//!
//! ```text
//! unrequested -> pending -> resolved        (via load + dispatch)
//! unrequested -> resolved                   (via prime)
//! ```
//!
//! [`Loader::load`] registers its key synchronously and returns a future
//! that completes when the batch does, so any execution engine can drive
//! batching by calling [`Loader::dispatch`] at its own natural batching
//! points (the moments all currently-runnable resolution has suspended on a
//! loader). The loader assumes no particular runtime beyond `Send` futures.
//!
//! One dispatch issues exactly one fetch for all keys pending at that
//! moment, re-aligns the results to key order, and resolves absent keys to
//! `None`; absence is domain data, not an error. A failed fetch fails every
//! key that shared the batch with one shared error.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::oneshot;

use crate::error::{FetchError, SharedFetchError};
use crate::models::Keyed;

/// Outcome of one load: the value, `None` for a key with no entity, or the
/// shared failure of the batch the key was part of.
pub type LoadResult<V> = Result<Option<V>, SharedFetchError>;

/// The batch fetch behind a loader: given the deduplicated keys of one
/// dispatch round, returns the matching values in any order.
#[async_trait]
pub trait BatchFetch<V: Keyed>: Send + Sync {
    async fn fetch_by_keys(&self, keys: &[V::Key]) -> Result<Vec<V>, FetchError>;
}

enum Slot<V> {
    /// Key is queued for the next dispatch; senders wake the waiting loads.
    Pending(Vec<oneshot::Sender<LoadResult<V>>>),
    /// Terminal: fetched or primed. `None` records a confirmed absence.
    Resolved(Option<V>),
}

struct Inner<V: Keyed> {
    slots: HashMap<V::Key, Slot<V>>,
    queue: Vec<V::Key>,
}

/// A batching cache for one entity type within one request.
pub struct Loader<V: Keyed> {
    fetch: Arc<dyn BatchFetch<V>>,
    inner: Mutex<Inner<V>>,
}

enum Waiter<V> {
    Ready(LoadResult<V>),
    Wait(oneshot::Receiver<LoadResult<V>>),
}

impl<V> Loader<V>
where
    V: Keyed + Clone + Send + Sync + 'static,
{
    pub fn new(fetch: Arc<dyn BatchFetch<V>>) -> Self {
        Self {
            fetch,
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                queue: Vec::new(),
            }),
        }
    }

    /// Requests the value for `key`. The key is registered before this
    /// returns; the returned future completes once the key is resolved:
    /// immediately for primed or already-fetched keys, otherwise when the
    /// batch containing the key is dispatched. Concurrent loads of one key
    /// within a dispatch window share a single fetch.
    pub fn load(&self, key: V::Key) -> impl Future<Output = LoadResult<V>> + Send {
        let waiter = {
            let mut inner = self.inner.lock().expect("loader mutex poisoned");
            match inner.slots.get_mut(&key) {
                Some(Slot::Resolved(value)) => Waiter::Ready(Ok(value.clone())),
                Some(Slot::Pending(waiters)) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Waiter::Wait(rx)
                }
                None => {
                    let (tx, rx) = oneshot::channel();
                    inner.slots.insert(key.clone(), Slot::Pending(vec![tx]));
                    inner.queue.push(key);
                    Waiter::Wait(rx)
                }
            }
        };
        async move {
            match waiter {
                Waiter::Ready(result) => result,
                Waiter::Wait(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(Arc::new(FetchError::Abandoned))),
            }
        }
    }

    /// Loads several keys; the result is positionally aligned with `keys`,
    /// with `None` at the position of any key that has no entity.
    pub fn load_many(
        &self,
        keys: Vec<V::Key>,
    ) -> impl Future<Output = Result<Vec<Option<V>>, SharedFetchError>> + Send {
        let loads: Vec<_> = keys.into_iter().map(|key| self.load(key)).collect();
        async move { join_all(loads).await.into_iter().collect() }
    }

    /// Caches `value` under its key so a later load resolves without a
    /// fetch. First write wins: a key that is already pending or resolved is
    /// left untouched, so priming can never clobber an in-flight or
    /// delivered value.
    pub fn prime(&self, value: V) {
        let mut inner = self.inner.lock().expect("loader mutex poisoned");
        inner
            .slots
            .entry(value.key())
            .or_insert_with(|| Slot::Resolved(Some(value)));
    }

    /// Number of keys waiting for the next dispatch.
    pub fn pending(&self) -> usize {
        self.inner.lock().expect("loader mutex poisoned").queue.len()
    }

    /// Issues exactly one fetch for every key currently pending, resolving
    /// each waiting load. Keys the fetch did not return resolve to `None`.
    /// On failure every key in the batch receives the same shared error and
    /// returns to the unrequested state, leaving retry policy to callers.
    pub async fn dispatch(&self) -> Result<(), SharedFetchError> {
        let keys = {
            let mut inner = self.inner.lock().expect("loader mutex poisoned");
            std::mem::take(&mut inner.queue)
        };
        if keys.is_empty() {
            return Ok(());
        }
        tracing::debug!(batch_size = keys.len(), "dispatching loader batch");

        match self.fetch.fetch_by_keys(&keys).await {
            Ok(values) => {
                let mut by_key: HashMap<V::Key, V> =
                    values.into_iter().map(|v| (v.key(), v)).collect();
                let mut inner = self.inner.lock().expect("loader mutex poisoned");
                for key in keys {
                    let value = by_key.remove(&key);
                    let previous = inner.slots.insert(key, Slot::Resolved(value.clone()));
                    if let Some(Slot::Pending(waiters)) = previous {
                        for waiter in waiters {
                            let _ = waiter.send(Ok(value.clone()));
                        }
                    }
                }
                Ok(())
            }
            Err(error) => {
                let shared = Arc::new(error);
                let mut inner = self.inner.lock().expect("loader mutex poisoned");
                for key in keys {
                    if let Some(Slot::Pending(waiters)) = inner.slots.remove(&key) {
                        for waiter in waiters {
                            let _ = waiter.send(Err(shared.clone()));
                        }
                    }
                }
                Err(shared)
            }
        }
    }
}
