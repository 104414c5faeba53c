//! Keyed read cache with request de-duplication.
//!
//! # Design
//! Each `QueryKey` owns one `Entry`. The entry's in-flight exchange is a
//! `Shared` future: the first caller creates it, later callers clone it, and
//! all of them resolve together from a single network round trip.
//!
//! Every fetch started for a key bumps the key's generation. A result is
//! applied only if its generation is still the newest one, so a superseded
//! response that completes late never overwrites a newer request's data.
//!
//! Failures are absorbed: the handle reports `is_loading == false` and keeps
//! the last known value (if any). The error is available on the handle for
//! callers that want to inspect it, and is cleared by the next success.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::ApiError;

/// Stable identifier of a cacheable query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Cow<'static, str>);

impl QueryKey {
    pub const MY_SHOP: QueryKey = QueryKey(Cow::Borrowed("my-shop"));
    pub const MY_SHOP_ORDERS: QueryKey = QueryKey(Cow::Borrowed("my-shop-orders"));

    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read state of one query, as seen by presentation code.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHandle<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ApiError>,
}

impl<T> QueryHandle<T> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

type Value = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

struct InFlight {
    generation: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Entry {
    value: Option<Value>,
    error: Option<ApiError>,
    stale: bool,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl Entry {
    fn handle<T: Clone + 'static>(&self) -> QueryHandle<T> {
        QueryHandle {
            data: self
                .value
                .as_ref()
                .and_then(|value| (**value).downcast_ref::<T>())
                .cloned(),
            is_loading: self.in_flight.is_some(),
            error: self.error.clone(),
        }
    }
}

/// Process-wide store of query results, shared by cloning.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key`, fetching only when needed.
    ///
    /// - fresh cached value: returned without calling `fetch`
    /// - exchange already in flight: joins it
    /// - otherwise (no value, or invalidated): calls `fetch` and waits
    ///
    /// `fetch` is invoked while the cache is locked and must only build the
    /// future; the work happens when it is polled.
    pub async fn query<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> QueryHandle<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (generation, pending) = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            let joinable = entry
                .in_flight
                .as_ref()
                .filter(|_| !entry.stale)
                .map(|in_flight| (in_flight.generation, in_flight.fetch.clone()));
            if let Some((generation, pending)) = joinable {
                debug!(%key, generation, "joining in-flight query");
                (generation, pending)
            } else if !entry.stale && entry.value.is_some() {
                return entry.handle();
            } else {
                entry.generation += 1;
                entry.stale = false;
                let fut = fetch();
                let pending = async move { fut.await.map(|value| Arc::new(value) as Value) }
                    .boxed()
                    .shared();
                entry.in_flight = Some(InFlight {
                    generation: entry.generation,
                    fetch: pending.clone(),
                });
                debug!(%key, generation = entry.generation, "starting query");
                (entry.generation, pending)
            }
        };

        let outcome = pending.await;

        let mut entries = self.entries.lock();
        let entry = entries.entry(key.clone()).or_default();
        if entry.generation != generation {
            debug!(%key, generation, current = entry.generation, "discarding superseded response");
            return entry.handle();
        }
        if entry
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation)
        {
            entry.in_flight = None;
        }
        match outcome {
            Ok(value) => {
                entry.value = Some(value);
                entry.error = None;
            }
            Err(err) => {
                debug!(%key, error = %err, "query failed");
                entry.error = Some(err);
            }
        }
        entry.handle()
    }

    /// Current state of `key` without triggering a fetch.
    pub fn snapshot<T: Clone + 'static>(&self, key: &QueryKey) -> QueryHandle<T> {
        self.entries
            .lock()
            .get(key)
            .map(Entry::handle::<T>)
            .unwrap_or(QueryHandle {
                data: None,
                is_loading: false,
                error: None,
            })
    }

    /// Mark `key` stale so the next `query` re-fetches. An exchange already
    /// in flight for the key is superseded by that next fetch.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.lock().get_mut(key) {
            debug!(%key, "invalidating query");
            entry.stale = true;
        }
    }

    pub fn invalidate_all(&self) {
        for entry in self.entries.lock().values_mut() {
            entry.stale = true;
        }
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.stale)
    }
}
