//! Query cache: keyed, deduplicated, invalidatable remote reads.
//!
//! One `QueryCache` is created at startup and handed to whoever needs it.
//! Reads of the same key share one in-flight request and one cached value.
//! Invalidating a key drops the value, discards results of fetches that
//! started before the invalidation, and wakes subscribers so they refetch.

mod keys;

pub use keys::QueryKey;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::api::ApiError;
use crate::metrics::{CACHE_INVALIDATIONS, CACHE_LOOKUPS};

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, ApiError>>>;

struct Slot {
    value: Option<CachedValue>,
    /// Bumped on every invalidation.
    generation: u64,
    /// Fetch started at `generation`.
    inflight: Option<(u64, SharedFetch)>,
    notify: watch::Sender<u64>,
}

impl Slot {
    fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            value: None,
            generation: 0,
            inflight: None,
            notify,
        }
    }

    fn invalidate(&mut self) {
        self.value = None;
        self.inflight = None;
        self.generation += 1;
        self.notify.send_replace(self.generation);
    }
}

/// Keyed cache of remote reads.
pub struct QueryCache {
    slots: Mutex<HashMap<QueryKey, Slot>>,
    /// When false, values are not kept after a fetch settles.
    retain: bool,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            retain: true,
        }
    }

    /// Cache that only deduplicates concurrent reads.
    pub fn without_retention() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            retain: false,
        }
    }

    /// Return the cached value for `key`, or run `fetch` to obtain it.
    ///
    /// Concurrent callers for the same key await the same fetch. Failures
    /// are returned to every waiter and are not cached.
    pub async fn get<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (request, generation) = {
            let mut slots = self.slots.lock().await;
            let slot = slots.entry(key.clone()).or_insert_with(Slot::new);

            if let Some(value) = &slot.value {
                CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                return downcast(&key, Arc::clone(value));
            }

            match &slot.inflight {
                Some((started, request)) if *started == slot.generation => {
                    CACHE_LOOKUPS.with_label_values(&["shared"]).inc();
                    (request.clone(), *started)
                }
                _ => {
                    CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                    debug!("Cache miss: {}", key);
                    let pending = fetch();
                    let request = async move { pending.await.map(|v| Arc::new(v) as CachedValue) }
                        .boxed()
                        .shared();
                    slot.inflight = Some((slot.generation, request.clone()));
                    (request, slot.generation)
                }
            }
        };

        let result = request.await;

        {
            let mut slots = self.slots.lock().await;
            if let Some(slot) = slots.get_mut(&key) {
                // A stale fetch must not overwrite what came after an invalidation.
                if slot.generation == generation {
                    slot.inflight = None;
                    if let (Ok(value), true) = (&result, self.retain) {
                        slot.value = Some(Arc::clone(value));
                    }
                }
            }
        }

        downcast(&key, result?)
    }

    /// Cached value for `key`, if present, without fetching.
    pub async fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let slots = self.slots.lock().await;
        slots
            .get(key)
            .and_then(|slot| slot.value.clone())
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Drop the value for `key` and notify its subscribers.
    pub async fn invalidate(&self, key: &QueryKey) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get_mut(key) {
            slot.invalidate();
            CACHE_INVALIDATIONS.inc();
            debug!("Cache invalidated: {}", key);
        }
    }

    /// Drop every key of one session scope (on logout).
    ///
    /// Slots are invalidated in place so fetches still in flight for the
    /// scope cannot store their results afterwards.
    pub async fn clear_scope(&self, scope: &str) {
        let mut slots = self.slots.lock().await;
        for (_, slot) in slots.iter_mut().filter(|(k, _)| k.scope() == Some(scope)) {
            slot.invalidate();
            CACHE_INVALIDATIONS.inc();
        }
        debug!("Cache cleared for scope {}", scope);
    }

    /// Drop everything.
    pub async fn clear(&self) {
        let mut slots = self.slots.lock().await;
        for slot in slots.values_mut() {
            slot.invalidate();
        }
        CACHE_INVALIDATIONS.inc_by(slots.len() as u64);
    }

    /// Watch invalidations of `key`. The value is the key's generation;
    /// every change means the cached data is gone and should be refetched.
    pub async fn subscribe(&self, key: QueryKey) -> watch::Receiver<u64> {
        let mut slots = self.slots.lock().await;
        slots
            .entry(key)
            .or_insert_with(Slot::new)
            .notify
            .subscribe()
    }

    /// Number of keys currently holding a value.
    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|s| s.value.is_some()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: CachedValue) -> Result<Arc<T>, ApiError> {
    value.downcast::<T>().map_err(|_| {
        ApiError::Parse(format!(
            "cached value for '{}' is not a {}",
            key,
            std::any::type_name::<T>()
        ))
    })
}
