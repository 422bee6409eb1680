use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::errors::AppError;

struct CacheEntry<T> {
    value: Arc<T>,
    loaded_at: Instant,
    generation: u64,
}

/// Caches one collection for a short TTL.
///
/// Concurrent misses share a single load: the first caller fetches while the
/// others wait on `load_lock` and then read what it stored. `invalidate`
/// bumps the generation so that a load racing with a write never stores a
/// stale value.
pub struct CollectionCache<T> {
    name: &'static str,
    ttl: Duration,
    slot: RwLock<Option<CacheEntry<T>>>,
    load_lock: Mutex<()>,
    generation: AtomicU64,
}

impl<T> CollectionCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        CollectionCache {
            name,
            ttl,
            slot: RwLock::new(None),
            load_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn fresh(&self) -> Option<Arc<T>> {
        let generation = self.generation.load(Ordering::Acquire);
        self.slot
            .read()
            .as_ref()
            .filter(|entry| entry.generation == generation && entry.loaded_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.value))
    }

    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<T>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(value) = self.fresh() {
            return Ok(value);
        }

        let _guard = self.load_lock.lock().await;
        if let Some(value) = self.fresh() {
            tracing::trace!(cache = self.name, "served by concurrent load");
            return Ok(value);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let value = Arc::new(load().await?);

        if self.generation.load(Ordering::Acquire) == generation {
            *self.slot.write() = Some(CacheEntry {
                value: Arc::clone(&value),
                loaded_at: Instant::now(),
                generation,
            });
        }
        tracing::debug!(cache = self.name, "collection loaded");
        Ok(value)
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.slot.write() = None;
        tracing::debug!(cache = self.name, "collection invalidated");
    }

    /// Drops an expired entry. Returns `true` if something was dropped.
    pub fn evict_expired(&self) -> bool {
        let mut slot = self.slot.write();
        match slot.as_ref() {
            Some(entry) if entry.loaded_at.elapsed() >= self.ttl => {
                *slot = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[actix_rt::test]
    async fn concurrent_misses_share_one_load() {
        let cache = CollectionCache::<Vec<u32>>::new("test", Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let loads = &counter;

        let requests = (0..8).map(|_| {
            cache.get_or_load(move || async move {
                loads.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(vec![1, 2, 3])
            })
        });
        let results = futures::future::join_all(requests).await;

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(*result.unwrap(), vec![1, 2, 3]);
        }
    }

    #[actix_rt::test]
    async fn invalidate_forces_reload() {
        let cache = CollectionCache::<u32>::new("test", Duration::from_secs(60));
        let first = cache.get_or_load(|| async { Ok(1) }).await.unwrap();
        let cached = cache.get_or_load(|| async { Ok(2) }).await.unwrap();
        assert_eq!((*first, *cached), (1, 1));

        cache.invalidate();
        let reloaded = cache.get_or_load(|| async { Ok(3) }).await.unwrap();
        assert_eq!(*reloaded, 3);
    }

    #[actix_rt::test]
    async fn failed_load_is_not_cached() {
        let cache = CollectionCache::<u32>::new("test", Duration::from_secs(60));
        let failed = cache
            .get_or_load(|| async { Err(AppError::InternalError("db down".into())) })
            .await;
        assert!(failed.is_err());

        let value = cache.get_or_load(|| async { Ok(7) }).await.unwrap();
        assert_eq!(*value, 7);
    }

    #[actix_rt::test]
    async fn zero_ttl_never_serves_stale() {
        let cache = CollectionCache::<u32>::new("test", Duration::ZERO);
        cache.get_or_load(|| async { Ok(1) }).await.unwrap();
        let value = cache.get_or_load(|| async { Ok(2) }).await.unwrap();
        assert_eq!(*value, 2);
        assert!(cache.evict_expired());
    }
}
