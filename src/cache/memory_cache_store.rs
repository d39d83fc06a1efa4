//! In-process cache back end.
//!
//! LRU eviction bounded by capacity, with a per-entry expiry.

use std::{num::NonZeroUsize, sync::Mutex, time::{Duration, Instant}};

use async_trait::async_trait;
use lru::LruCache;

use crate::{cache::CacheStore, error::StoreError};

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct MemoryCacheStore {
    inner: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn with_capacity(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self { inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut cache = self.inner.lock()
            .map_err(|_| StoreError::Backend("cache lock poisoned".to_string()))?;

        match cache.get(key) {
            Some(entry) if entry.is_expired() => {
                cache.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.payload.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, payload: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        let mut cache = self.inner.lock()
            .map_err(|_| StoreError::Backend("cache lock poisoned".to_string()))?;

        cache.put(key.to_string(), CacheEntry { payload, expires_at: Instant::now() + ttl });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryCacheStore::with_capacity(4);
        store.set("k", b"v".to_vec(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted_on_read() {
        let store = MemoryCacheStore::with_capacity(4);
        store.set("k", b"v".to_vec(), Duration::ZERO).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = MemoryCacheStore::with_capacity(2);
        let ttl = Duration::from_secs(60);
        store.set("a", vec![1], ttl).await.unwrap();
        store.set("b", vec![2], ttl).await.unwrap();
        store.get("a").await.unwrap();
        store.set("c", vec![3], ttl).await.unwrap();

        assert!(store.get("b").await.unwrap().is_none());
        assert!(store.get("a").await.unwrap().is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let store = MemoryCacheStore::with_capacity(0);
        assert!(store.is_empty());
    }
}
