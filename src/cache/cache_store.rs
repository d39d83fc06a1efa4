use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Key/value back end for cached cohort results.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn set(&self, key: &str, payload: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;
}
