use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{cache::CacheStore, models::CohortResult};

/// Typed cohort result cache over a byte-oriented `CacheStore`.
///
/// Cache failures never fail a query: read errors and undecodable payloads
/// count as misses and write errors are only logged.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<CohortResult> {
        let payload = match self.store.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(key, "cohort cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "cohort cache read failed");
                return None;
            }
        };

        match serde_json::from_slice::<CohortResult>(&payload) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cohort cache entry");
                None
            }
        }
    }

    pub async fn put(&self, key: &str, result: &CohortResult) {
        let payload = match serde_json::to_vec(result) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "cohort result is not serializable");
                return;
            }
        };

        if let Err(e) = self.store.set(key, payload, self.ttl).await {
            warn!(key, error = %e, "cohort cache write failed");
        }
    }
}
