use std::{collections::HashMap, sync::{PoisonError, RwLock}, time::{Duration, Instant}};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{collaborators::{Attributes, FeatureStore}, error::StoreError};

/// One versioned offline feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineFeatureRecord {
    pub id: String,
    pub patient_id: String,
    pub features: Attributes,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct OnlineEntry {
    attributes: Attributes,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct MemoryFeatureStore {
    online: RwLock<HashMap<String, OnlineEntry>>,
    offline: RwLock<HashMap<String, Vec<OfflineFeatureRecord>>>,
}

impl MemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offline history of a patient, oldest version first.
    pub fn offline_versions(&self, patient_id: &str) -> Vec<OfflineFeatureRecord> {
        let offline = self.offline.read().unwrap_or_else(PoisonError::into_inner);
        let mut versions = offline.get(patient_id).cloned().unwrap_or_default();
        versions.sort_by_key(|r| r.version);
        versions
    }

    pub fn evict_online(&self, patient_id: &str) {
        self.online.write().unwrap_or_else(PoisonError::into_inner).remove(patient_id);
    }
}

#[async_trait]
impl FeatureStore for MemoryFeatureStore {
    async fn get_online(&self, patient_id: &str) -> Result<Attributes, StoreError> {
        let online = self.online.read().unwrap_or_else(PoisonError::into_inner);
        Ok(online.get(patient_id)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.attributes.clone())
            .unwrap_or_default())
    }

    async fn get_latest_offline(&self, patient_id: &str) -> Result<Attributes, StoreError> {
        let offline = self.offline.read().unwrap_or_else(PoisonError::into_inner);
        Ok(offline.get(patient_id)
            .and_then(|versions| versions.iter().max_by_key(|r| r.version))
            .map(|r| r.features.clone())
            .unwrap_or_default())
    }

    async fn write_offline(&self, patient_id: &str, attributes: &Attributes, version: i64) -> Result<(), StoreError> {
        let record = OfflineFeatureRecord {
            id: format!("{}:{}", patient_id, version),
            patient_id: patient_id.to_string(),
            features: attributes.clone(),
            version,
            created_at: Utc::now(),
        };

        let mut offline = self.offline.write().unwrap_or_else(PoisonError::into_inner);
        let versions = offline.entry(patient_id.to_string()).or_default();
        versions.retain(|r| r.version != version);
        versions.push(record);
        Ok(())
    }

    async fn write_online(&self, patient_id: &str, attributes: &Attributes, ttl: Duration) -> Result<(), StoreError> {
        let entry = OnlineEntry { attributes: attributes.clone(), expires_at: Instant::now() + ttl };
        self.online.write().unwrap_or_else(PoisonError::into_inner).insert(patient_id.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn attrs(count: i64) -> Attributes {
        json!({ "record_count": count }).as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_offline_latest_version_wins() {
        let store = MemoryFeatureStore::new();
        store.write_offline("p1", &attrs(2), 200).await.unwrap();
        store.write_offline("p1", &attrs(1), 100).await.unwrap();

        assert_eq!(store.get_latest_offline("p1").await.unwrap(), attrs(2));
        assert_eq!(store.offline_versions("p1").len(), 2);
        assert!(store.get_latest_offline("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_same_version_is_replaced() {
        let store = MemoryFeatureStore::new();
        store.write_offline("p1", &attrs(1), 100).await.unwrap();
        store.write_offline("p1", &attrs(5), 100).await.unwrap();

        let versions = store.offline_versions("p1");
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].id, "p1:100");
        assert_eq!(versions[0].features, attrs(5));
    }

    #[tokio::test]
    async fn test_online_expires() {
        let store = MemoryFeatureStore::new();
        store.write_online("p1", &attrs(1), Duration::from_secs(60)).await.unwrap();
        store.write_online("p2", &attrs(1), Duration::ZERO).await.unwrap();

        assert_eq!(store.get_online("p1").await.unwrap(), attrs(1));
        assert!(store.get_online("p2").await.unwrap().is_empty());

        store.evict_online("p1");
        assert!(store.get_online("p1").await.unwrap().is_empty());
    }
}
