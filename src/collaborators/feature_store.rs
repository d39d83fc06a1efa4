use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Flat feature attributes of one patient.
pub type Attributes = Map<String, Value>;

/// Two-tier feature store: a TTL-bound online cache in front of versioned
/// offline snapshots.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Empty when nothing is cached for the patient.
    async fn get_online(&self, patient_id: &str) -> Result<Attributes, StoreError>;

    /// Attributes of the highest offline version, empty when none exists.
    async fn get_latest_offline(&self, patient_id: &str) -> Result<Attributes, StoreError>;

    async fn write_offline(&self, patient_id: &str, attributes: &Attributes, version: i64) -> Result<(), StoreError>;

    async fn write_online(&self, patient_id: &str, attributes: &Attributes, ttl: Duration) -> Result<(), StoreError>;
}
