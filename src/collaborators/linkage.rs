use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A record linking a source patient id to a master patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientLink {
    pub master_patient_id: String,
    pub patient_id: String,
    pub score: f64,
    pub method: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl PatientLink {
    pub fn new(master_patient_id: &str, patient_id: &str, score: f64, method: &str) -> Self {
        Self {
            master_patient_id: master_patient_id.to_string(),
            patient_id: patient_id.to_string(),
            score,
            method: method.to_string(),
            attributes: Map::new(),
        }
    }
}

#[async_trait]
pub trait LinkageRepository: Send + Sync {
    /// Links for `patient_id`, newest first, at most `limit`. The first link
    /// is the primary one.
    async fn find_links_by_patient(&self, patient_id: &str, limit: usize) -> Result<Vec<PatientLink>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryLinkageRepository {
    links: RwLock<Vec<PatientLink>>,
}

impl MemoryLinkageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, link: PatientLink) {
        self.links.write().unwrap_or_else(PoisonError::into_inner).push(link);
    }
}

#[async_trait]
impl LinkageRepository for MemoryLinkageRepository {
    async fn find_links_by_patient(&self, patient_id: &str, limit: usize) -> Result<Vec<PatientLink>, StoreError> {
        let links = self.links.read().unwrap_or_else(PoisonError::into_inner);
        Ok(links.iter()
            .rev()
            .filter(|l| l.patient_id == patient_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
