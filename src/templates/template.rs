use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved, reusable cohort definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortTemplate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub dsl: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl CohortTemplate {
    pub fn new(name: &str, dsl: &str) -> Self {
        Self {
            id: String::new(),
            tenant_id: None,
            name: name.to_string(),
            description: None,
            dsl: dsl.to_string(),
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: &str) -> Self {
        self.tenant_id = Some(tenant_id.to_string());
        self
    }
}
