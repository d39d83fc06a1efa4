use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An interactive cohort request.
///
/// `fields`, `filters` and `limit` override what the DSL says: non-empty
/// `fields` replace the select list, each filter is appended as an extra
/// equality clause (an array becomes an `in` clause), and a positive
/// `limit` wins over the DSL limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub dsl: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Narrows evaluation to a single fact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl CohortQuery {
    pub fn new(dsl: &str) -> Self {
        Self { dsl: dsl.to_string(), ..Default::default() }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_tenant(mut self, tenant_id: &str) -> Self {
        self.tenant_id = Some(tenant_id.to_string());
        self
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_filter(mut self, field: &str, value: Value) -> Self {
        self.filters.insert(field.to_string(), value);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_record_id(mut self, record_id: &str) -> Self {
        self.record_id = Some(record_id.to_string());
        self
    }

    /// Tenant id with blanks treated as absent.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant_id.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let query: CohortQuery = serde_json::from_value(json!({ "dsl": "select patient_id" })).unwrap();

        assert_eq!(query, CohortQuery::new("select patient_id"));
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_blank_tenant_is_absent() {
        assert_eq!(CohortQuery::new("select a").with_tenant("  ").tenant(), None);
        assert_eq!(CohortQuery::new("select a").with_tenant("acme").tenant(), Some("acme"));
    }
}
