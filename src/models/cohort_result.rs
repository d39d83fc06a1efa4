use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parser::analyzer::DroppedClause;

/// Outcome of an interactive cohort query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortResult {
    pub cohort_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Exact number of distinct matching patients.
    pub count: usize,
    /// Bounded sample of matching patient ids, ascending.
    pub patient_ids: Vec<String>,
    pub query_time_ms: u64,
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Projected sample records, most recent first.
    #[serde(default)]
    pub records: Vec<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slices: Option<Vec<Map<String, Value>>>,
    #[serde(rename = "cacheHit", default)]
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_clauses: Vec<DroppedClause>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cache_hit_wire_name() {
        let result = CohortResult {
            cohort_id: "c1".into(),
            metadata: ResultMetadata { cache_hit: true, ..Default::default() },
            ..Default::default()
        };
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["metadata"]["cacheHit"], json!(true));
        assert!(value["metadata"].get("slices").is_none());

        let back: CohortResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }
}
