use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{collaborators::Attributes, database::{Fact, FieldCatalog}, executor::Projection};

/// Per-patient feature summary pushed to the feature store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedFeatures {
    pub cohort_id: String,
    pub patient_id: String,
    pub record_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_concept: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_value: Option<f64>,
    pub materialized_at: DateTime<Utc>,
}

impl MaterializedFeatures {
    /// Summarizes `facts` of one patient. The latest fact is the one with
    /// the greatest event time, the first of equals winning; the average
    /// covers only values readable as numbers.
    pub fn build(
        cohort_id: &str,
        patient_id: &str,
        facts: &[&Fact],
        catalog: &FieldCatalog,
        materialized_at: DateTime<Utc>,
    ) -> Self {
        let mut latest: Option<&Fact> = None;
        for &fact in facts {
            if latest.is_none_or(|l| fact.timestamp > l.timestamp) {
                latest = Some(fact);
            }
        }

        let numbers = facts.iter()
            .filter_map(|f| Projection::read(f, "value", catalog).as_f64())
            .collect::<Vec<_>>();
        let average_value = (!numbers.is_empty()).then(|| numbers.iter().sum::<f64>() / numbers.len() as f64);

        let attribute = |fact: &Fact, field: &str| {
            let value = Projection::read(fact, field, catalog);
            (!value.is_null()).then(|| value.to_json())
        };

        Self {
            cohort_id: cohort_id.to_string(),
            patient_id: patient_id.to_string(),
            record_count: facts.len(),
            latest_concept: latest.and_then(|f| attribute(f, "concept")),
            latest_value: latest.and_then(|f| attribute(f, "value")),
            latest_timestamp: latest.map(|f| f.timestamp),
            average_value,
            materialized_at,
        }
    }

    /// Groups facts by patient id, preserving encounter order within a patient.
    pub fn group_by_patient(facts: &[Fact]) -> HashMap<&str, Vec<&Fact>> {
        let mut groups: HashMap<&str, Vec<&Fact>> = HashMap::new();
        for fact in facts {
            groups.entry(fact.patient_id.as_str()).or_default().push(fact);
        }
        groups
    }

    pub fn to_attributes(&self) -> Attributes {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Attributes::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_build() {
        let facts = vec![
            Fact::new("f1", "p1", "Observation", at(1)).with_attribute("concept", json!("glucose")).with_attribute("value", json!(6.0)),
            Fact::new("f2", "p1", "Observation", at(3)).with_attribute("concept", json!("hba1c")).with_attribute("value", json!("8")),
            Fact::new("f3", "p1", "Observation", at(2)).with_attribute("concept", json!("note")).with_attribute("value", json!("n/a")),
        ];
        let refs = facts.iter().collect::<Vec<_>>();
        let features = MaterializedFeatures::build("c1", "p1", &refs, &FieldCatalog::clinical_defaults(), at(9));

        assert_eq!(features.record_count, 3);
        assert_eq!(features.latest_concept, Some(json!("hba1c")));
        assert_eq!(features.latest_value, Some(json!(8.0)));
        assert_eq!(features.latest_timestamp, Some(at(3)));
        assert_eq!(features.average_value, Some(7.0));
    }

    #[test]
    fn test_ties_keep_first() {
        let facts = vec![
            Fact::new("f1", "p1", "Observation", at(1)).with_attribute("concept", json!("first")),
            Fact::new("f2", "p1", "Observation", at(1)).with_attribute("concept", json!("second")),
        ];
        let refs = facts.iter().collect::<Vec<_>>();
        let features = MaterializedFeatures::build("c1", "p1", &refs, &FieldCatalog::clinical_defaults(), at(9));

        assert_eq!(features.latest_concept, Some(json!("first")));
        assert_eq!(features.average_value, None);
    }

    #[test]
    fn test_empty_patient() {
        let features = MaterializedFeatures::build("c1", "p1", &[], &FieldCatalog::clinical_defaults(), at(9));
        let attrs = features.to_attributes();

        assert_eq!(attrs["record_count"], json!(0));
        assert!(!attrs.contains_key("latest_timestamp"));
        assert_eq!(attrs["cohort_id"], json!("c1"));
    }

    #[test]
    fn test_group_by_patient() {
        let facts = vec![
            Fact::new("f1", "p1", "Observation", at(1)),
            Fact::new("f2", "p2", "Observation", at(1)),
            Fact::new("f3", "p1", "Observation", at(2)),
        ];
        let groups = MaterializedFeatures::group_by_patient(&facts);

        assert_eq!(groups["p1"].iter().map(|f| f.id.as_str()).collect::<Vec<_>>(), vec!["f1", "f3"]);
        assert_eq!(groups["p2"].len(), 1);
    }
}
