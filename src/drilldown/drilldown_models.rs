use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{collaborators::{Attributes, PatientLink}, database::Fact};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrilldownRequest {
    #[serde(default)]
    pub cohort_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub dsl: String,
    pub patient_id: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: IndexMap<String, Value>,
    /// Timeline length; unset or zero uses the configured default.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl DrilldownRequest {
    pub fn new(dsl: &str, patient_id: &str) -> Self {
        Self { dsl: dsl.to_string(), patient_id: patient_id.to_string(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub patient_id: String,
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub codes: Map<String, Value>,
    /// The fact's full canonical attribute bag.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl From<&Fact> for TimelineEvent {
    fn from(fact: &Fact) -> Self {
        Self {
            patient_id: fact.patient_id.clone(),
            resource_type: fact.resource_type.clone(),
            concept: fact.canonical.get("concept").cloned(),
            unit: fact.canonical.get("unit").cloned(),
            value: fact.canonical.get("value").cloned(),
            timestamp: fact.timestamp,
            codes: fact.codes.clone(),
            metadata: fact.canonical.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedPatient {
    pub patient_id: String,
    pub score: f64,
    pub method: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl From<&PatientLink> for LinkedPatient {
    fn from(link: &PatientLink) -> Self {
        Self {
            patient_id: link.patient_id.clone(),
            score: link.score,
            method: link.method.clone(),
            attributes: link.attributes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkageSummary {
    pub master_patient_id: String,
    pub primary_score: f64,
    pub method: String,
    pub linked_patients: Vec<LinkedPatient>,
}

impl LinkageSummary {
    /// `None` when there are no links. The first link is primary.
    pub fn from_links(links: &[PatientLink]) -> Option<Self> {
        let primary = links.first()?;
        Some(Self {
            master_patient_id: primary.master_patient_id.clone(),
            primary_score: primary.score,
            method: primary.method.clone(),
            linked_patients: links.iter().map(LinkedPatient::from).collect(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrilldownMetadata {
    pub fields: Vec<String>,
    pub filters: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    pub limit: usize,
}

/// Single-patient view of a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drilldown {
    pub cohort_id: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_patient_id: Option<String>,
    pub timeline: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkage: Option<LinkageSummary>,
    pub metadata: DrilldownMetadata,
}
