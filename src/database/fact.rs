use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::{FactValue, FieldLocation, ValueKind};

/// A single clinical fact as stored by the fact store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    #[serde(default)]
    pub master_patient_id: String,
    pub patient_id: String,
    pub resource_type: String,
    /// Normalized attributes: concept, value, unit, status and so on.
    #[serde(default)]
    pub canonical: Map<String, Value>,
    /// Code-system to code, e.g. `loinc -> 4548-4`.
    #[serde(default)]
    pub codes: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub ingested_at: DateTime<Utc>,
}

impl Fact {
    pub fn new(id: &str, patient_id: &str, resource_type: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            master_patient_id: String::new(),
            patient_id: patient_id.to_string(),
            resource_type: resource_type.to_string(),
            canonical: Map::new(),
            codes: Map::new(),
            timestamp,
            ingested_at: timestamp,
        }
    }

    pub fn with_master_patient_id(mut self, master_patient_id: &str) -> Self {
        self.master_patient_id = master_patient_id.to_string();
        self
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.canonical.insert(key.to_string(), value);
        self
    }

    pub fn with_code(mut self, system: &str, code: &str) -> Self {
        self.codes.insert(system.to_string(), Value::String(code.to_string()));
        self
    }

    /// Typed read of the value at `location`.
    pub fn read(&self, location: &FieldLocation, kind: ValueKind) -> FactValue {
        match location {
            FieldLocation::FactId => FactValue::String(self.id.clone()),
            FieldLocation::PatientId => FactValue::String(self.patient_id.clone()),
            FieldLocation::MasterPatientId if self.master_patient_id.is_empty() => FactValue::Null,
            FieldLocation::MasterPatientId => FactValue::String(self.master_patient_id.clone()),
            FieldLocation::ResourceType => FactValue::String(self.resource_type.clone()),
            FieldLocation::Timestamp => FactValue::Time(self.timestamp),
            FieldLocation::IngestedAt => FactValue::Time(self.ingested_at),
            FieldLocation::Canonical(key) => FactValue::read(self.canonical.get(key), kind),
            FieldLocation::Code(system) => FactValue::read(self.codes.get(system), kind),
        }
    }

    /// Raw lookup of an attribute the catalog does not know.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.canonical.get(key).or_else(|| self.codes.get(key))
    }
}
