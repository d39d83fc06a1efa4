use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{database::{FieldInfo, FieldLocation, ValueKind}, error::{CohortError, EngineResult}};

/// Mapping from DSL field names to their storage location and value kind.
///
/// Names are case-insensitive and stored lowercased. The catalog is
/// injectable so deployments can expose additional canonical attributes
/// or code systems without code changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    fields: IndexMap<String, FieldInfo>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The clinical fact catalog the engine ships with.
    pub fn clinical_defaults() -> Self {
        use FieldLocation::*;
        use ValueKind::*;

        Self::new()
            .with_field("id", FieldInfo::new(FactId, String))
            .with_field("patient_id", FieldInfo::new(PatientId, String))
            .with_field("master_patient_id", FieldInfo::new(MasterPatientId, String))
            .with_field("resource_type", FieldInfo::new(ResourceType, String))
            .with_field("timestamp", FieldInfo::new(Timestamp, Time))
            .with_field("event_time", FieldInfo::new(Timestamp, Time))
            .with_field("ingested_at", FieldInfo::new(IngestedAt, Time))
            .with_field("concept", FieldInfo::canonical("concept", String))
            .with_field("value", FieldInfo::canonical("value", Numeric))
            .with_field("unit", FieldInfo::canonical("unit", String))
            .with_field("status", FieldInfo::canonical("status", String))
            .with_field("source", FieldInfo::canonical("source", String))
            .with_field("loinc", FieldInfo::code("loinc"))
            .with_field("snomed", FieldInfo::code("snomed"))
            .with_field("icd10", FieldInfo::code("icd10"))
    }

    /// Parses a catalog document: an object keyed by field name.
    ///
    /// ```json
    /// { "glucose_flag": { "location": { "canonical": "flag" }, "kind": "string" } }
    /// ```
    pub fn from_json(text: &str) -> EngineResult<Self> {
        let raw: IndexMap<String, FieldInfo> = serde_json::from_str(text)
            .map_err(|e| CohortError::Configuration(format!("invalid field catalog: {}", e)))?;

        let mut catalog = Self::new();
        for (name, info) in raw {
            catalog.insert(&name, info)?;
        }
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Adds or replaces a field. Names must be identifiers the DSL can spell.
    pub fn insert(&mut self, name: &str, info: FieldInfo) -> EngineResult<()> {
        let name = name.trim().to_ascii_lowercase();
        if !Self::is_valid_name(&name) {
            return Err(CohortError::Configuration(format!("invalid field name '{}'", name)));
        }
        self.fields.insert(name, info);
        Ok(())
    }

    fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
    }

    fn with_field(mut self, name: &str, info: FieldInfo) -> Self {
        self.fields.insert(name.to_string(), info);
        self
    }

    /// Overlays `other` on top of this catalog.
    pub fn merge(mut self, other: FieldCatalog) -> Self {
        self.fields.extend(other.fields);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldInfo> {
        match self.fields.get(name) {
            Some(info) => Some(info),
            None => self.fields.get(&name.to_ascii_lowercase()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
