use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a logical field lives inside a stored fact.
///
/// Fixed columns are addressed directly; everything else is a key in the
/// fact's canonical attribute bag or in its code-system map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLocation {
    FactId,
    PatientId,
    MasterPatientId,
    ResourceType,
    Timestamp,
    IngestedAt,
    Canonical(String),
    Code(String),
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldLocation::FactId => write!(f, "id"),
            FieldLocation::PatientId => write!(f, "patient_id"),
            FieldLocation::MasterPatientId => write!(f, "master_patient_id"),
            FieldLocation::ResourceType => write!(f, "resource_type"),
            FieldLocation::Timestamp => write!(f, "timestamp"),
            FieldLocation::IngestedAt => write!(f, "ingested_at"),
            FieldLocation::Canonical(key) => write!(f, "canonical.{}", key),
            FieldLocation::Code(system) => write!(f, "codes.{}", system),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FieldLocation::Canonical("value".into()).to_string(), "canonical.value");
        assert_eq!(FieldLocation::Code("loinc".into()).to_string(), "codes.loinc");
        assert_eq!(FieldLocation::Timestamp.to_string(), "timestamp");
    }

    #[test]
    fn test_serde_shape() {
        let text = serde_json::to_string(&FieldLocation::Canonical("unit".into())).unwrap();
        assert_eq!(text, r#"{"canonical":"unit"}"#);

        let loc: FieldLocation = serde_json::from_str("\"patient_id\"").unwrap();
        assert_eq!(loc, FieldLocation::PatientId);
    }
}
