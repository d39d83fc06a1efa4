use serde::{Deserialize, Serialize};

use crate::database::{FieldLocation, ValueKind};

/// Catalog entry for one logical field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldInfo {
    pub location: FieldLocation,
    #[serde(default)]
    pub kind: ValueKind,
}

impl FieldInfo {
    pub fn new(location: FieldLocation, kind: ValueKind) -> Self {
        Self { location, kind }
    }

    pub fn canonical(key: &str, kind: ValueKind) -> Self {
        Self::new(FieldLocation::Canonical(key.to_string()), kind)
    }

    pub fn code(system: &str) -> Self {
        Self::new(FieldLocation::Code(system.to_string()), ValueKind::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_defaults_to_string() {
        let info: FieldInfo = serde_json::from_str(r#"{ "location": { "code": "snomed" } }"#).unwrap();
        assert_eq!(info, FieldInfo::code("snomed"));
    }
}
