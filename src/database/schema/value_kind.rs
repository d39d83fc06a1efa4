use std::fmt;

use serde::{Deserialize, Serialize};

/// Value shape a field is compared and projected as.
///
/// Literal coercion in predicates and typed reads from stored facts both go
/// through this classification, so `value > 7` and the `value` column of an
/// export agree on what a numeric value is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    #[default]
    String,
    Numeric,
    Time,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Numeric => "numeric",
            ValueKind::Time => "time",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&ValueKind::Numeric).unwrap(), "\"numeric\"");
        let kind: ValueKind = serde_json::from_str("\"time\"").unwrap();
        assert_eq!(kind, ValueKind::Time);
    }
}
