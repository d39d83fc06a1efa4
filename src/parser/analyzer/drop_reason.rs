use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::ast::Clause;

/// Why a clause could not be turned into a predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "literal", rename_all = "snake_case")]
pub enum DropReason {
    #[error("unknown field")]
    UnknownField,

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' is not a recognized time")]
    InvalidTime(String),

    #[error("empty value list")]
    EmptyList,
}

/// A clause left out of the compiled filter, reported with the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DroppedClause {
    pub clause: Clause,
    pub reason: DropReason,
}

impl DroppedClause {
    pub fn new(clause: &Clause, reason: DropReason) -> Self {
        Self { clause: clause.clone(), reason }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parser::ast::ComparatorOp;

    #[test]
    fn test_dropped_clause_json() {
        let dropped = DroppedClause::new(
            &Clause::new("value", ComparatorOp::Gt, "abc"),
            DropReason::InvalidNumber("abc".into()),
        );

        assert_eq!(serde_json::to_value(&dropped).unwrap(), json!({
            "clause": { "field": "value", "op": ">", "value": "abc" },
            "reason": { "kind": "invalid_number", "literal": "abc" }
        }));

        let back: DroppedClause = serde_json::from_value(serde_json::to_value(&dropped).unwrap()).unwrap();
        assert_eq!(back, dropped);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(DropReason::InvalidTime("soon".into()).to_string(), "'soon' is not a recognized time");
        assert_eq!(DropReason::UnknownField.to_string(), "unknown field");
    }
}
