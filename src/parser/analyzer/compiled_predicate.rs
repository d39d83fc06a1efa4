use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use ordered_float::NotNan;

use crate::{database::{FieldLocation, ValueKind}, parser::ast::ComparatorOp};

/// Comparison operator in the store's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    In,
}

impl From<ComparatorOp> for StorageOp {
    fn from(op: ComparatorOp) -> Self {
        match op {
            ComparatorOp::Eq => StorageOp::Eq,
            ComparatorOp::NotEq => StorageOp::NotEq,
            ComparatorOp::Gt => StorageOp::Gt,
            ComparatorOp::Lt => StorageOp::Lt,
            ComparatorOp::GtEq => StorageOp::GtEq,
            ComparatorOp::LtEq => StorageOp::LtEq,
            ComparatorOp::In => StorageOp::In,
        }
    }
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            StorageOp::Eq => "=",
            StorageOp::NotEq => "<>",
            StorageOp::Gt => ">",
            StorageOp::Lt => "<",
            StorageOp::GtEq => ">=",
            StorageOp::LtEq => "<=",
            StorageOp::In => "IN",
        };
        write!(f, "{}", op)
    }
}

/// Typed right-hand side of a compiled predicate.
///
/// Operands are always bound values, never spliced text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Text(String),
    Number(NotNan<f64>),
    Time(DateTime<Utc>),
    List(Vec<Operand>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Text(s) => write!(f, "'{}'", s),
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Time(t) => write!(f, "'{}'", t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Operand::List(items) => {
                let items = items.iter().map(|i| i.to_string()).collect::<Vec<_>>();
                write!(f, "({})", items.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledPredicate {
    /// Logical field name as written in the DSL, lowercased.
    pub field: String,
    pub location: FieldLocation,
    pub kind: ValueKind,
    pub op: StorageOp,
    pub operand: Operand,
}

impl fmt::Display for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.location, self.op, self.operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let pred = CompiledPredicate {
            field: "value".into(),
            location: FieldLocation::Canonical("value".into()),
            kind: ValueKind::Numeric,
            op: StorageOp::NotEq,
            operand: Operand::Number(NotNan::new(7.0).unwrap()),
        };
        assert_eq!(pred.to_string(), "canonical.value <> 7");

        let pred = CompiledPredicate {
            field: "loinc".into(),
            location: FieldLocation::Code("loinc".into()),
            kind: ValueKind::String,
            op: StorageOp::In,
            operand: Operand::List(vec![Operand::Text("a".into()), Operand::Text("b".into())]),
        };
        assert_eq!(pred.to_string(), "codes.loinc IN ('a', 'b')");
    }

    #[test]
    fn test_from_comparator() {
        assert_eq!(StorageOp::from(ComparatorOp::GtEq), StorageOp::GtEq);
        assert_eq!(StorageOp::from(ComparatorOp::In), StorageOp::In);
    }
}
