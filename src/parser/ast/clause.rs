use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::ast::ComparatorOp;

/// One `<field> <op> <value>` comparison of a `where` conjunction.
///
/// `value` is the literal as written, with surrounding quotes removed and its
/// casing preserved. For `in` it holds the comma separated list without the
/// enclosing parentheses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub field: String,
    pub op: ComparatorOp,
    pub value: String,
    /// Already-split `in` items, set when the list comes from typed request
    /// values rather than DSL text. Items are taken verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

impl Clause {
    pub fn new(field: &str, op: ComparatorOp, value: &str) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.to_string(),
            items: Vec::new(),
        }
    }

    /// An `in` clause over exact item values.
    pub fn list(field: &str, items: Vec<String>) -> Self {
        Self {
            field: field.to_string(),
            op: ComparatorOp::In,
            value: items.join(", "),
            items,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            ComparatorOp::In => write!(f, "{} in ({})", self.field, self.value),
            op => write!(f, "{} {} '{}'", self.field, op, self.value),
        }
    }
}
