use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::QueryParser;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparatorOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = "in")]
    In,
}

impl fmt::Display for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparatorOp::Eq => write!(f, "="),
            ComparatorOp::NotEq => write!(f, "!="),
            ComparatorOp::Gt => write!(f, ">"),
            ComparatorOp::Lt => write!(f, "<"),
            ComparatorOp::GtEq => write!(f, ">="),
            ComparatorOp::LtEq => write!(f, "<="),
            ComparatorOp::In => write!(f, "in"),
        }
    }
}

impl fmt::Debug for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComparatorOp({})", self)
    }
}

impl ComparatorOp {
    /// Consumes an operator at the cursor. Two-character operators are tried
    /// before their one-character prefixes.
    pub fn check(parser: &mut QueryParser) -> Option<ComparatorOp> {
        let candidates = [
            (&parser.comparers.greater_than_or_equal, ComparatorOp::GtEq),
            (&parser.comparers.less_than_or_equal, ComparatorOp::LtEq),
            (&parser.comparers.not_equal, ComparatorOp::NotEq),
            (&parser.comparers.equal, ComparatorOp::Eq),
            (&parser.comparers.greater_than, ComparatorOp::Gt),
            (&parser.comparers.less_than, ComparatorOp::Lt),
            (&parser.comparers.r#in, ComparatorOp::In),
        ];

        let matched = candidates
            .into_iter()
            .find(|(comparer, _)| comparer.compare(parser))
            .map(|(comparer, op)| (comparer.length, op));

        matched.map(|(length, op)| {
            parser.jump(length);
            op
        })
    }
}
