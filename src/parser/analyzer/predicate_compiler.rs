use std::sync::Arc;

use once_cell::sync::Lazy;
use ordered_float::NotNan;
use regex::Regex;

use crate::{
    database::{FieldCatalog, TimeFormats, ValueKind},
    parser::{analyzer::{CompiledPredicate, DropReason, DroppedClause, Operand, StorageOp}, ast::{Clause, ComparatorOp}},
};

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'([^']*)'|"([^"]*)"|([^,]+)"#).expect("static list item pattern"));

/// Outcome of compiling a `where` conjunction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    pub predicates: Vec<CompiledPredicate>,
    pub dropped: Vec<DroppedClause>,
}

impl CompiledFilter {
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Resolves clauses against the field catalog and coerces literals to the
/// field's value kind.
///
/// A clause naming an unknown field, or whose literal cannot be coerced, is
/// dropped rather than failing the query; callers decide what to do with
/// `CompiledFilter::dropped`.
#[derive(Debug, Clone)]
pub struct PredicateCompiler {
    catalog: Arc<FieldCatalog>,
}

impl PredicateCompiler {
    pub fn new(catalog: Arc<FieldCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    pub fn compile(&self, clauses: &[Clause]) -> CompiledFilter {
        let mut filter = CompiledFilter::default();

        for clause in clauses {
            match self.compile_clause(clause) {
                Ok(predicate) => filter.predicates.push(predicate),
                Err(reason) => filter.dropped.push(DroppedClause::new(clause, reason)),
            }
        }

        filter
    }

    pub fn compile_clause(&self, clause: &Clause) -> Result<CompiledPredicate, DropReason> {
        let field = clause.field.to_ascii_lowercase();
        let info = self.catalog.lookup(&field).ok_or(DropReason::UnknownField)?;

        let operand = match clause.op {
            ComparatorOp::In => {
                let items = Self::list_items(clause);
                if items.is_empty() {
                    return Err(DropReason::EmptyList);
                }
                let operands = items.iter()
                    .map(|item| Self::coerce(item, info.kind))
                    .collect::<Result<Vec<_>, _>>()?;
                Operand::List(operands)
            }
            _ => Self::coerce(&Self::unquote(&clause.value), info.kind)?,
        };

        Ok(CompiledPredicate {
            field,
            location: info.location.clone(),
            kind: info.kind,
            op: StorageOp::from(clause.op),
            operand,
        })
    }

    pub fn coerce(literal: &str, kind: ValueKind) -> Result<Operand, DropReason> {
        match kind {
            ValueKind::String => Ok(Operand::Text(literal.to_string())),
            ValueKind::Numeric => literal.trim().parse::<f64>().ok()
                .and_then(|n| NotNan::new(n).ok())
                .filter(|n| n.is_finite())
                .map(Operand::Number)
                .ok_or_else(|| DropReason::InvalidNumber(literal.to_string())),
            ValueKind::Time => TimeFormats::parse(literal)
                .map(Operand::Time)
                .ok_or_else(|| DropReason::InvalidTime(literal.to_string())),
        }
    }

    fn unquote(text: &str) -> String {
        let text = text.trim();
        for quote in ['\'', '"'] {
            if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
                return text[1..text.len() - 1].to_string();
            }
        }
        text.to_string()
    }

    /// Items of an `in` clause: the typed items when present, otherwise the
    /// split literal text.
    pub fn list_items(clause: &Clause) -> Vec<String> {
        if clause.items.is_empty() {
            Self::split_list(&clause.value)
        } else {
            clause.items.clone()
        }
    }

    /// Splits an `in` list into trimmed, unquoted items. Quoted items may
    /// contain commas.
    pub fn split_list(text: &str) -> Vec<String> {
        LIST_ITEM.captures_iter(text)
            .filter_map(|caps| {
                if let Some(quoted) = caps.get(1).or_else(|| caps.get(2)) {
                    return Some(quoted.as_str().to_string());
                }
                let bare = Self::unquote(caps.get(3)?.as_str());
                (!bare.is_empty()).then_some(bare)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::database::FieldLocation;

    fn compiler() -> PredicateCompiler {
        PredicateCompiler::new(Arc::new(FieldCatalog::clinical_defaults()))
    }

    fn num(n: f64) -> Operand {
        Operand::Number(NotNan::new(n).unwrap())
    }

    #[test]
    fn test_compile_numeric() {
        let pred = compiler().compile_clause(&Clause::new("value", ComparatorOp::GtEq, "7")).unwrap();

        assert_eq!(pred.location, FieldLocation::Canonical("value".into()));
        assert_eq!(pred.kind, ValueKind::Numeric);
        assert_eq!(pred.op, StorageOp::GtEq);
        assert_eq!(pred.operand, num(7.0));
    }

    #[test]
    fn test_compile_time_formats() {
        let c = compiler();
        let expected = Operand::Time(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        for literal in ["2024-01-01", "2024-01-01 00:00", "2024-01-01T00:00:00Z"] {
            let pred = c.compile_clause(&Clause::new("timestamp", ComparatorOp::Gt, literal)).unwrap();
            assert_eq!(pred.operand, expected, "literal {}", literal);
        }
    }

    #[test]
    fn test_string_literal_case_preserved() {
        let pred = compiler().compile_clause(&Clause::new("Concept", ComparatorOp::Eq, "HbA1c")).unwrap();

        assert_eq!(pred.field, "concept");
        assert_eq!(pred.operand, Operand::Text("HbA1c".into()));
    }

    #[test]
    fn test_in_list() {
        let pred = compiler().compile_clause(&Clause::new("loinc", ComparatorOp::In, "'4548-4', \"2345-7\", 718-7")).unwrap();

        assert_eq!(pred.op, StorageOp::In);
        assert_eq!(pred.operand, Operand::List(vec![
            Operand::Text("4548-4".into()),
            Operand::Text("2345-7".into()),
            Operand::Text("718-7".into()),
        ]));
    }

    #[test]
    fn test_in_list_numeric() {
        let pred = compiler().compile_clause(&Clause::new("value", ComparatorOp::In, "1, 2.5")).unwrap();
        assert_eq!(pred.operand, Operand::List(vec![num(1.0), num(2.5)]));
    }

    #[test]
    fn test_split_list_keeps_commas_in_quotes() {
        assert_eq!(PredicateCompiler::split_list("'a,b', 'c'"), vec!["a,b", "c"]);
        assert_eq!(PredicateCompiler::split_list(" x ,, y "), vec!["x", "y"]);
        assert!(PredicateCompiler::split_list("  ").is_empty());
    }

    #[test]
    fn test_drops_are_reported_not_fatal() {
        let clauses = vec![
            Clause::new("favorite_color", ComparatorOp::Eq, "blue"),
            Clause::new("value", ComparatorOp::Gt, "abc"),
            Clause::new("timestamp", ComparatorOp::Lt, "last tuesday"),
            Clause::new("value", ComparatorOp::In, "1, nope"),
            Clause::new("concept", ComparatorOp::Eq, "risk"),
        ];
        let filter = compiler().compile(&clauses);

        assert_eq!(filter.predicates.len(), 1);
        assert_eq!(filter.predicates[0].field, "concept");
        assert!(!filter.is_complete());

        let reasons = filter.dropped.iter().map(|d| d.reason.clone()).collect::<Vec<_>>();
        assert_eq!(reasons, vec![
            DropReason::UnknownField,
            DropReason::InvalidNumber("abc".into()),
            DropReason::InvalidTime("last tuesday".into()),
            DropReason::InvalidNumber("nope".into()),
        ]);
    }

    #[test]
    fn test_nan_is_not_a_number() {
        let err = compiler().compile_clause(&Clause::new("value", ComparatorOp::Eq, "NaN")).unwrap_err();
        assert_eq!(err, DropReason::InvalidNumber("NaN".into()));
    }
}
