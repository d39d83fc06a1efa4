use std::cmp::Ordering;

use crate::{
    database::{Fact, FactValue},
    executor::Truth,
    parser::analyzer::{CompiledPredicate, Operand, StorageOp},
};

pub struct Eval;

impl Eval {
    /// True when every predicate evaluates to `Truth::True` for `fact`.
    /// An empty conjunction admits every fact.
    pub fn matches_all(predicates: &[CompiledPredicate], fact: &Fact) -> bool {
        predicates.iter()
            .fold(Truth::True, |acc, p| acc.and(Self::eval_predicate3(p, fact)))
            .is_true()
    }

    pub fn eval_predicate3(predicate: &CompiledPredicate, fact: &Fact) -> Truth {
        let value = fact.read(&predicate.location, predicate.kind);
        Self::compare3(&value, predicate.op, &predicate.operand)
    }

    pub fn compare3(value: &FactValue, op: StorageOp, operand: &Operand) -> Truth {
        if value.is_null() {
            return Truth::Unknown;
        }

        match (op, operand) {
            (StorageOp::In, Operand::List(items)) => items.iter()
                .fold(Truth::False, |acc, item| acc.or(Self::compare3(value, StorageOp::Eq, item))),
            (StorageOp::In, _) | (_, Operand::List(_)) => Truth::Unknown,
            (op, operand) => match Self::ordering(value, operand) {
                Some(ord) => Truth::from(Self::satisfies(op, ord)),
                None => Truth::Unknown,
            },
        }
    }

    fn ordering(value: &FactValue, operand: &Operand) -> Option<Ordering> {
        match operand {
            Operand::Text(text) => value.as_text().map(|v| v.as_ref().cmp(text.as_str())),
            Operand::Number(n) => {
                let x = value.as_f64()?;
                let y = n.into_inner();
                if Self::float_eq(x, y) { Some(Ordering::Equal) } else { x.partial_cmp(&y) }
            }
            Operand::Time(t) => value.as_time().map(|v| v.cmp(t)),
            Operand::List(_) => None,
        }
    }

    fn satisfies(op: StorageOp, ord: Ordering) -> bool {
        match op {
            StorageOp::Eq | StorageOp::In => ord == Ordering::Equal,
            StorageOp::NotEq => ord != Ordering::Equal,
            StorageOp::Gt => ord == Ordering::Greater,
            StorageOp::Lt => ord == Ordering::Less,
            StorageOp::GtEq => ord != Ordering::Less,
            StorageOp::LtEq => ord != Ordering::Greater,
        }
    }

    #[inline]
    fn float_eq(a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        let eps = 1e-9_f64.max(1e-9_f64 * a.abs()).max(1e-9_f64 * b.abs());
        diff <= eps
    }
}
