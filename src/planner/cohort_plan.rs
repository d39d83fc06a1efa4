use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    database::QueryScope,
    parser::{analyzer::{CompiledFilter, CompiledPredicate, PredicateCompiler}, ast::{Clause, ComparatorOp}},
};

/// A compiled cohort request, ready for the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortPlan {
    pub cohort_id: String,
    pub tenant_id: Option<String>,
    pub dsl: String,
    /// Projection applied to sample records and export rows.
    pub fields: Vec<String>,
    /// The full conjunction: DSL clauses followed by request filters.
    pub clauses: Vec<Clause>,
    pub filter: CompiledFilter,
    /// Requested limit before defaults and caps are applied.
    pub limit: Option<usize>,
    pub scope: QueryScope,
}

impl CohortPlan {
    pub fn predicates(&self) -> &[CompiledPredicate] {
        &self.filter.predicates
    }

    /// Field to value view of the clauses, as echoed in result metadata.
    /// A later clause on the same field replaces an earlier one.
    pub fn normalized_filters(&self) -> IndexMap<String, Value> {
        self.clauses.iter()
            .map(|clause| {
                let value = match clause.op {
                    ComparatorOp::In => Value::Array(
                        PredicateCompiler::list_items(clause).into_iter().map(Value::String).collect()
                    ),
                    _ => Value::String(clause.value.clone()),
                };
                (clause.field.clone(), value)
            })
            .collect()
    }
}
