use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    database::{FieldCatalog, QueryScope},
    error::{CohortError, EngineResult},
    models::CohortQuery,
    parser::{analyzer::PredicateCompiler, ast::{Clause, ComparatorOp}, parse},
    planner::CohortPlan,
};

/// Turns a `CohortQuery` into a `CohortPlan`: parses the DSL, applies the
/// request overrides and compiles the conjunction.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    compiler: PredicateCompiler,
    strict: bool,
}

impl PlanBuilder {
    pub fn new(catalog: Arc<FieldCatalog>) -> Self {
        Self { compiler: PredicateCompiler::new(catalog), strict: false }
    }

    /// In strict mode a clause that cannot be compiled fails the request
    /// instead of being dropped.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        self.compiler.catalog()
    }

    pub fn build(&self, query: &CohortQuery) -> EngineResult<CohortPlan> {
        let dsl = query.dsl.trim();
        if dsl.is_empty() {
            return Err(CohortError::Validation("dsl is required".to_string()));
        }

        let parsed = parse(dsl)?;

        let fields = if query.fields.iter().any(|f| !f.trim().is_empty()) {
            query.fields.iter()
                .map(|f| f.trim().to_ascii_lowercase())
                .filter(|f| !f.is_empty())
                .collect()
        } else {
            parsed.select_fields.clone()
        };

        let mut clauses = parsed.filters.clone();
        for (field, value) in &query.filters {
            match Self::filter_clause(field, value) {
                Some(clause) => clauses.push(clause),
                None => warn!(field = %field, "ignoring request filter with non-scalar value"),
            }
        }

        let filter = self.compiler.compile(&clauses);
        for dropped in &filter.dropped {
            warn!(clause = %dropped.clause, reason = %dropped.reason, "dropping unresolvable clause");
        }
        if let Some(dropped) = filter.dropped.first().filter(|_| self.strict) {
            return Err(CohortError::Validation(format!("clause `{}` rejected: {}", dropped.clause, dropped.reason)));
        }

        let scope = match query.record_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => QueryScope::fact(id),
            None => QueryScope::all(),
        };

        let plan = CohortPlan {
            cohort_id: query.id.clone().filter(|id| !id.trim().is_empty()).unwrap_or_else(|| Uuid::new_v4().to_string()),
            tenant_id: query.tenant().map(str::to_string),
            dsl: dsl.to_string(),
            fields,
            clauses,
            filter,
            limit: query.limit.filter(|l| *l > 0).or(parsed.limit),
            scope,
        };

        debug!(
            cohort_id = %plan.cohort_id,
            predicates = plan.filter.predicates.len(),
            dropped = plan.filter.dropped.len(),
            "built cohort plan"
        );
        Ok(plan)
    }

    fn filter_clause(field: &str, value: &Value) -> Option<Clause> {
        let field = field.trim().to_ascii_lowercase();
        match value {
            Value::Array(items) => {
                let items = items.iter().map(Self::scalar_text).collect::<Option<Vec<_>>>()?;
                Some(Clause::list(&field, items))
            }
            scalar => Some(Clause::new(&field, ComparatorOp::Eq, &Self::scalar_text(scalar)?)),
        }
    }

    fn scalar_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
