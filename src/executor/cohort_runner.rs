use std::sync::Arc;

use tracing::info;

use crate::{
    config::EngineConfig,
    database::{FactStore, FieldCatalog},
    error::EngineResult,
    executor::{Execution, PlanExecutor},
    models::{CohortQuery, CohortResult, ResultMetadata},
    planner::{CohortPlan, PlanBuilder},
};

/// Parse, compile and execute in one place, so interactive queries, exports,
/// drilldowns and materialization jobs share the same path.
pub struct CohortRunner {
    builder: PlanBuilder,
    executor: PlanExecutor,
}

impl CohortRunner {
    pub fn new(store: Arc<dyn FactStore>, catalog: Arc<FieldCatalog>, config: &EngineConfig) -> Self {
        Self {
            builder: PlanBuilder::new(catalog.clone()).strict(config.strict_filters),
            executor: PlanExecutor::new(store, catalog, config.limits()),
        }
    }

    pub fn executor(&self) -> &PlanExecutor {
        &self.executor
    }

    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        self.builder.catalog()
    }

    pub fn compile(&self, query: &CohortQuery) -> EngineResult<CohortPlan> {
        self.builder.build(query)
    }

    pub async fn execute(&self, plan: &CohortPlan) -> EngineResult<Execution> {
        self.executor.execute(plan).await
    }

    pub async fn run(&self, query: &CohortQuery) -> EngineResult<(CohortPlan, Execution)> {
        let plan = self.compile(query)?;
        let execution = self.execute(&plan).await?;
        info!(
            cohort_id = %plan.cohort_id,
            tenant = plan.tenant_id.as_deref().unwrap_or("public"),
            count = execution.count,
            elapsed_ms = execution.elapsed.as_millis() as u64,
            "cohort query executed"
        );
        Ok((plan, execution))
    }

    /// Assembles the caller-facing result. `cache_hit` is always false here.
    pub fn result(&self, plan: &CohortPlan, execution: &Execution) -> CohortResult {
        let records = execution.sample.iter()
            .map(|fact| self.executor.project(fact, &plan.fields).into_json())
            .collect();

        CohortResult {
            cohort_id: plan.cohort_id.clone(),
            tenant_id: plan.tenant_id.clone(),
            count: execution.count,
            patient_ids: execution.patient_ids.clone(),
            query_time_ms: execution.elapsed.as_millis() as u64,
            metadata: ResultMetadata {
                records,
                slices: None,
                cache_hit: false,
                tenant: plan.tenant_id.clone(),
                fields: plan.fields.clone(),
                filters: plan.normalized_filters(),
                limit: Some(execution.effective_limit),
                dropped_clauses: plan.filter.dropped.clone(),
            },
        }
    }
}
