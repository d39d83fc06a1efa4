use std::{sync::Arc, time::{Duration, Instant}};

use tracing::debug;

use crate::{
    database::{Fact, FactSink, FactStore, FieldCatalog},
    error::{EngineResult, StoreError},
    executor::{Projection, Row},
    planner::CohortPlan,
};

/// Limit policy applied to every execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub default_limit: usize,
    pub max_limit: usize,
    pub id_sample_cap: usize,
    pub record_sample_cap: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self { default_limit: 500, max_limit: 5000, id_sample_cap: 500, record_sample_cap: 200 }
    }
}

impl ExecutionLimits {
    /// Requested limit, or the default when unset, capped at `max_limit`.
    pub fn effective(&self, requested: Option<usize>) -> usize {
        requested.filter(|l| *l > 0).unwrap_or(self.default_limit).min(self.max_limit)
    }

    pub fn id_cap(&self, effective: usize) -> usize {
        effective.min(self.id_sample_cap)
    }

    pub fn sample_cap(&self, effective: usize) -> usize {
        effective.min(self.record_sample_cap)
    }
}

/// Raw outcome of running a plan against the fact store.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub count: usize,
    pub patient_ids: Vec<String>,
    /// Most recent matching facts.
    pub sample: Vec<Fact>,
    pub effective_limit: usize,
    pub elapsed: Duration,
}

pub struct PlanExecutor {
    store: Arc<dyn FactStore>,
    catalog: Arc<FieldCatalog>,
    limits: ExecutionLimits,
}

impl PlanExecutor {
    pub fn new(store: Arc<dyn FactStore>, catalog: Arc<FieldCatalog>, limits: ExecutionLimits) -> Self {
        Self { store, catalog, limits }
    }

    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }

    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    /// Exact count plus the bounded id and record samples. The three store
    /// calls run concurrently; the first failure cancels the others.
    pub async fn execute(&self, plan: &CohortPlan) -> EngineResult<Execution> {
        let started = Instant::now();
        let effective_limit = self.limits.effective(plan.limit);
        let predicates = plan.predicates();

        let (count, patient_ids, sample) = tokio::try_join!(
            self.store.count(predicates, &plan.scope),
            self.store.list_distinct_patient_ids(predicates, &plan.scope, self.limits.id_cap(effective_limit)),
            self.store.sample_records(predicates, &plan.scope, self.limits.sample_cap(effective_limit)),
        )?;

        let elapsed = started.elapsed();
        debug!(cohort_id = %plan.cohort_id, count, ids = patient_ids.len(), sample = sample.len(), ?elapsed, "executed cohort plan");

        Ok(Execution {
            count: count.max(patient_ids.len()),
            patient_ids,
            sample,
            effective_limit,
            elapsed,
        })
    }

    /// The plan's matching facts for one patient in ascending event time.
    pub async fn timeline(&self, plan: &CohortPlan, patient_id: &str, limit: usize) -> EngineResult<Vec<Fact>> {
        Ok(self.store.fetch_timeline(plan.predicates(), patient_id, limit).await?)
    }

    /// Streams matching facts into `sink`, bounded by the plan's effective limit.
    pub async fn scan(&self, plan: &CohortPlan, sink: &mut FactSink<'_>) -> Result<usize, StoreError> {
        let limit = self.limits.effective(plan.limit);
        self.store.scan(plan.predicates(), &plan.scope, limit, sink).await
    }

    pub fn project(&self, fact: &Fact, fields: &[String]) -> Row {
        Projection::project(fact, fields, &self.catalog)
    }
}
