use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    collaborators::FeatureStore,
    config::EngineConfig,
    error::{CohortError, EngineResult},
    executor::CohortRunner,
    materialize::{DispatchOutcome, JobRepository, MaterializationJob, MaterializeRequest, MaterializedFeatures, WorkerPool},
};

const SAVE_ATTEMPTS: usize = 2;

/// Accepts materialization requests and runs them in the background.
///
/// `submit` records a queued job and returns at once. A worker slot then
/// runs the cohort query, builds per-patient features and writes them to the
/// offline and online feature tiers. Every outcome, a panic included, ends
/// in a terminal job status.
#[derive(Clone)]
pub struct MaterializationScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    runner: Arc<CohortRunner>,
    jobs: Arc<dyn JobRepository>,
    features: Option<Arc<dyn FeatureStore>>,
    pool: WorkerPool,
    feature_ttl: Duration,
    list_limit: usize,
}

impl MaterializationScheduler {
    pub fn new(
        runner: Arc<CohortRunner>,
        jobs: Arc<dyn JobRepository>,
        features: Option<Arc<dyn FeatureStore>>,
        config: &EngineConfig,
    ) -> Self {
        let inner = SchedulerInner {
            runner,
            jobs,
            features,
            pool: WorkerPool::new(config.materialize_workers),
            feature_ttl: config.feature_ttl(),
            list_limit: config.job_list_limit,
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.inner.pool
    }

    pub async fn submit(&self, request: MaterializeRequest) -> EngineResult<MaterializationJob> {
        if request.dsl.trim().is_empty() {
            return Err(CohortError::Validation("dsl is required".to_string()));
        }

        let job = MaterializationJob::queued(&request, Utc::now());
        self.inner.jobs.create(&job).await
            .map_err(|e| CohortError::Materialization(format!("could not record job: {}", e)))?;

        if self.inner.pool.is_shut_down() {
            warn!(job_id = %job.id, "scheduler is shut down, job stays queued");
            return Ok(job);
        }

        let span = info_span!("materialization", job_id = %job.id, cohort_id = %job.cohort_id);
        let inner = self.inner.clone();
        let queued = job.clone();
        tokio::spawn(async move {
            let job_id = queued.id;
            let work = inner.clone().process(queued).in_current_span();
            match inner.pool.run(work).await {
                DispatchOutcome::Completed => {}
                DispatchOutcome::Panicked(message) => inner.fail_after_panic(job_id, &message).await,
                DispatchOutcome::Cancelled => debug!("scheduler shut down before job started"),
            }
        }.instrument(span));

        info!(job_id = %job.id, cohort_id = %job.cohort_id, "materialization queued");
        Ok(job)
    }

    /// Jobs visible to `tenant_id`, newest first. A zero limit uses the
    /// configured default.
    pub async fn list(&self, tenant_id: Option<&str>, limit: usize) -> EngineResult<Vec<MaterializationJob>> {
        let limit = if limit == 0 { self.inner.list_limit } else { limit };
        let tenant_id = tenant_id.map(str::trim).filter(|t| !t.is_empty());
        Ok(self.inner.jobs.list(tenant_id, limit).await?)
    }

    pub async fn get(&self, id: Uuid) -> EngineResult<MaterializationJob> {
        self.inner.jobs.get(id).await?.ok_or(CohortError::JobNotFound(id))
    }

    /// Stops dispatching. Jobs already running finish; jobs still waiting
    /// for a slot stay queued.
    pub fn shutdown(&self) {
        self.inner.pool.shutdown();
        info!("materialization scheduler shut down");
    }
}

impl SchedulerInner {
    async fn process(self: Arc<Self>, mut job: MaterializationJob) {
        if let Err(e) = job.mark_running(Utc::now()) {
            warn!(error = %e, "job cannot start");
            return;
        }
        self.save(&job).await;
        info!("materialization started");

        let finished = match self.materialize(&job).await {
            Ok(count) => {
                info!(count, "materialization completed");
                job.mark_completed(count, Utc::now())
            }
            Err(e) => {
                warn!(error = %e, "materialization failed");
                job.mark_failed(&Self::failure_message(&e), Utc::now())
            }
        };
        if let Err(e) = finished {
            warn!(error = %e, "could not finish job");
        }
        self.save(&job).await;
    }

    async fn materialize(&self, job: &MaterializationJob) -> EngineResult<usize> {
        let (plan, execution) = self.runner.run(&job.to_query()).await?;
        let store = self.features.as_ref()
            .ok_or_else(|| CohortError::Materialization("feature store not configured".to_string()))?;

        let now = Utc::now();
        let version = now.timestamp();
        let grouped = MaterializedFeatures::group_by_patient(&execution.sample);
        for patient_id in &execution.patient_ids {
            let facts = grouped.get(patient_id.as_str()).map(Vec::as_slice).unwrap_or_default();
            let attributes = MaterializedFeatures::build(&plan.cohort_id, patient_id, facts, self.runner.catalog(), now)
                .to_attributes();

            store.write_offline(patient_id, &attributes, version).await
                .map_err(|e| CohortError::Materialization(format!("offline feature write for {} failed: {}", patient_id, e)))?;
            store.write_online(patient_id, &attributes, self.feature_ttl).await
                .map_err(|e| CohortError::Materialization(format!("online feature write for {} failed: {}", patient_id, e)))?;
        }

        debug!(patients = execution.patient_ids.len(), version, "features written");
        Ok(execution.count)
    }

    async fn fail_after_panic(&self, job_id: Uuid, message: &str) {
        match self.jobs.get(job_id).await {
            Ok(Some(mut job)) if !job.status.is_terminal() => {
                if let Err(e) = job.mark_failed(&format!("worker panicked: {}", message), Utc::now()) {
                    warn!(error = %e, "could not fail panicked job");
                    return;
                }
                self.save(&job).await;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not load panicked job"),
        }
    }

    /// Persists `job`, retrying once when the repository rejects the write.
    async fn save(&self, job: &MaterializationJob) {
        for attempt in 1..=SAVE_ATTEMPTS {
            match self.jobs.update(job).await {
                Ok(()) => return,
                Err(e) => warn!(job_id = %job.id, status = %job.status, attempt, error = %e, "could not persist job state"),
            }
        }
    }

    fn failure_message(error: &CohortError) -> String {
        match error {
            CohortError::Materialization(message) | CohortError::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
