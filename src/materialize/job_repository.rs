use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::{error::StoreError, materialize::MaterializationJob};

/// Durable record of materialization jobs.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &MaterializationJob) -> Result<(), StoreError>;

    async fn update(&self, job: &MaterializationJob) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<MaterializationJob>, StoreError>;

    /// Jobs visible to `tenant_id` (its own plus tenant-less ones; all jobs
    /// when `None`), newest first, at most `limit`.
    async fn list(&self, tenant_id: Option<&str>, limit: usize) -> Result<Vec<MaterializationJob>, StoreError>;
}

/// Listing rule shared by the in-process repositories.
pub(crate) fn select_jobs<'a>(
    jobs: impl DoubleEndedIterator<Item = &'a MaterializationJob>,
    tenant_id: Option<&str>,
    limit: usize,
) -> Vec<MaterializationJob> {
    let mut selected = jobs
        .rev()
        .filter(|job| match tenant_id {
            Some(tenant) => job.tenant_id.as_deref().is_none_or(|t| t == tenant),
            None => true,
        })
        .cloned()
        .collect::<Vec<_>>();

    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    selected.truncate(limit);
    selected
}

#[derive(Debug, Default)]
pub struct MemoryJobRepository {
    jobs: RwLock<IndexMap<Uuid, MaterializationJob>>,
}

impl MemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn create(&self, job: &MaterializationJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if jobs.contains_key(&job.id) {
            return Err(StoreError::Backend(format!("job {} already exists", job.id)));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn update(&self, job: &MaterializationJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        match jobs.get_mut(&job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!("job {} does not exist", job.id))),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<MaterializationJob>, StoreError> {
        Ok(self.jobs.read().unwrap_or_else(PoisonError::into_inner).get(&id).cloned())
    }

    async fn list(&self, tenant_id: Option<&str>, limit: usize) -> Result<Vec<MaterializationJob>, StoreError> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(select_jobs(jobs.values(), tenant_id, limit))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::materialize::MaterializeRequest;

    fn job(tenant: Option<&str>, age_secs: i64) -> MaterializationJob {
        let request = MaterializeRequest { tenant_id: tenant.map(str::to_string), ..MaterializeRequest::new("select patient_id") };
        MaterializationJob::queued(&request, Utc::now() - Duration::seconds(age_secs))
    }

    #[tokio::test]
    async fn test_create_get_update() {
        let repo = MemoryJobRepository::new();
        let mut j = job(None, 0);
        repo.create(&j).await.unwrap();
        assert!(repo.create(&j).await.is_err());

        j.mark_running(Utc::now()).unwrap();
        repo.update(&j).await.unwrap();

        assert_eq!(repo.get(j.id).await.unwrap(), Some(j));
        assert_eq!(repo.get(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_unknown_job_fails() {
        let repo = MemoryJobRepository::new();
        assert!(repo.update(&job(None, 0)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_tenant_scoped_newest_first() {
        let repo = MemoryJobRepository::new();
        let acme_old = job(Some("acme"), 30);
        let shared = job(None, 20);
        let other = job(Some("globex"), 10);
        let acme_new = job(Some("acme"), 0);
        for j in [&acme_old, &shared, &other, &acme_new] {
            repo.create(j).await.unwrap();
        }

        let ids = |jobs: Vec<MaterializationJob>| jobs.into_iter().map(|j| j.id).collect::<Vec<_>>();

        assert_eq!(ids(repo.list(Some("acme"), 50).await.unwrap()), vec![acme_new.id, shared.id, acme_old.id]);
        assert_eq!(ids(repo.list(Some("acme"), 1).await.unwrap()), vec![acme_new.id]);
        assert_eq!(repo.list(None, 50).await.unwrap().len(), 4);
    }
}
