use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::StoreError,
    materialize::{JobRepository, MaterializationJob, select_jobs},
};

/// Job repository persisted as a single pretty-printed JSON array.
///
/// The whole file is rewritten after every change, so job state survives a
/// restart. Jobs found queued or running on open are not resumed.
pub struct JsonFileJobRepository {
    path: PathBuf,
    jobs: Mutex<IndexMap<Uuid, MaterializationJob>>,
}

impl JsonFileJobRepository {
    /// Opens `path`, loading any jobs already stored there.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let jobs = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => IndexMap::new(),
            Ok(bytes) => serde_json::from_slice::<Vec<MaterializationJob>>(&bytes)?
                .into_iter()
                .map(|job| (job.id, job))
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), jobs = jobs.len(), "opened job repository");
        Ok(Self { path, jobs: Mutex::new(jobs) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, jobs: &IndexMap<Uuid, MaterializationJob>) -> Result<(), StoreError> {
        let data = jobs.values().collect::<Vec<_>>();
        let bytes = serde_json::to_vec_pretty(&data)?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!(path = %self.path.display(), jobs = data.len(), "persisted jobs");
        Ok(())
    }
}

#[async_trait]
impl JobRepository for JsonFileJobRepository {
    async fn create(&self, job: &MaterializationJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.id) {
            return Err(StoreError::Backend(format!("job {} already exists", job.id)));
        }
        jobs.insert(job.id, job.clone());
        self.persist(&jobs).await
    }

    async fn update(&self, job: &MaterializationJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock().await;
        match jobs.get_mut(&job.id) {
            Some(existing) => *existing = job.clone(),
            None => return Err(StoreError::Backend(format!("job {} does not exist", job.id))),
        }
        self.persist(&jobs).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<MaterializationJob>, StoreError> {
        Ok(self.jobs.lock().await.get(&id).cloned())
    }

    async fn list(&self, tenant_id: Option<&str>, limit: usize) -> Result<Vec<MaterializationJob>, StoreError> {
        let jobs = self.jobs.lock().await;
        Ok(select_jobs(jobs.values(), tenant_id, limit))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::materialize::{JobStatus, MaterializeRequest};

    #[tokio::test]
    async fn test_jobs_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");

        let mut job = MaterializationJob::queued(&MaterializeRequest::new("select patient_id"), Utc::now());
        {
            let repo = JsonFileJobRepository::open(&path).await.unwrap();
            repo.create(&job).await.unwrap();
            job.mark_running(Utc::now()).unwrap();
            job.mark_completed(4, Utc::now()).unwrap();
            repo.update(&job).await.unwrap();
        }

        let repo = JsonFileJobRepository::open(&path).await.unwrap();
        let loaded = repo.get(job.id).await.unwrap().unwrap();

        assert_eq!(loaded.status, JobStatus::Completed);
        assert_eq!(loaded.result_count, 4);
        assert_eq!(repo.list(None, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileJobRepository::open(dir.path().join("none.json")).await.unwrap();

        assert!(repo.list(None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(matches!(JsonFileJobRepository::open(&path).await, Err(StoreError::Serialization(_))));
    }
}
