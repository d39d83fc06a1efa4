use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{error::{CohortError, EngineResult}, models::CohortQuery};

/// Lifecycle of a materialization job. Transitions only move forward:
/// queued to running or failed, running to completed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Queued, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Submission payload for a background materialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterializeRequest {
    #[serde(default)]
    pub cohort_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub dsl: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: IndexMap<String, Value>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl MaterializeRequest {
    pub fn new(dsl: &str) -> Self {
        Self { dsl: dsl.to_string(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializationJob {
    pub id: Uuid,
    pub cohort_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub dsl: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: IndexMap<String, Value>,
    #[serde(default)]
    pub limit: Option<usize>,
    pub status: JobStatus,
    #[serde(default)]
    pub result_count: usize,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl MaterializationJob {
    /// A new queued job. A cohort id is generated when the request has none.
    pub fn queued(request: &MaterializeRequest, now: DateTime<Utc>) -> Self {
        let cohort_id = request.cohort_id.clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            id: Uuid::new_v4(),
            cohort_id,
            tenant_id: request.tenant_id.clone().filter(|t| !t.trim().is_empty()),
            dsl: request.dsl.clone(),
            fields: request.fields.clone(),
            filters: request.filters.clone(),
            limit: request.limit,
            status: JobStatus::Queued,
            result_count: 0,
            error_message: None,
            requested_by: request.requested_by.clone(),
            created_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    fn transition(&mut self, to: JobStatus) -> EngineResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(CohortError::InvalidTransition { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }

    pub fn mark_running(&mut self, at: DateTime<Utc>) -> EngineResult<()> {
        self.transition(JobStatus::Running)?;
        self.started_at = Some(at);
        Ok(())
    }

    pub fn mark_completed(&mut self, result_count: usize, at: DateTime<Utc>) -> EngineResult<()> {
        self.transition(JobStatus::Completed)?;
        self.result_count = result_count;
        self.completed_at = Some(at);
        Ok(())
    }

    pub fn mark_failed(&mut self, message: &str, at: DateTime<Utc>) -> EngineResult<()> {
        self.transition(JobStatus::Failed)?;
        self.error_message = Some(message.to_string());
        self.completed_at = Some(at);
        Ok(())
    }

    /// The interactive query this job runs.
    pub fn to_query(&self) -> CohortQuery {
        CohortQuery {
            id: Some(self.cohort_id.clone()),
            tenant_id: self.tenant_id.clone(),
            dsl: self.dsl.clone(),
            fields: self.fields.clone(),
            filters: self.filters.clone(),
            limit: self.limit,
            ..Default::default()
        }
    }
}
