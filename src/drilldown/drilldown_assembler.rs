use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    collaborators::{Attributes, FeatureStore, LinkageRepository},
    drilldown::{Drilldown, DrilldownMetadata, DrilldownRequest, LinkageSummary, TimelineEvent},
    error::{CohortError, EngineResult},
    executor::CohortRunner,
    models::CohortQuery,
};

/// Builds a single-patient drilldown: the cohort's matching facts for the
/// patient, enriched with features and linkage when those are configured.
///
/// Only the timeline is required. Feature and linkage lookups run
/// concurrently and a failure in either leaves its section empty.
pub struct DrilldownAssembler {
    runner: Arc<CohortRunner>,
    features: Option<Arc<dyn FeatureStore>>,
    linkage: Option<Arc<dyn LinkageRepository>>,
    timeline_limit: usize,
    linkage_limit: usize,
}

impl DrilldownAssembler {
    pub fn new(runner: Arc<CohortRunner>, timeline_limit: usize, linkage_limit: usize) -> Self {
        Self { runner, features: None, linkage: None, timeline_limit, linkage_limit }
    }

    pub fn with_features(mut self, features: Option<Arc<dyn FeatureStore>>) -> Self {
        self.features = features;
        self
    }

    pub fn with_linkage(mut self, linkage: Option<Arc<dyn LinkageRepository>>) -> Self {
        self.linkage = linkage;
        self
    }

    pub async fn assemble(&self, request: &DrilldownRequest) -> EngineResult<Drilldown> {
        let patient_id = request.patient_id.trim();
        if request.dsl.trim().is_empty() {
            return Err(CohortError::Validation("dsl is required".to_string()));
        }
        if patient_id.is_empty() {
            return Err(CohortError::Validation("patient_id is required".to_string()));
        }

        let query = CohortQuery {
            id: request.cohort_id.clone(),
            tenant_id: request.tenant_id.clone(),
            dsl: request.dsl.clone(),
            fields: request.fields.clone(),
            filters: request.filters.clone(),
            ..Default::default()
        };
        let plan = self.runner.compile(&query)?;
        let limit = request.limit.filter(|l| *l > 0).unwrap_or(self.timeline_limit);

        let facts = self.runner.executor().timeline(&plan, patient_id, limit).await?;

        let (features, linkage) = tokio::join!(self.feature_snapshot(patient_id), self.linkage_summary(patient_id));

        let master_patient_id = linkage.as_ref()
            .map(|l| l.master_patient_id.clone())
            .or_else(|| facts.iter().map(|f| f.master_patient_id.clone()).find(|m| !m.is_empty()));

        info!(cohort_id = %plan.cohort_id, patient_id, events = facts.len(), "drilldown assembled");

        Ok(Drilldown {
            cohort_id: plan.cohort_id.clone(),
            patient_id: patient_id.to_string(),
            master_patient_id,
            timeline: facts.iter().map(TimelineEvent::from).collect(),
            features,
            linkage,
            metadata: DrilldownMetadata {
                fields: plan.fields.clone(),
                filters: plan.normalized_filters(),
                tenant: plan.tenant_id.clone(),
                limit,
            },
        })
    }

    /// Online features first, then the latest offline snapshot.
    async fn feature_snapshot(&self, patient_id: &str) -> Option<Attributes> {
        let store = self.features.as_ref()?;

        match store.get_online(patient_id).await {
            Ok(online) if !online.is_empty() => return Some(online),
            Ok(_) => debug!(patient_id, "no online features, trying offline"),
            Err(e) => warn!(patient_id, error = %e, "online feature lookup failed"),
        }

        match store.get_latest_offline(patient_id).await {
            Ok(offline) if !offline.is_empty() => Some(offline),
            Ok(_) => None,
            Err(e) => {
                warn!(patient_id, error = %e, "offline feature lookup failed");
                None
            }
        }
    }

    async fn linkage_summary(&self, patient_id: &str) -> Option<LinkageSummary> {
        let repo = self.linkage.as_ref()?;

        match repo.find_links_by_patient(patient_id, self.linkage_limit).await {
            Ok(links) => LinkageSummary::from_links(&links),
            Err(e) => {
                warn!(patient_id, error = %e, "linkage lookup failed");
                None
            }
        }
    }
}
