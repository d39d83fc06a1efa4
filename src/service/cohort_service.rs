use std::{io::Write, sync::Arc};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    cache::{Fingerprint, ResultCache},
    collaborators::AnalyticalSlicer,
    config::EngineConfig,
    drilldown::{Drilldown, DrilldownAssembler, DrilldownRequest},
    error::{CohortError, EngineResult},
    executor::{CohortRunner, Projection},
    export::CsvExporter,
    materialize::{MaterializationJob, MaterializationScheduler, MaterializeRequest},
    models::{CohortQuery, CohortResult},
    parser::{ast::ParsedQuery, parse},
    templates::{CohortTemplate, TemplateRepository},
};

/// Entry point of the cohort engine.
///
/// Built with `CohortServiceBuilder`. Optional collaborators that are not
/// configured simply switch their feature off.
pub struct CohortService {
    pub(crate) runner: Arc<CohortRunner>,
    pub(crate) cache: Option<ResultCache>,
    pub(crate) slicer: Option<Arc<dyn AnalyticalSlicer>>,
    pub(crate) drilldown: DrilldownAssembler,
    pub(crate) scheduler: MaterializationScheduler,
    pub(crate) templates: Arc<dyn TemplateRepository>,
    pub(crate) config: EngineConfig,
}

impl CohortService {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs an interactive cohort query, serving it from the result cache
    /// when an equivalent request was answered within the cache TTL.
    pub async fn execute(&self, query: &CohortQuery) -> EngineResult<CohortResult> {
        let cache_key = self.cache.as_ref().map(|_| Fingerprint::cohort_key(query));

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(mut hit) = cache.get(key).await {
                hit.metadata.cache_hit = true;
                if let Some(id) = query.id.as_ref().filter(|id| !id.trim().is_empty()) {
                    hit.cohort_id = id.clone();
                }
                info!(cohort_id = %hit.cohort_id, key = %key, "cohort served from cache");
                return Ok(hit);
            }
        }

        let (plan, execution) = self.runner.run(query).await?;
        let mut result = self.runner.result(&plan, &execution);

        if let Some(slicer) = self.slicer.as_ref().filter(|_| !plan.clauses.is_empty()) {
            match slicer.query(&result.metadata.filters).await {
                Ok(slices) => result.metadata.slices = Some(slices),
                Err(e) => warn!(cohort_id = %plan.cohort_id, error = %e, "analytical slicer failed"),
            }
        }

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            cache.put(key, &result).await;
        }

        Ok(result)
    }

    /// Checks that `text` parses. Field names are not resolved here.
    pub fn verify_dsl(&self, text: &str) -> EngineResult<ParsedQuery> {
        if text.trim().is_empty() {
            return Err(CohortError::Validation("dsl is required".to_string()));
        }
        Ok(parse(text)?)
    }

    /// Writes the cohort as CSV into `writer`. Columns are the plan's fields
    /// (requested fields, else the DSL select list), or the standard export
    /// columns when that list is empty.
    pub async fn export<W: Write + Send>(&self, query: &CohortQuery, writer: &mut W) -> EngineResult<usize> {
        let plan = self.runner.compile(query)?;
        let fields = if plan.fields.is_empty() {
            Projection::default_fields()
        } else {
            plan.fields.clone()
        };

        CsvExporter::export(self.runner.executor(), &plan, &fields, writer).await
    }

    pub async fn drilldown(&self, request: &DrilldownRequest) -> EngineResult<Drilldown> {
        self.drilldown.assemble(request).await
    }

    pub async fn materialize(&self, request: MaterializeRequest) -> EngineResult<MaterializationJob> {
        self.scheduler.submit(request).await
    }

    pub async fn list_materializations(&self, tenant_id: Option<&str>, limit: usize) -> EngineResult<Vec<MaterializationJob>> {
        self.scheduler.list(tenant_id, limit).await
    }

    pub async fn get_materialization(&self, id: Uuid) -> EngineResult<MaterializationJob> {
        self.scheduler.get(id).await
    }

    /// A zero limit lists up to 25 templates.
    pub async fn list_templates(&self, tenant_id: Option<&str>, limit: usize) -> EngineResult<Vec<CohortTemplate>> {
        let limit = if limit == 0 { 25 } else { limit };
        let tenant_id = tenant_id.map(str::trim).filter(|t| !t.is_empty());
        Ok(self.templates.list(tenant_id, limit).await?)
    }

    /// Stores a template after checking its DSL parses. An id is generated
    /// when the template has none.
    pub async fn create_template(&self, mut template: CohortTemplate) -> EngineResult<CohortTemplate> {
        if template.name.trim().is_empty() {
            return Err(CohortError::Validation("template name is required".to_string()));
        }
        self.verify_dsl(&template.dsl)?;

        if template.id.trim().is_empty() {
            template.id = Uuid::new_v4().to_string();
        }
        self.templates.create(&template).await?;

        info!(template_id = %template.id, name = %template.name, "cohort template created");
        Ok(template)
    }

    /// Stops the background materialization workers.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}
