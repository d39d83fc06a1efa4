use std::sync::Arc;

use crate::{
    cache::{CacheStore, MemoryCacheStore, ResultCache},
    collaborators::{AnalyticalSlicer, FeatureStore, LinkageRepository},
    config::EngineConfig,
    database::{FactStore, FieldCatalog},
    drilldown::DrilldownAssembler,
    executor::CohortRunner,
    materialize::{JobRepository, MaterializationScheduler, MemoryJobRepository},
    service::CohortService,
    templates::{MemoryTemplateRepository, TemplateRepository},
};

/// Wires a `CohortService` from its collaborators.
///
/// Only the fact store is required. The catalog defaults to the clinical
/// catalog, jobs and templates default to in-process repositories, and the
/// cache, slicer, feature store and linkage are off unless provided.
pub struct CohortServiceBuilder {
    facts: Arc<dyn FactStore>,
    catalog: Arc<FieldCatalog>,
    config: EngineConfig,
    cache: Option<Arc<dyn CacheStore>>,
    slicer: Option<Arc<dyn AnalyticalSlicer>>,
    features: Option<Arc<dyn FeatureStore>>,
    linkage: Option<Arc<dyn LinkageRepository>>,
    jobs: Option<Arc<dyn JobRepository>>,
    templates: Option<Arc<dyn TemplateRepository>>,
}

impl CohortServiceBuilder {
    pub fn new(facts: Arc<dyn FactStore>) -> Self {
        Self {
            facts,
            catalog: Arc::new(FieldCatalog::clinical_defaults()),
            config: EngineConfig::default(),
            cache: None,
            slicer: None,
            features: None,
            linkage: None,
            jobs: None,
            templates: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<FieldCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// In-process LRU cache sized from the configuration.
    pub fn with_memory_cache(mut self) -> Self {
        self.cache = Some(Arc::new(MemoryCacheStore::with_capacity(self.config.cache_capacity)));
        self
    }

    pub fn with_slicer(mut self, slicer: Arc<dyn AnalyticalSlicer>) -> Self {
        self.slicer = Some(slicer);
        self
    }

    pub fn with_feature_store(mut self, features: Arc<dyn FeatureStore>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn with_linkage(mut self, linkage: Arc<dyn LinkageRepository>) -> Self {
        self.linkage = Some(linkage);
        self
    }

    pub fn with_job_repository(mut self, jobs: Arc<dyn JobRepository>) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_template_repository(mut self, templates: Arc<dyn TemplateRepository>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Must be called inside a Tokio runtime when materialization is used.
    pub fn build(self) -> CohortService {
        let runner = Arc::new(CohortRunner::new(self.facts, self.catalog, &self.config));

        let drilldown = DrilldownAssembler::new(runner.clone(), self.config.timeline_limit, self.config.linkage_limit)
            .with_features(self.features.clone())
            .with_linkage(self.linkage);

        let jobs = self.jobs.unwrap_or_else(|| Arc::new(MemoryJobRepository::new()));
        let scheduler = MaterializationScheduler::new(runner.clone(), jobs, self.features, &self.config);

        CohortService {
            runner,
            cache: self.cache.map(|store| ResultCache::new(store, self.config.cache_ttl())),
            slicer: self.slicer,
            drilldown,
            scheduler,
            templates: self.templates.unwrap_or_else(|| Arc::new(MemoryTemplateRepository::new())),
            config: self.config,
        }
    }
}
