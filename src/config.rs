//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::executor::ExecutionLimits;

/// Tunables for the cohort engine.
///
/// Every field has a default, so a partial JSON document or an empty
/// environment yields a working configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Limit used when neither the request nor the DSL specify one.
    pub default_limit: usize,
    /// Hard cap applied to any requested limit.
    pub max_limit: usize,
    /// Cap on the patient id sample returned with a result.
    pub id_sample_cap: usize,
    /// Cap on the projected record sample returned with a result.
    pub record_sample_cap: usize,
    /// Drilldown timeline length when the request does not set one.
    pub timeline_limit: usize,
    /// Number of linkage rows requested per drilldown.
    pub linkage_limit: usize,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    /// TTL of online feature writes.
    pub feature_ttl_secs: u64,
    /// Concurrent materialization slots.
    pub materialize_workers: usize,
    pub job_list_limit: usize,
    /// Reject queries with unresolvable clauses instead of dropping them.
    pub strict_filters: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: 500,
            max_limit: 5000,
            id_sample_cap: 500,
            record_sample_cap: 200,
            timeline_limit: 200,
            linkage_limit: 25,
            cache_ttl_secs: 120,
            cache_capacity: 1024,
            feature_ttl_secs: 300,
            materialize_workers: 1,
            job_list_limit: 50,
            strict_filters: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays values found through `lookup` on top of the defaults. Values
    /// that are absent or do not parse keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let read = |key: &str, current: usize| -> usize {
            lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(current)
        };

        config.default_limit = read("COHORT_DEFAULT_LIMIT", config.default_limit);
        config.max_limit = read("COHORT_MAX_LIMIT", config.max_limit);
        config.id_sample_cap = read("COHORT_ID_SAMPLE_CAP", config.id_sample_cap);
        config.record_sample_cap = read("COHORT_RECORD_SAMPLE_CAP", config.record_sample_cap);
        config.timeline_limit = read("COHORT_TIMELINE_LIMIT", config.timeline_limit);
        config.linkage_limit = read("COHORT_LINKAGE_LIMIT", config.linkage_limit);
        config.cache_ttl_secs = read("COHORT_CACHE_TTL_SECS", config.cache_ttl_secs as usize) as u64;
        config.cache_capacity = read("COHORT_CACHE_CAPACITY", config.cache_capacity);
        config.feature_ttl_secs = read("FEATURE_STORE_CACHE_TTL_SECS", config.feature_ttl_secs as usize) as u64;
        config.materialize_workers = read("FEATURE_MATERIALIZE_WORKERS", config.materialize_workers).max(1);
        config.job_list_limit = read("COHORT_JOB_LIST_LIMIT", config.job_list_limit);
        config.strict_filters = lookup("COHORT_STRICT_FILTERS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(config.strict_filters);

        config
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn feature_ttl(&self) -> Duration {
        Duration::from_secs(self.feature_ttl_secs)
    }

    pub fn limits(&self) -> ExecutionLimits {
        ExecutionLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            id_sample_cap: self.id_sample_cap,
            record_sample_cap: self.record_sample_cap,
        }
    }
}
