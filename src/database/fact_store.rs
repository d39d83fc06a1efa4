use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{database::Fact, error::StoreError, parser::analyzer::CompiledPredicate};

/// Optional narrowing applied on top of the compiled predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryScope {
    pub fact_id: Option<String>,
    pub patient_id: Option<String>,
}

impl QueryScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn fact(id: &str) -> Self {
        Self { fact_id: Some(id.to_string()), patient_id: None }
    }

    pub fn patient(id: &str) -> Self {
        Self { fact_id: None, patient_id: Some(id.to_string()) }
    }

    pub fn with_patient(mut self, id: &str) -> Self {
        self.patient_id = Some(id.to_string());
        self
    }

    pub fn contains(&self, fact: &Fact) -> bool {
        self.fact_id.as_deref().is_none_or(|id| fact.id == id)
            && self.patient_id.as_deref().is_none_or(|id| fact.patient_id == id)
    }
}

/// Consumer of a streaming scan. Returning an error stops the scan.
pub type FactSink<'a> = dyn FnMut(&Fact) -> Result<(), StoreError> + Send + 'a;

/// Read contract of the clinical fact store.
///
/// Implementations evaluate the compiled predicates as a conjunction with
/// absent values never matching. Every call is a future; dropping it
/// cancels the underlying work.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Number of distinct patients with at least one matching fact.
    async fn count(&self, predicates: &[CompiledPredicate], scope: &QueryScope) -> Result<usize, StoreError>;

    /// Distinct matching patient ids in ascending order, at most `cap`.
    async fn list_distinct_patient_ids(
        &self,
        predicates: &[CompiledPredicate],
        scope: &QueryScope,
        cap: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Matching facts, most recent first, at most `cap`.
    async fn sample_records(
        &self,
        predicates: &[CompiledPredicate],
        scope: &QueryScope,
        cap: usize,
    ) -> Result<Vec<Fact>, StoreError>;

    /// Matching facts of one patient in ascending event time. When more than
    /// `cap` match, the most recent `cap` are returned.
    async fn fetch_timeline(
        &self,
        predicates: &[CompiledPredicate],
        patient_id: &str,
        cap: usize,
    ) -> Result<Vec<Fact>, StoreError> {
        let mut facts = self.sample_records(predicates, &QueryScope::patient(patient_id), cap).await?;
        facts.reverse();
        Ok(facts)
    }

    /// Feeds matching facts, most recent first, to `sink` one at a time and
    /// returns how many were delivered. Stops after `cap` facts or on the
    /// first sink error.
    async fn scan(
        &self,
        predicates: &[CompiledPredicate],
        scope: &QueryScope,
        cap: usize,
        sink: &mut FactSink<'_>,
    ) -> Result<usize, StoreError> {
        let facts = self.sample_records(predicates, scope, cap).await?;
        for fact in &facts {
            sink(fact)?;
        }
        Ok(facts.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_scope_contains() {
        let fact = Fact::new("f1", "p1", "Observation", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        assert!(QueryScope::all().contains(&fact));
        assert!(QueryScope::fact("f1").contains(&fact));
        assert!(!QueryScope::fact("f2").contains(&fact));
        assert!(QueryScope::fact("f1").with_patient("p1").contains(&fact));
        assert!(!QueryScope::patient("p2").contains(&fact));
    }
}
