use std::{collections::BTreeSet, path::Path, sync::{PoisonError, RwLock, RwLockReadGuard}};

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::{
    database::{Fact, FactSink, FactStore, QueryScope},
    error::StoreError,
    executor::Eval,
    parser::analyzer::CompiledPredicate,
};

/// In-process fact store that evaluates predicates row by row.
///
/// Suitable for tests, demos and small tenant snapshots loaded from JSON.
#[derive(Debug, Default)]
pub struct MemoryFactStore {
    facts: RwLock<Vec<Fact>>,
}

impl MemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_facts(facts: Vec<Fact>) -> Self {
        Self { facts: RwLock::new(facts) }
    }

    pub fn add(&self, fact: Fact) {
        self.facts.write().unwrap_or_else(PoisonError::into_inner).push(fact);
    }

    pub fn add_batch(&self, facts: impl IntoIterator<Item = Fact>) -> usize {
        let mut guard = self.facts.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.extend(facts);
        guard.len() - before
    }

    pub fn count_facts(&self) -> usize {
        self.read().len()
    }

    /// Accepts a single fact object or an array of facts.
    pub fn load_from_json(&self, json_value: Value) -> Result<usize, StoreError> {
        let facts = match json_value {
            Value::Array(_) => serde_json::from_value::<Vec<Fact>>(json_value)?,
            Value::Object(_) => vec![serde_json::from_value::<Fact>(json_value)?],
            _ => return Err(StoreError::Backend("expected a fact object or an array of facts".to_string())),
        };
        Ok(self.add_batch(facts))
    }

    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let loaded = self.load_from_json(serde_json::from_str(&content)?)?;
        info!(path = %path.display(), facts = loaded, "loaded facts");
        Ok(loaded)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Fact>> {
        self.facts.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Matching facts, most recent first.
    fn matching(&self, predicates: &[CompiledPredicate], scope: &QueryScope) -> Vec<Fact> {
        let mut facts = self.read().iter()
            .filter(|f| scope.contains(f) && Eval::matches_all(predicates, f))
            .cloned()
            .collect::<Vec<_>>();

        facts.sort_by(|a, b| {
            b.timestamp.cmp(&a.timestamp)
                .then_with(|| b.ingested_at.cmp(&a.ingested_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        facts
    }

    fn distinct_patients(&self, predicates: &[CompiledPredicate], scope: &QueryScope) -> BTreeSet<String> {
        self.read().iter()
            .filter(|f| scope.contains(f) && Eval::matches_all(predicates, f))
            .map(|f| f.patient_id.clone())
            .collect()
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn count(&self, predicates: &[CompiledPredicate], scope: &QueryScope) -> Result<usize, StoreError> {
        Ok(self.distinct_patients(predicates, scope).len())
    }

    async fn list_distinct_patient_ids(
        &self,
        predicates: &[CompiledPredicate],
        scope: &QueryScope,
        cap: usize,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self.distinct_patients(predicates, scope).into_iter().take(cap).collect())
    }

    async fn sample_records(
        &self,
        predicates: &[CompiledPredicate],
        scope: &QueryScope,
        cap: usize,
    ) -> Result<Vec<Fact>, StoreError> {
        let mut facts = self.matching(predicates, scope);
        facts.truncate(cap);
        Ok(facts)
    }

    async fn scan(
        &self,
        predicates: &[CompiledPredicate],
        scope: &QueryScope,
        cap: usize,
        sink: &mut FactSink<'_>,
    ) -> Result<usize, StoreError> {
        let mut delivered = 0;
        for fact in self.matching(predicates, scope).iter().take(cap) {
            sink(fact)?;
            delivered += 1;
        }
        Ok(delivered)
    }
}
