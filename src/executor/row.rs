use indexmap::IndexMap;
use serde_json::Value;

use crate::database::FactValue;

/// A fact projected onto a field list, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub IndexMap<String, FactValue>);

impl Row {
    pub fn get(&self, key: &str) -> Option<&FactValue> { self.0.get(key) }
    pub fn values(&self) -> impl Iterator<Item = &FactValue> { self.0.values() }
    pub fn into_json(self) -> IndexMap<String, Value> {
        self.0.into_iter().map(|(k, v)| (k, v.to_json())).collect()
    }
}
