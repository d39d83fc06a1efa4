use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Optional analytical back end that returns aggregate slices for the
/// filters of a cohort query.
#[async_trait]
pub trait AnalyticalSlicer: Send + Sync {
    async fn query(&self, filters: &IndexMap<String, Value>) -> Result<Vec<Map<String, Value>>, StoreError>;
}
