use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::CohortQuery;

#[derive(Serialize)]
struct FingerprintInput<'a> {
    tenant: &'a str,
    dsl: &'a str,
    limit: usize,
    fields: Vec<&'a str>,
    filters: Vec<(&'a str, &'a serde_json::Value)>,
    record_id: &'a str,
}

/// Cache key derivation for cohort results.
pub struct Fingerprint;

impl Fingerprint {
    /// `cohort:<tenant or "public">:<sha256 hex>` over the normalized
    /// request. Field order and filter order do not affect the key.
    pub fn cohort_key(query: &CohortQuery) -> String {
        let tenant = query.tenant().unwrap_or("");

        let mut fields = query.fields.iter().map(|f| f.as_str()).collect::<Vec<_>>();
        fields.sort_unstable();
        let mut filters = query.filters.iter().map(|(k, v)| (k.as_str(), v)).collect::<Vec<_>>();
        filters.sort_by(|a, b| a.0.cmp(b.0));

        let input = FingerprintInput {
            tenant,
            dsl: query.dsl.trim(),
            limit: query.limit.unwrap_or(0),
            fields,
            filters,
            record_id: query.record_id.as_deref().unwrap_or(""),
        };

        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&input).unwrap_or_else(|_| query.dsl.as_bytes().to_vec()));
        let digest = hasher.finalize();

        let scope = if tenant.is_empty() { "public" } else { tenant };
        format!("cohort:{}:{:x}", scope, digest)
    }
}
