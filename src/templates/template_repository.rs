use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::{error::StoreError, templates::CohortTemplate};

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Templates of `tenant_id` plus tenant-less ones, newest first.
    async fn list(&self, tenant_id: Option<&str>, limit: usize) -> Result<Vec<CohortTemplate>, StoreError>;

    async fn create(&self, template: &CohortTemplate) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryTemplateRepository {
    templates: RwLock<Vec<CohortTemplate>>,
}

impl MemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateRepository for MemoryTemplateRepository {
    async fn list(&self, tenant_id: Option<&str>, limit: usize) -> Result<Vec<CohortTemplate>, StoreError> {
        let templates = self.templates.read().unwrap_or_else(PoisonError::into_inner);
        let mut visible = templates.iter()
            .rev()
            .filter(|t| match tenant_id {
                Some(tenant) => t.tenant_id.as_deref().is_none_or(|owner| owner == tenant),
                None => true,
            })
            .cloned()
            .collect::<Vec<_>>();

        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        visible.truncate(limit);
        Ok(visible)
    }

    async fn create(&self, template: &CohortTemplate) -> Result<(), StoreError> {
        let mut templates = self.templates.write().unwrap_or_else(PoisonError::into_inner);
        if templates.iter().any(|t| t.id == template.id) {
            return Err(StoreError::Backend(format!("template {} already exists", template.id)));
        }
        templates.push(template.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn template(id: &str, tenant: Option<&str>, age_secs: i64) -> CohortTemplate {
        CohortTemplate {
            id: id.to_string(),
            tenant_id: tenant.map(str::to_string),
            created_at: Utc::now() - Duration::seconds(age_secs),
            ..CohortTemplate::new(id, "select patient_id")
        }
    }

    #[tokio::test]
    async fn test_list_scoped_and_ordered() {
        let repo = MemoryTemplateRepository::new();
        repo.create(&template("shared", None, 30)).await.unwrap();
        repo.create(&template("acme", Some("acme"), 10)).await.unwrap();
        repo.create(&template("globex", Some("globex"), 0)).await.unwrap();

        let ids = repo.list(Some("acme"), 25).await.unwrap().into_iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["acme", "shared"]);

        assert_eq!(repo.list(None, 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let repo = MemoryTemplateRepository::new();
        repo.create(&template("t1", None, 0)).await.unwrap();
        assert!(repo.create(&template("t1", None, 0)).await.is_err());
    }
}
