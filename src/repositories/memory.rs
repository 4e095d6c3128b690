use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{FeedbackRepository, SiteRepository};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{FaviconUpdate, Feedback, Site};

/// Site store backed by a map
#[derive(Debug, Default)]
pub struct InMemorySiteRepository {
    sites: RwLock<HashMap<Uuid, Site>>,
}

impl InMemorySiteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, site: Site) {
        self.sites.write().await.insert(site.id, site);
    }
}

#[async_trait]
impl SiteRepository for InMemorySiteRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Site>> {
        Ok(self.sites.read().await.get(&id).cloned())
    }

    async fn update_favicon(&self, id: Uuid, update: FaviconUpdate) -> RepositoryResult<()> {
        let mut sites = self.sites.write().await;
        let site = sites
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("site", id))?;
        site.apply_favicon(update);
        Ok(())
    }
}

/// Feedback store backed by a list
#[derive(Debug, Default)]
pub struct InMemoryFeedbackRepository {
    feedback: RwLock<Vec<Feedback>>,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, feedback: Feedback) {
        self.feedback.write().await.push(feedback);
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn count_for_site(&self, site_id: Uuid) -> RepositoryResult<u64> {
        let feedback = self.feedback.read().await;
        Ok(feedback.iter().filter(|f| f.site_id == site_id).count() as u64)
    }
}
