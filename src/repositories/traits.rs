//! Repository trait definitions

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::RepositoryResult;
use crate::models::{FaviconUpdate, Site};

/// Site storage used by the favicon asset manager
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// Find a site by its identifier
    ///
    /// * `Ok(Some(site))` - site found
    /// * `Ok(None)` - no such site
    /// * `Err(RepositoryError)` - storage failure
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Site>>;

    /// Persist the favicon fields of a site, leaving every other field alone
    async fn update_favicon(&self, id: Uuid, update: FaviconUpdate) -> RepositoryResult<()>;
}

/// Feedback storage used to enrich published events
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Current number of feedback records for a site
    async fn count_for_site(&self, site_id: Uuid) -> RepositoryResult<u64>;
}
