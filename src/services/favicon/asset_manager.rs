//! Background favicon fetches with per-site deduplication

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::resolver::FaviconSource;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::Site;
use crate::observability::AppObservability;
use crate::repositories::SiteRepository;

type InFlightSet = Arc<Mutex<HashSet<Uuid>>>;

/// Schedules favicon fetches for sites and persists what they find.
///
/// At most one fetch per site identifier runs at a time. The key is the site
/// id, not its origin: a fetch already running for a site keeps resolving the
/// origin it started with even if the site's origin changes meanwhile.
///
/// No retries happen here. A failed or empty fetch leaves any stored favicon
/// untouched and a later `schedule_fetch` starts from scratch.
pub struct FaviconAssetManager {
    source: Arc<dyn FaviconSource>,
    sites: Arc<dyn SiteRepository>,
    in_flight: InFlightSet,
    observability: AppObservability,
}

impl FaviconAssetManager {
    pub fn new(source: Arc<dyn FaviconSource>, sites: Arc<dyn SiteRepository>) -> Self {
        Self {
            source,
            sites,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            observability: AppObservability::from_global(),
        }
    }

    pub fn with_observability(mut self, observability: AppObservability) -> Self {
        self.observability = observability;
        self
    }

    /// Start a background fetch for `site` unless one is already running.
    ///
    /// Returns the task handle when a fetch was spawned and `None` when the
    /// call was deduplicated. Dropping the handle does not cancel the task.
    /// Must be called from within a Tokio runtime.
    pub fn schedule_fetch(&self, site: &Site) -> Option<JoinHandle<()>> {
        let guard = InFlightGuard::acquire(&self.in_flight, site.id)?;

        let source = Arc::clone(&self.source);
        let sites = Arc::clone(&self.sites);
        let observability = self.observability.clone();
        let site_id = site.id;
        let origin = site.allowed_origin.clone();

        debug!(%site_id, %origin, "Scheduling favicon fetch");
        Some(tokio::spawn(async move {
            let _guard = guard;
            let success = fetch_and_persist(source.as_ref(), sites.as_ref(), site_id, &origin).await;
            observability.record_fetch(success);
        }))
    }

    /// Look a site up by id and schedule a fetch for it
    pub async fn schedule_fetch_by_id(
        &self,
        site_id: Uuid,
    ) -> RepositoryResult<Option<JoinHandle<()>>> {
        let site = self
            .sites
            .find_by_id(site_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("site", site_id))?;
        Ok(self.schedule_fetch(&site))
    }

    pub fn is_in_flight(&self, site_id: Uuid) -> bool {
        lock(&self.in_flight).contains(&site_id)
    }

    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

async fn fetch_and_persist(
    source: &dyn FaviconSource,
    sites: &dyn SiteRepository,
    site_id: Uuid,
    origin: &str,
) -> bool {
    let asset = match source.resolve_asset(origin).await {
        Ok(Some(asset)) => asset,
        Ok(None) => {
            debug!(%site_id, %origin, "No favicon asset found");
            return false;
        }
        Err(e) => {
            debug!(%site_id, %origin, error = %e, "Favicon lookup failed");
            return false;
        }
    };

    let content_type = asset.content_type.clone();
    let size = asset.len();
    match sites
        .update_favicon(site_id, asset.into_update(Utc::now()))
        .await
    {
        Ok(()) => {
            info!(%site_id, %origin, %content_type, size, "Stored favicon");
            true
        }
        Err(e) => {
            warn!(%site_id, %origin, error = %e, "Failed to persist favicon");
            false
        }
    }
}

fn lock(set: &Mutex<HashSet<Uuid>>) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-flight marker for one site, released on drop whatever the outcome
struct InFlightGuard {
    set: InFlightSet,
    site_id: Uuid,
}

impl InFlightGuard {
    fn acquire(set: &InFlightSet, site_id: Uuid) -> Option<Self> {
        if !lock(set).insert(site_id) {
            debug!(%site_id, "Favicon fetch already in flight");
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            site_id,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.site_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FaviconResult;
    use crate::models::{FaviconAsset, FaviconUpdate};
    use crate::repositories::InMemorySiteRepository;
    use async_trait::async_trait;
    use tracing_test::traced_test;

    struct FixedSource(Option<FaviconAsset>);

    #[async_trait]
    impl FaviconSource for FixedSource {
        async fn resolve_asset(&self, _origin: &str) -> FaviconResult<Option<FaviconAsset>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_successful_fetch_persists_fields() {
        let repo = Arc::new(InMemorySiteRepository::new());
        let site = Site::new("Shop", "https://shop.example");
        repo.insert(site.clone()).await;

        let source = Arc::new(FixedSource(Some(FaviconAsset::new("image/png", vec![9u8; 4]))));
        let manager = FaviconAssetManager::new(source, repo.clone());

        let before = Utc::now();
        manager.schedule_fetch(&site).unwrap().await.unwrap();

        let stored = repo.find_by_id(site.id).await.unwrap().unwrap();
        assert_eq!(stored.favicon_content_type.as_deref(), Some("image/png"));
        assert_eq!(stored.favicon_data, Some(vec![9u8; 4]));
        assert!(stored.favicon_fetched_at.unwrap() >= before);
        assert!(!manager.is_in_flight(site.id));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_missing_asset_keeps_existing_favicon() {
        let repo = Arc::new(InMemorySiteRepository::new());
        let mut site = Site::new("Blog", "https://blog.example");
        site.apply_favicon(FaviconAsset::new("image/x-icon", vec![1u8]).into_update(Utc::now()));
        repo.insert(site.clone()).await;

        let manager = FaviconAssetManager::new(Arc::new(FixedSource(None)), repo.clone());
        manager.schedule_fetch(&site).unwrap().await.unwrap();

        let stored = repo.find_by_id(site.id).await.unwrap().unwrap();
        assert_eq!(stored, site);
        assert_eq!(manager.in_flight_count(), 0);
        assert!(logs_contain("No favicon asset found"));
    }

    /// Finds sites but refuses every favicon write
    struct ReadOnlySites(InMemorySiteRepository);

    #[async_trait]
    impl SiteRepository for ReadOnlySites {
        async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Site>> {
            self.0.find_by_id(id).await
        }

        async fn update_favicon(&self, _id: Uuid, _update: FaviconUpdate) -> RepositoryResult<()> {
            Err(RepositoryError::query_failed("update favicon", "database is read-only"))
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_persist_failure_is_logged_and_released() {
        let inner = InMemorySiteRepository::new();
        let site = Site::new("Docs", "https://docs.example");
        inner.insert(site.clone()).await;
        let repo = Arc::new(ReadOnlySites(inner));

        let source = Arc::new(FixedSource(Some(FaviconAsset::new("image/png", vec![1u8, 2]))));
        let manager = FaviconAssetManager::new(source, repo.clone());

        manager.schedule_fetch(&site).unwrap().await.unwrap();
        assert!(!manager.is_in_flight(site.id));
        assert!(logs_contain("Failed to persist favicon"));

        let stored = repo.find_by_id(site.id).await.unwrap().unwrap();
        assert!(!stored.has_favicon());

        // The next schedule is not deduplicated against the failed one
        let retry = manager.schedule_fetch(&site);
        assert!(retry.is_some());
        retry.unwrap().await.unwrap();
        assert_eq!(manager.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_schedule_by_unknown_id() {
        let repo = Arc::new(InMemorySiteRepository::new());
        let manager = FaviconAssetManager::new(Arc::new(FixedSource(None)), repo);
        let err = manager.schedule_fetch_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
