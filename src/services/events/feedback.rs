use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::broadcaster::Broadcaster;
use crate::models::{Feedback, FeedbackEvent};
use crate::repositories::FeedbackRepository;

/// Turns freshly created feedback into a [`FeedbackEvent`] and publishes it
#[derive(Clone)]
pub struct FeedbackEventPublisher {
    broadcaster: Broadcaster<FeedbackEvent>,
    feedback: Arc<dyn FeedbackRepository>,
}

impl FeedbackEventPublisher {
    pub fn new(broadcaster: Broadcaster<FeedbackEvent>, feedback: Arc<dyn FeedbackRepository>) -> Self {
        Self {
            broadcaster,
            feedback,
        }
    }

    /// Build the event for `feedback` and broadcast it.
    ///
    /// Never fails: a failing count query publishes a count of zero.
    pub async fn publish_created(&self, feedback: &Feedback) -> FeedbackEvent {
        let event = self.build_event(feedback).await;
        let delivered = self.broadcaster.broadcast(event.clone());
        debug!(
            site_id = %event.site_id,
            feedback_id = %event.feedback_id,
            delivered,
            "Published feedback event"
        );
        event
    }

    /// Snapshot the feedback with the site's current aggregate count.
    ///
    /// An unstamped record gets the current time.
    pub async fn build_event(&self, feedback: &Feedback) -> FeedbackEvent {
        let created_at = feedback.created_at.unwrap_or_else(Utc::now);

        let feedback_count = match self.feedback.count_for_site(feedback.site_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(site_id = %feedback.site_id, error = %e, "Failed to count feedback, publishing zero");
                0
            }
        };

        FeedbackEvent {
            site_id: feedback.site_id,
            feedback_id: feedback.id,
            created_at,
            feedback_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{RepositoryError, RepositoryResult};
    use crate::repositories::InMemoryFeedbackRepository;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use uuid::Uuid;

    struct FailingRepository;

    #[async_trait]
    impl FeedbackRepository for FailingRepository {
        async fn count_for_site(&self, _site_id: Uuid) -> RepositoryResult<u64> {
            Err(RepositoryError::query_failed("count feedback", "connection reset"))
        }
    }

    #[tokio::test]
    async fn test_event_carries_current_count() {
        let repo = Arc::new(InMemoryFeedbackRepository::new());
        let site_id = Uuid::new_v4();
        let created_at = DateTime::<Utc>::UNIX_EPOCH + Duration::days(1);
        let feedback = Feedback::new(site_id, "Love it").with_created_at(created_at);
        repo.insert(Feedback::new(site_id, "earlier")).await;
        repo.insert(feedback.clone()).await;

        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe().unwrap();
        let publisher = FeedbackEventPublisher::new(broadcaster, repo);

        let event = publisher.publish_created(&feedback).await;
        assert_eq!(event.site_id, site_id);
        assert_eq!(event.feedback_id, feedback.id);
        assert_eq!(event.created_at, created_at);
        assert_eq!(event.feedback_count, 2);
        assert_eq!(sub.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_failed_count_publishes_zero() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe().unwrap();
        let publisher = FeedbackEventPublisher::new(broadcaster, Arc::new(FailingRepository));

        let feedback = Feedback::new(Uuid::new_v4(), "hello");
        let event = publisher.publish_created(&feedback).await;
        assert_eq!(event.feedback_count, 0);
        assert_eq!(sub.recv().await.map(|e| e.feedback_count), Some(0));
    }

    #[tokio::test]
    async fn test_unstamped_feedback_gets_current_time() {
        let publisher = FeedbackEventPublisher::new(
            Broadcaster::new(),
            Arc::new(InMemoryFeedbackRepository::new()),
        );

        let before = Utc::now();
        let event = publisher
            .build_event(&Feedback::new(Uuid::new_v4(), "no timestamp"))
            .await;
        assert!(event.created_at >= before);
        assert!(event.created_at <= Utc::now());
    }
}
