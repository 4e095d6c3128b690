//! Feedback enrichment and publication through the event hub

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use feedback_widget::config::EventsConfig;
use feedback_widget::models::Feedback;
use feedback_widget::repositories::InMemoryFeedbackRepository;
use feedback_widget::services::{EventHub, FeedbackEventPublisher};

#[tokio::test]
async fn test_created_feedback_reaches_dashboard_subscribers() {
    let hub = EventHub::new(&EventsConfig::default());
    let repo = Arc::new(InMemoryFeedbackRepository::new());
    let publisher = FeedbackEventPublisher::new(hub.feedback().clone(), repo.clone());
    let mut dashboard = hub.subscribe_feedback().unwrap();

    let site_id = Uuid::new_v4();
    let stamped = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let feedback = Feedback::new(site_id, "The checkout button is hidden").with_created_at(stamped);
    repo.insert(feedback.clone()).await;

    publisher.publish_created(&feedback).await;

    let event = dashboard.recv().await.unwrap();
    assert_eq!(event.site_id, site_id);
    assert_eq!(event.feedback_id, feedback.id);
    assert_eq!(event.created_at, stamped);
    assert_eq!(event.feedback_count, 1);
}

#[tokio::test]
async fn test_publish_after_hub_close_is_silent() {
    let hub = EventHub::new(&EventsConfig::default());
    let publisher = FeedbackEventPublisher::new(
        hub.feedback().clone(),
        Arc::new(InMemoryFeedbackRepository::new()),
    );
    hub.close();

    let before = Utc::now();
    let event = publisher
        .publish_created(&Feedback::new(Uuid::new_v4(), "late"))
        .await;
    assert!(event.created_at >= before);
    assert_eq!(event.feedback_count, 0);
}
