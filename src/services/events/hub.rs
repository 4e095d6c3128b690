use chrono::Utc;
use uuid::Uuid;

use super::broadcaster::{Broadcaster, Subscription};
use crate::config::EventsConfig;
use crate::models::{FeedbackEvent, SubscriptionTestEvent};
use crate::observability::AppObservability;

/// The broadcasters live dashboard streams attach to
#[derive(Clone)]
pub struct EventHub {
    feedback: Broadcaster<FeedbackEvent>,
    subscription_tests: Broadcaster<SubscriptionTestEvent>,
}

impl EventHub {
    pub fn new(config: &EventsConfig) -> Self {
        Self::with_observability(config, AppObservability::from_global())
    }

    pub fn with_observability(config: &EventsConfig, observability: AppObservability) -> Self {
        Self {
            feedback: Broadcaster::instrumented(
                config.subscriber_buffer,
                "feedback",
                observability.clone(),
            ),
            subscription_tests: Broadcaster::instrumented(
                config.subscriber_buffer,
                "subscription_test",
                observability,
            ),
        }
    }

    pub fn feedback(&self) -> &Broadcaster<FeedbackEvent> {
        &self.feedback
    }

    pub fn subscription_tests(&self) -> &Broadcaster<SubscriptionTestEvent> {
        &self.subscription_tests
    }

    pub fn subscribe_feedback(&self) -> Option<Subscription<FeedbackEvent>> {
        self.feedback.subscribe()
    }

    pub fn subscribe_subscription_tests(&self) -> Option<Subscription<SubscriptionTestEvent>> {
        self.subscription_tests.subscribe()
    }

    /// Announce that a notification subscription was sent a test ping
    pub fn publish_subscription_test(
        &self,
        subscription_id: Uuid,
        site_id: Uuid,
        channel: impl Into<String>,
    ) -> SubscriptionTestEvent {
        let event = SubscriptionTestEvent {
            subscription_id,
            site_id,
            channel: channel.into(),
            sent_at: Utc::now(),
        };
        self.subscription_tests.broadcast(event.clone());
        event
    }

    /// Close both broadcasters; every open subscription observes closure
    pub fn close(&self) {
        self.feedback.close();
        self.subscription_tests.close();
    }
}
