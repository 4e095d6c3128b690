//! Event payloads pushed to live dashboard streams.
//!
//! Both are immutable snapshots: built once, cloned per subscriber, never
//! mutated after publish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Published once per created feedback record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEvent {
    #[serde(rename = "siteID")]
    pub site_id: Uuid,
    #[serde(rename = "feedbackID")]
    pub feedback_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Aggregate feedback count for the site at publish time
    pub feedback_count: u64,
}

/// Published when a notification subscription is sent a test ping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionTestEvent {
    #[serde(rename = "subscriptionID")]
    pub subscription_id: Uuid,
    #[serde(rename = "siteID")]
    pub site_id: Uuid,
    /// Delivery channel under test, e.g. "email" or "sms"
    pub channel: String,
    pub sent_at: DateTime<Utc>,
}
