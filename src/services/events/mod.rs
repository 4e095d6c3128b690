//! Live event fan-out
//!
//! [`Broadcaster`] is the reusable primitive; [`EventHub`] holds the
//! instances the application publishes through, and
//! [`FeedbackEventPublisher`] enriches new feedback before publishing it.

pub mod broadcaster;
pub mod feedback;
pub mod hub;

pub use broadcaster::{Broadcaster, Subscription, SubscriptionCloser};
pub use feedback::FeedbackEventPublisher;
pub use hub::EventHub;
