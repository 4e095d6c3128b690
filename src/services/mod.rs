//! Services layer
//!
//! - `favicon`: discovery, TTL caching and scheduled persistence of site icons
//! - `events`: fan-out of domain events to live dashboard subscribers

pub mod events;
pub mod favicon;

pub use events::{Broadcaster, EventHub, FeedbackEventPublisher, Subscription, SubscriptionCloser};
pub use favicon::{FaviconAssetManager, FaviconResolver, FaviconSource};
