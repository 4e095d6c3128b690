pub mod events;
pub mod favicon;
pub mod feedback;
pub mod site;

pub use events::{FeedbackEvent, SubscriptionTestEvent};
pub use favicon::{FaviconAsset, FaviconUpdate};
pub use feedback::Feedback;
pub use site::Site;
