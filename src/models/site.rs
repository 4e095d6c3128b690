use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::favicon::FaviconUpdate;

/// A site embedding the feedback widget.
///
/// Only the origin and the three favicon fields are touched by this crate;
/// everything else about a site belongs to the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub allowed_origin: String,
    pub favicon_data: Option<Vec<u8>>,
    pub favicon_content_type: Option<String>,
    pub favicon_fetched_at: Option<DateTime<Utc>>,
}

impl Site {
    pub fn new(name: impl Into<String>, allowed_origin: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            allowed_origin: allowed_origin.into(),
            favicon_data: None,
            favicon_content_type: None,
            favicon_fetched_at: None,
        }
    }

    pub fn has_favicon(&self) -> bool {
        self.favicon_data.as_ref().is_some_and(|data| !data.is_empty())
    }

    /// Overwrite the favicon fields in one step
    pub fn apply_favicon(&mut self, update: FaviconUpdate) {
        self.favicon_content_type = Some(update.content_type);
        self.favicon_data = Some(update.data.to_vec());
        self.favicon_fetched_at = Some(update.fetched_at);
    }
}
