use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Resolved icon bytes plus their content type.
///
/// Only produced once the content type has passed the image allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconAsset {
    pub content_type: String,
    pub data: Bytes,
}

impl FaviconAsset {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Turn a fetched asset into the storage write, stamped with `fetched_at`
    pub fn into_update(self, fetched_at: DateTime<Utc>) -> FaviconUpdate {
        FaviconUpdate {
            content_type: self.content_type,
            data: self.data,
            fetched_at,
        }
    }
}

/// The favicon fields persisted after a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconUpdate {
    pub content_type: String,
    pub data: Bytes,
    pub fetched_at: DateTime<Utc>,
}
