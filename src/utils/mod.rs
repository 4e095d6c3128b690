//! Utility modules shared by the favicon pipeline

pub mod content_type;
pub mod data_uri;
pub mod http_client;
pub mod url;

pub use data_uri::DataUri;
pub use http_client::{HttpClientFactory, read_capped};
pub use url::UrlUtils;
