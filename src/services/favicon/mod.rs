//! Favicon discovery and caching pipeline
//!
//! - [`FaviconResolver`] probes `/favicon.ico`, falls back to `<link rel=icon>`
//!   candidates from the root page and caches every outcome for a TTL
//! - [`FaviconAssetManager`] runs one background fetch per site at a time and
//!   persists successful results

pub mod asset_manager;
pub mod cache;
pub mod html;
pub mod resolver;

pub use asset_manager::FaviconAssetManager;
pub use cache::{FaviconCache, FaviconCacheStats};
pub use resolver::{FaviconResolver, FaviconSource};
