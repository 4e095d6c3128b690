//! Configuration default values
//!
//! All default values for configuration options live here so they can be
//! changed in one place.

// Favicon discovery defaults
pub const DEFAULT_FAVICON_CACHE_TTL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_HTML_BYTES: usize = 512 * 1024; // 512KB
pub const DEFAULT_MAX_ICON_BYTES: usize = 128 * 1024; // 128KB

// Event fan-out defaults
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 8;

// Environment
pub const ENV_PREFIX: &str = "FEEDBACK_WIDGET_";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
