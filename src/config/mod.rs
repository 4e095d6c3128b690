use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub favicon: FaviconConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

/// Favicon discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaviconConfig {
    /// How long positive and negative lookup outcomes stay cached
    #[serde(default = "default_cache_ttl", with = "duration_serde")]
    pub cache_ttl: Duration,
    /// Total request timeout of the default HTTP client
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub http_timeout: Duration,
    /// Byte cap when reading a site's root HTML page
    #[serde(default = "default_max_html_bytes")]
    pub max_html_bytes: usize,
    /// Byte cap when downloading an icon
    #[serde(default = "default_max_icon_bytes")]
    pub max_icon_bytes: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Event fan-out configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Per-subscriber queue capacity; events beyond it are dropped
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(DEFAULT_FAVICON_CACHE_TTL_SECS)
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
}

fn default_max_html_bytes() -> usize {
    DEFAULT_MAX_HTML_BYTES
}

fn default_max_icon_bytes() -> usize {
    DEFAULT_MAX_ICON_BYTES
}

fn default_subscriber_buffer() -> usize {
    DEFAULT_SUBSCRIBER_BUFFER
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            cache_ttl: default_cache_ttl(),
            http_timeout: default_http_timeout(),
            max_html_bytes: default_max_html_bytes(),
            max_icon_bytes: default_max_icon_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

impl Config {
    /// Layer defaults, the TOML file (when present) and `FEEDBACK_WIDGET_*`
    /// environment variables, in that order of precedence.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if Path::new(config_file).exists() {
            info!("Loading configuration from {}", config_file);
            figment = figment.merge(Toml::file(config_file));
        } else {
            info!("Config file {} not found, using defaults", config_file);
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.favicon.cache_ttl.is_zero() {
            return Err(AppError::configuration("favicon.cache_ttl must be greater than zero"));
        }
        if self.favicon.http_timeout.is_zero() {
            return Err(AppError::configuration("favicon.http_timeout must be greater than zero"));
        }
        if self.favicon.max_html_bytes == 0 || self.favicon.max_icon_bytes == 0 {
            return Err(AppError::configuration("favicon byte caps must be greater than zero"));
        }
        if self.events.subscriber_buffer == 0 {
            return Err(AppError::configuration("events.subscriber_buffer must be greater than zero"));
        }
        Ok(())
    }
}
