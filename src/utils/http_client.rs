//! HTTP client construction and bounded body reads

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;

use crate::config::FaviconConfig;
use crate::config::defaults::{DEFAULT_HTTP_TIMEOUT_SECS, default_user_agent};
use crate::errors::AppResult;

/// Builds the injectable HTTP client used for favicon discovery
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    timeout: Duration,
    user_agent: String,
}

impl HttpClientFactory {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            timeout,
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &FaviconConfig) -> Self {
        Self::new(config.http_timeout, config.user_agent.clone())
    }

    /// Create a client whose every request is bounded by the total timeout
    pub fn create_client(&self) -> AppResult<Client> {
        debug!(
            "Creating HTTP client (timeout: {:?}, user agent: {})",
            self.timeout, self.user_agent
        );
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;
        Ok(client)
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            default_user_agent(),
        )
    }
}

/// Read a response body chunk by chunk, stopping at `limit` bytes.
///
/// Whatever lies beyond the limit is never read from the socket; the
/// response is dropped with the rest of the body unconsumed.
pub async fn read_capped(mut response: Response, limit: usize) -> reqwest::Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = limit - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            if chunk.len() > remaining {
                debug!("Response body truncated at {} bytes", limit);
            }
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
