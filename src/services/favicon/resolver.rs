//! Favicon discovery with a TTL cache of outcomes

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::cache::{FaviconCache, FaviconCacheStats};
use super::html::extract_icon_hrefs;
use crate::config::FaviconConfig;
use crate::errors::{AppResult, FaviconResult};
use crate::models::FaviconAsset;
use crate::observability::AppObservability;
use crate::utils::content_type::{
    is_acceptable_probe, is_image_content_type, media_type, sniff_image_type,
};
use crate::utils::data_uri::{DataUri, is_data_uri};
use crate::utils::{HttpClientFactory, UrlUtils, read_capped};

/// Anything that can turn an origin into a favicon asset
#[async_trait]
pub trait FaviconSource: Send + Sync {
    /// `Ok(None)` means no acceptable icon was found; errors are reserved
    /// for origins that cannot be normalized.
    async fn resolve_asset(&self, origin: &str) -> FaviconResult<Option<FaviconAsset>>;
}

/// Discovers favicons for web origins.
///
/// Lookup order:
/// 1. `<origin>/favicon.ico`
/// 2. `<link rel="icon|apple-touch-icon|mask-icon">` candidates from the root
///    page, in document order (inline `data:` URIs win without probing)
///
/// Every outcome, including "not found", is cached per origin for the TTL.
/// Concurrent lookups for the same uncached origin may both hit the network;
/// they produce the same value and the second write replaces the first.
pub struct FaviconResolver {
    client: Client,
    cache: FaviconCache,
    max_html_bytes: usize,
    max_icon_bytes: usize,
    observability: AppObservability,
}

impl FaviconResolver {
    /// Create a resolver with default limits around an injected client
    pub fn new(client: Client) -> Self {
        Self::from_config(client, &FaviconConfig::default())
    }

    pub fn from_config(client: Client, config: &FaviconConfig) -> Self {
        Self {
            client,
            cache: FaviconCache::new(config.cache_ttl),
            max_html_bytes: config.max_html_bytes,
            max_icon_bytes: config.max_icon_bytes,
            observability: AppObservability::from_global(),
        }
    }

    /// Create a resolver with its own client built from `config`
    pub fn with_config(config: &FaviconConfig) -> AppResult<Self> {
        let client = HttpClientFactory::from_config(config).create_client()?;
        Ok(Self::from_config(client, config))
    }

    pub fn with_observability(mut self, observability: AppObservability) -> Self {
        self.observability = observability;
        self
    }

    /// Resolve the favicon URL of an origin.
    ///
    /// Returns `Ok(None)` when nothing usable was found, including when the
    /// host is unreachable. The returned value may be an inline `data:` URI.
    pub async fn resolve(&self, origin: &str) -> FaviconResult<Option<String>> {
        self.resolve_with_cancel(origin, &CancellationToken::new())
            .await
    }

    /// Same as [`resolve`](Self::resolve), bounded by `cancel`.
    ///
    /// A cancelled lookup reports "not found" and leaves the cache untouched.
    pub async fn resolve_with_cancel(
        &self,
        origin: &str,
        cancel: &CancellationToken,
    ) -> FaviconResult<Option<String>> {
        let origin = UrlUtils::normalize_origin(origin)?;

        if let Some(cached) = self.cache.get(&origin).await {
            trace!(%origin, "Favicon cache hit");
            self.observability.record_lookup(true);
            return Ok(non_empty(cached));
        }
        self.observability.record_lookup(false);

        let discovered = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%origin, "Favicon lookup cancelled");
                return Ok(None);
            }
            found = self.discover(&origin) => found,
        };

        match &discovered {
            Some(url) if !is_data_uri(url) => debug!(%origin, %url, "Favicon resolved"),
            Some(_) => debug!(%origin, "Favicon resolved to inline data URI"),
            None => debug!(%origin, "No favicon found"),
        }

        self.cache
            .insert(origin, discovered.clone().unwrap_or_default())
            .await;
        Ok(discovered)
    }

    /// Resolve and fetch the favicon bytes of an origin.
    ///
    /// Returns `Ok(None)` when nothing was found or when the icon's content
    /// type is not image-like.
    pub async fn resolve_asset(&self, origin: &str) -> FaviconResult<Option<FaviconAsset>> {
        self.resolve_asset_with_cancel(origin, &CancellationToken::new())
            .await
    }

    pub async fn resolve_asset_with_cancel(
        &self,
        origin: &str,
        cancel: &CancellationToken,
    ) -> FaviconResult<Option<FaviconAsset>> {
        let Some(url) = self.resolve_with_cancel(origin, cancel).await? else {
            return Ok(None);
        };

        if is_data_uri(&url) {
            return Ok(decode_inline(&url));
        }

        let asset = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            asset = self.download(&url) => asset,
        };
        Ok(asset)
    }

    /// Forget the cached outcome for an origin
    pub async fn invalidate(&self, origin: &str) -> FaviconResult<bool> {
        let origin = UrlUtils::normalize_origin(origin)?;
        Ok(self.cache.remove(&origin).await)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    pub async fn cache_stats(&self) -> FaviconCacheStats {
        self.cache.stats().await
    }

    /// Probe `/favicon.ico`, then each `<link>` candidate in document order.
    ///
    /// A candidate that resolves to the `/favicon.ico` URL already rejected
    /// is skipped instead of being probed a second time.
    async fn discover(&self, origin: &str) -> Option<String> {
        let ico = UrlUtils::favicon_ico(origin);
        if self.probe(&ico).await {
            return Some(ico);
        }

        let document = self.fetch_root_html(origin).await?;
        let hrefs = extract_icon_hrefs(&document);
        trace!(%origin, candidates = hrefs.len(), "Parsed icon links");

        for href in hrefs {
            let Some(candidate) = UrlUtils::resolve_href(origin, &href) else {
                continue;
            };
            if is_data_uri(&candidate) {
                return Some(candidate);
            }
            if candidate == ico {
                continue;
            }
            if self.probe(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }

    /// Status below 400 and a missing or image-like content type
    async fn probe(&self, url: &str) -> bool {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "Favicon probe failed");
                return false;
            }
        };

        if response.status().as_u16() >= 400 {
            trace!(%url, status = %response.status(), "Favicon probe rejected by status");
            return false;
        }

        let content_type = header_content_type(&response);
        let accepted = is_acceptable_probe(&content_type);
        if !accepted {
            trace!(%url, %content_type, "Favicon probe rejected by content type");
        }
        accepted
    }

    async fn fetch_root_html(&self, origin: &str) -> Option<String> {
        let url = UrlUtils::root_page(origin);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "Failed to fetch root document");
                return None;
            }
        };

        if response.status().as_u16() >= 400 {
            debug!(%url, status = %response.status(), "Root document unavailable");
            return None;
        }

        match read_capped(response, self.max_html_bytes).await {
            Ok(body) => Some(String::from_utf8_lossy(&body).into_owned()),
            Err(e) => {
                debug!(%url, error = %e, "Failed to read root document");
                None
            }
        }
    }

    async fn download(&self, url: &str) -> Option<FaviconAsset> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "Favicon download failed");
                return None;
            }
        };

        if response.status().as_u16() >= 400 {
            debug!(%url, status = %response.status(), "Favicon download rejected by status");
            return None;
        }

        let declared = header_content_type(&response);
        let data = match read_capped(response, self.max_icon_bytes).await {
            Ok(data) if !data.is_empty() => data,
            Ok(_) => {
                debug!(%url, "Favicon body is empty");
                return None;
            }
            Err(e) => {
                debug!(%url, error = %e, "Failed to read favicon body");
                return None;
            }
        };

        let content_type = if media_type(&declared).is_empty() {
            sniff_image_type(&data).map(str::to_string).unwrap_or_default()
        } else {
            declared
        };

        if !is_image_content_type(&content_type) {
            debug!(%url, %content_type, "Favicon content type rejected");
            return None;
        }

        Some(FaviconAsset::new(content_type, data))
    }
}

#[async_trait]
impl FaviconSource for FaviconResolver {
    async fn resolve_asset(&self, origin: &str) -> FaviconResult<Option<FaviconAsset>> {
        FaviconResolver::resolve_asset(self, origin).await
    }
}

fn header_content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn decode_inline(uri: &str) -> Option<FaviconAsset> {
    let Some(decoded) = DataUri::parse(uri) else {
        debug!("Inline favicon is not a decodable data URI");
        return None;
    };
    if !is_image_content_type(&decoded.media_type) {
        debug!(media_type = %decoded.media_type, "Inline favicon content type rejected");
        return None;
    }
    Some(FaviconAsset::new(decoded.media_type, decoded.data))
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inline_svg() {
        let asset = decode_inline("data:image/svg+xml;base64,PHN2Zy8+").unwrap();
        assert_eq!(asset.content_type, "image/svg+xml");
        assert_eq!(&asset.data[..], b"<svg/>");
    }

    #[test]
    fn test_decode_inline_rejects_non_image() {
        assert!(decode_inline("data:text/html,<p>hi</p>").is_none());
        assert!(decode_inline("data:image/png;base64,***").is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_invalid_origin_without_network() {
        let resolver = FaviconResolver::new(Client::new());
        assert!(resolver.resolve("ftp://example.com").await.is_err());
        assert_eq!(resolver.cache_stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_cancelled_lookup_is_not_cached() {
        let resolver = FaviconResolver::new(Client::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Cancellation is checked before any request is issued
        let result = resolver
            .resolve_with_cancel("http://192.0.2.1:9", &cancel)
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(resolver.cache_stats().await.entries, 0);
    }
}
