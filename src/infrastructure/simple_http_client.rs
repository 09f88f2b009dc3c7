//! HTTP page fetcher for product sources
//!
//! Resolves a URL into raw response text. Requests are issued one at a time by
//! the orchestrator; there is no retry or rate limiting, and a failed request
//! is fatal only to the adapter that issued it.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Network or HTTP level failure while fetching a page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Invalid request header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Capability consumed by source adapters: turn a URL into response text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body as text.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// POST a JSON `body` to `url` with extra `headers`; returns the response text.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<String, FetchError>;
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// User agent sent on plain page fetches
    pub user_agent: String,
    /// Request timeout in seconds; `None` waits indefinitely
    pub timeout_seconds: Option<u64>,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36".to_string(),
            timeout_seconds: None,
            follow_redirects: true,
        }
    }
}

/// reqwest-backed page fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let mut builder = ClientBuilder::new()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            });
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    async fn read_body(url: &str, response: reqwest::Response) -> Result<String, FetchError> {
        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!("Successfully fetched: {} ({} chars)", url, text.len());
        Ok(text)
    }
}

/// Build a header map from name/value pairs, rejecting malformed entries.
pub fn build_header_map(headers: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
            name: name.clone(),
            message: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Self::read_body(url, response).await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<String, FetchError> {
        info!("🌐 HTTP POST: {}", url);
        let response = self
            .client
            .post(url)
            .headers(build_header_map(headers)?)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Self::read_body(url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::with_config(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = HttpClientConfig {
            user_agent: "Test Agent".to_string(),
            timeout_seconds: Some(10),
            follow_redirects: false,
        };

        let client = HttpClient::with_config(config.clone()).unwrap();
        assert_eq!(client.config(), &config);
    }

    #[test]
    fn test_default_has_no_timeout() {
        assert_eq!(HttpClientConfig::default().timeout_seconds, None);
    }

    #[test]
    fn test_header_map_accepts_browser_headers() {
        let headers = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("sec-ch-ua-mobile".to_string(), "?0".to_string()),
        ];
        let map = build_header_map(&headers).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["content-type"], "application/json");
    }

    #[test]
    fn test_header_map_rejects_invalid_name() {
        let headers = vec![("bad header".to_string(), "x".to_string())];
        assert!(matches!(
            build_header_map(&headers),
            Err(FetchError::InvalidHeader { .. })
        ));
    }
}
