//! HTTP GET for pages and their assets.
//!
//! - `Fetcher` is the network capability the coordinator consumes
//! - `FetchClient` implements it with reqwest: cookies kept for the
//!   client's lifetime (same-origin credentials), redirects followed up to a
//!   limit, body size capped, body decoded using the response charset
//!
//! A non-success status is a `FetchError` carrying the status. There are
//! no retries.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{Client, StatusCode, Url, header};

use preture_core::{AppConfig, Error, FetchError};

pub use self::url::{UrlError, canonicalize, resolve, same_host};

/// Network capability: fetch a URL and decode its body as text.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "preture/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
}

impl FetchResponse {
    /// Decode the body using the `charset` from Content-Type, falling back
    /// to UTF-8. Invalid sequences are replaced.
    pub fn text(&self) -> String {
        let encoding = self
            .content_type
            .as_deref()
            .and_then(charset_label)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (decoded, _, _) = encoding.decode(&self.bytes);
        decoded.into_owned()
    }
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|part| {
        let (name, value) = part.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let label = value.trim().trim_matches('"').trim_matches('\'');
        (!label.is_empty()).then_some(label)
    })
}

/// reqwest-backed `Fetcher`.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .cookie_store(true)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Fetch(FetchError::transport("", format!("failed to build HTTP client: {e}"))))?;

        Ok(Self { http, config })
    }

    /// GET `url`, returning raw bytes and metadata.
    ///
    /// Fails on transport errors, non-success status, or a body larger than
    /// `max_bytes`.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url.as_str(), status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(url, len as usize));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(self.too_large(url, bytes.len()));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(%url, %final_url, fetch_ms, bytes = bytes.len(), "fetched");

        Ok(FetchResponse { url: url.clone(), final_url, status, content_type, bytes })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn too_large(&self, url: &Url, len: usize) -> FetchError {
        FetchError::transport(url.as_str(), format!("{len} bytes exceeds {}", self.config.max_bytes))
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        self.fetch(url).await.map(|response| response.text())
    }
}
