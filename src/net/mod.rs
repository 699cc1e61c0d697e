//! HTTP plumbing shared by the API client.
//!
//! - **Shared Client**: a lazily built, pooled reqwest client for the default
//!   configuration
//! - **Status Mapping**: non-success responses become typed [`Error`]s, with
//!   the API's own error detail when the body carries one
//! - **JSON Decoding**: typed GET helpers on top of serde
//!
//! There is no retry or throttling layer: a `429` is reported as
//! [`Error::RateLimit`] and left to the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dexreader::net::HttpClient;
//!
//! # async fn example() -> dexreader::Result<()> {
//! let client = HttpClient::new();
//! let url = url::Url::parse("https://api.mangadex.org/ping")?;
//! let body = client.get(&url).await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Global HTTP client built from [`ClientConfig::default`].
///
/// - 30-second timeout
/// - Connection pooling (10 idle connections per host)
/// - Compression support (gzip, brotli)
static CLIENT: Lazy<Client> = Lazy::new(|| {
    let config = ClientConfig::default();
    build_client(&config).expect("Failed to build HTTP client")
});

fn build_client(config: &ClientConfig) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Error body MangaDex sends alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    title: Option<String>,
    detail: Option<String>,
}

/// Maps a non-success response to an [`Error`].
///
/// `404` becomes [`Error::NotFound`], `429` becomes [`Error::RateLimit`],
/// everything else becomes [`Error::Api`] carrying the first error detail of
/// the body, or the request URL when the body has none.
pub fn status_error(status: StatusCode, retry_after: Option<u64>, url: &Url, body: &[u8]) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Error::rate_limit(retry_after);
    }

    let detail = serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next())
        .and_then(|e| e.detail.or(e.title));

    if status == StatusCode::NOT_FOUND {
        return Error::not_found(detail.unwrap_or_else(|| url.path().to_string()));
    }

    Error::api(
        status.as_u16(),
        detail.unwrap_or_else(|| format!("GET {}", url.path())),
    )
}

/// HTTP client wrapper returning typed errors.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client on the shared default connection pool.
    pub fn new() -> Self {
        Self {
            client: CLIENT.clone(),
        }
    }

    /// Creates a client with the timeout and User-Agent of `config`.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - If the TLS backend cannot be initialized
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }

    /// Performs a GET request and returns the body.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - For transport failures
    /// * [`Error::NotFound`], [`Error::RateLimit`], [`Error::Api`] - For
    ///   non-success statuses, see [`status_error`]
    pub async fn get(&self, url: &Url) -> Result<Bytes> {
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.bytes().await.unwrap_or_default();

        let error = status_error(status, retry_after, url, &body);
        tracing::warn!(url = %url, status = status.as_u16(), "request failed: {}", error);
        Err(error)
    }

    /// Performs a GET request and deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// * All errors from [`get()`](HttpClient::get)
    /// * [`Error::Json`] - If the body does not match `T`
    pub async fn get_json<T>(&self, url: &Url) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.get(url).await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
