//! Error types and result handling for dexreader operations.
//!
//! Every fallible operation in the crate returns a [`Result<T>`], a type alias
//! for `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Network Errors**: connection issues, timeouts, TLS failures
//! - **API Errors**: non-success HTTP statuses reported by MangaDex
//! - **Parse Errors**: responses that decode but carry unusable data
//! - **Not Found**: missing manga, chapters, or reader positions
//! - **Rate Limiting**: the API answered `429`; reported, never retried
//! - **Config Errors**: invalid or unreadable client configuration
//!
//! # Examples
//!
//! ```rust
//! use dexreader::{Error, Result};
//!
//! fn describe(result: Result<Vec<String>>) -> String {
//!     match result {
//!         Ok(pages) => format!("{} pages", pages.len()),
//!         Err(Error::NotFound(what)) => format!("missing: {}", what),
//!         Err(Error::RateLimit { .. }) => "slow down".to_string(),
//!         Err(e) => format!("failed: {}", e),
//!     }
//! }
//! ```

use thiserror::Error;

/// Type alias for Results with dexreader errors.
///
/// ```rust
/// use dexreader::{Error, Result};
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Chapter hash is empty"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all dexreader operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from the HTTP client.
    ///
    /// Wraps errors from reqwest: connection timeouts, DNS resolution
    /// failures and TLS errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Data parsing and format errors.
    ///
    /// Used when a response decodes but the data cannot be used, such as an
    /// at-home server answer without a chapter hash.
    ///
    /// ```rust
    /// use dexreader::Error;
    ///
    /// let error = Error::parse("Base URL is empty");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// A non-success HTTP status returned by the API.
    ///
    /// # Fields
    ///
    /// * `status` - The HTTP status code
    /// * `message` - The request that failed, or the API's error detail
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    /// Resource not found errors.
    ///
    /// ```rust
    /// use dexreader::Error;
    ///
    /// let error = Error::not_found("Chapter at index 12");
    /// ```
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API rate-limited the request.
    ///
    /// `retry_after` carries the `Retry-After` header in seconds when the
    /// server sent one. The client surfaces this and does not retry.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimit { retry_after: Option<u64> },

    /// Invalid client configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// File system and IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization and deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL construction errors.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Creates a parse error with the given message.
    ///
    /// ```rust
    /// use dexreader::Error;
    ///
    /// let error = Error::parse(format!("Expected {} pages, found {}", 10, 5));
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates an API error for a non-success status.
    ///
    /// ```rust
    /// use dexreader::Error;
    ///
    /// let error = Error::api(503, "GET /manga");
    /// assert!(error.to_string().contains("503"));
    /// ```
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: msg.into(),
        }
    }

    /// Creates a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a rate limit error with optional retry-after time.
    pub fn rate_limit(retry_after: Option<u64>) -> Self {
        Error::RateLimit { retry_after }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
