//! Client configuration.
//!
//! [`ClientConfig`] holds the endpoints and request sizes used by
//! [`MangaDexClient`](crate::api::MangaDexClient). The defaults match the
//! public MangaDex deployment; any field can be overridden through the
//! generated [`ClientConfigBuilder`] or a JSON file.
//!
//! # Examples
//!
//! ```rust
//! use dexreader::config::{ClientConfig, ClientConfigBuilder};
//!
//! let config = ClientConfigBuilder::default()
//!     .chapter_page_size(50usize)
//!     .translated_languages(vec!["en".to_string(), "fr".to_string()])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.chapter_page_size, 50);
//! assert_eq!(config.api_base, ClientConfig::default().api_base);
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.mangadex.org";
pub const DEFAULT_UPLOADS_BASE: &str = "https://uploads.mangadex.org";

/// Largest `limit` the collection endpoints accept.
pub const MAX_LIMIT: usize = 100;

/// Endpoints, limits and filters for talking to MangaDex.
///
/// Missing fields in a JSON document fall back to their defaults, so a
/// config file only needs the values it changes:
///
/// ```rust
/// use dexreader::config::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{ "search_limit": 5 }"#).unwrap();
/// assert_eq!(config.search_limit, 5);
/// assert_eq!(config.popular_limit, 51);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the REST API, without a trailing slash
    pub api_base: String,

    /// Host serving cover art
    pub uploads_base: String,

    /// User-Agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Size of the popular list on the home feed
    pub popular_limit: usize,

    /// Number of results for a title search
    pub search_limit: usize,

    /// Number of recently updated chapters scanned for the home feed
    pub updated_limit: usize,

    /// Chapters requested per page on the details view
    pub chapter_page_size: usize,

    /// Languages a chapter list is restricted to
    pub translated_languages: Vec<String>,

    /// Cover thumbnail width; `None` links the original file
    pub cover_size: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            uploads_base: DEFAULT_UPLOADS_BASE.to_string(),
            user_agent: format!("dexreader/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            popular_limit: 51,
            search_limit: 20,
            updated_limit: 30,
            chapter_page_size: 100,
            translated_languages: vec!["en".to_string()],
            cover_size: Some(512),
        }
    }
}

impl ClientConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`] - If the file cannot be read
    /// * [`Error::Json`] - If the file is not valid JSON
    /// * [`Error::Config`] - If a value is out of range
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded client config");
        Ok(config)
    }

    /// Checks that the timeout and limits are usable and the base URLs parse.
    ///
    /// Every limit must lie in `1..=MAX_LIMIT`; `updated_limit` also bounds
    /// the follow-up batch of manga ids, so it shares the same cap.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }

        for (name, value) in [
            ("popular_limit", self.popular_limit),
            ("search_limit", self.search_limit),
            ("updated_limit", self.updated_limit),
            ("chapter_page_size", self.chapter_page_size),
        ] {
            if value == 0 || value > MAX_LIMIT {
                return Err(Error::config(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_LIMIT, value
                )));
            }
        }

        url::Url::parse(&self.api_base)
            .map_err(|e| Error::config(format!("invalid api_base '{}': {}", self.api_base, e)))?;
        url::Url::parse(&self.uploads_base).map_err(|e| {
            Error::config(format!("invalid uploads_base '{}': {}", self.uploads_base, e))
        })?;

        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ClientConfigBuilder {
    // Unset fields take their defaults, so validate the config as it would be built
    fn validate(&self) -> std::result::Result<(), String> {
        let defaults = ClientConfig::default();
        let config = ClientConfig {
            api_base: self.api_base.clone().unwrap_or(defaults.api_base),
            uploads_base: self.uploads_base.clone().unwrap_or(defaults.uploads_base),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            popular_limit: self.popular_limit.unwrap_or(defaults.popular_limit),
            search_limit: self.search_limit.unwrap_or(defaults.search_limit),
            updated_limit: self.updated_limit.unwrap_or(defaults.updated_limit),
            chapter_page_size: self.chapter_page_size.unwrap_or(defaults.chapter_page_size),
            translated_languages: self
                .translated_languages
                .clone()
                .unwrap_or(defaults.translated_languages),
            cover_size: self.cover_size.unwrap_or(defaults.cover_size),
        };
        config.validate().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_public_api() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, "https://api.mangadex.org");
        assert_eq!(config.popular_limit, 51);
        assert_eq!(config.search_limit, 20);
        assert_eq!(config.updated_limit, 30);
        assert_eq!(config.chapter_page_size, 100);
        assert_eq!(config.translated_languages, vec!["en".to_string()]);
        assert_eq!(config.cover_size, Some(512));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_zero_page_size() {
        let result = ClientConfigBuilder::default()
            .chapter_page_size(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_caps_limits() {
        let config = ClientConfig {
            updated_limit: MAX_LIMIT + 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(ref msg)) if msg.contains("updated_limit")));

        let config = ClientConfig {
            chapter_page_size: MAX_LIMIT,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_runs_full_validation() {
        for builder in [
            ClientConfigBuilder::default().popular_limit(0usize).clone(),
            ClientConfigBuilder::default().updated_limit(101usize).clone(),
            ClientConfigBuilder::default().timeout_secs(0u64).clone(),
            ClientConfigBuilder::default().api_base("not a url").clone(),
        ] {
            assert!(builder.build().is_err());
        }
        assert!(ClientConfigBuilder::default().updated_limit(100usize).build().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base() {
        let config = ClientConfig {
            api_base: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("dexreader-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "chapter_page_size": 25, "cover_size": null }"#).unwrap();

        let config = ClientConfig::from_json_file(&path).unwrap();
        assert_eq!(config.chapter_page_size, 25);
        assert_eq!(config.cover_size, None);
        assert_eq!(config.search_limit, 20);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = ClientConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
