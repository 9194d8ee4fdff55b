//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KIRANA_API_BASE_URL` - Base URL of the storefront backend
//!
//! ## Optional
//! - `KIRANA_API_KEY` - API key sent as `X-Api-Key` on order/redemption
//!   mutations (catalog reads are unauthenticated)
//! - `KIRANA_DATA_DIR` - Directory for the on-device key-value store
//!   (default: ./kirana-data)
//! - `KIRANA_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `KIRANA_CACHE_TTL_SECS` - Catalog cache TTL in seconds (default: 300)
//! - `KIRANA_CACHE_CAPACITY` - Max cached catalog responses (default: 1000)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront backend. Always ends with a trailing
    /// slash so endpoint paths join underneath it.
    pub api_base_url: Url,
    /// Optional API key for order/redemption mutations.
    pub api_key: Option<SecretString>,
    /// Directory holding the on-device key-value store.
    pub data_dir: PathBuf,
    /// HTTP request timeout.
    pub http_timeout: Duration,
    /// Time-to-live for cached catalog responses.
    pub cache_ttl: Duration,
    /// Maximum number of cached catalog responses.
    pub cache_capacity: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("data_dir", &self.data_dir)
            .field("http_timeout", &self.http_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url("KIRANA_API_BASE_URL", &get_required_env("KIRANA_API_BASE_URL")?)?;
        let api_key = get_optional_env("KIRANA_API_KEY").map(SecretString::from);
        let data_dir = PathBuf::from(get_env_or_default("KIRANA_DATA_DIR", "./kirana-data"));
        let http_timeout = Duration::from_secs(parse_env_u64("KIRANA_HTTP_TIMEOUT_SECS", 10)?);
        let cache_ttl = Duration::from_secs(parse_env_u64("KIRANA_CACHE_TTL_SECS", 300)?);
        let cache_capacity = parse_env_u64("KIRANA_CACHE_CAPACITY", 1000)?;

        Ok(Self {
            api_base_url,
            api_key,
            data_dir,
            http_timeout,
            cache_ttl,
            cache_capacity,
        })
    }

    /// Build a configuration with defaults around an explicit base URL.
    ///
    /// Used by tests and embedders that configure programmatically instead
    /// of via the environment.
    #[must_use]
    pub fn with_base_url(api_base_url: Url) -> Self {
        Self {
            api_base_url: ensure_trailing_slash(api_base_url),
            api_key: None,
            data_dir: PathBuf::from("./kirana-data"),
            http_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a numeric environment variable with a default.
fn parse_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse and normalize the backend base URL.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL cannot serve as a base".to_string(),
        ));
    }
    Ok(ensure_trailing_slash(url))
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
