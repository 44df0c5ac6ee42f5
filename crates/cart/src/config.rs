//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CATALOG_API_URL` - Base URL of the catalog API (default: `http://localhost:3333`)
//! - `CATALOG_API_TOKEN` - Bearer token sent with catalog requests
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout in seconds (default: none)
//! - `CATALOG_CACHE_TTL_SECS` - Product metadata cache TTL, `0` disables (default: 300)
//! - `CART_STORE_PATH` - JSON file backing the key-value store (default: `.rocketshoes/storage.json`)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default: `@RocketShoes:cart`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default catalog API base URL.
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:3333";

/// Default key the cart is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Default path of the JSON store file.
pub const DEFAULT_STORE_PATH: &str = ".rocketshoes/storage.json";

const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Path of the JSON file backing the key-value store
    pub store_path: PathBuf,
    /// Key the serialized cart is stored under
    pub storage_key: String,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL; `products/{id}` and `stock/{id}` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Optional per-request timeout
    pub timeout: Option<Duration>,
    /// Product metadata cache TTL; `None` disables caching
    pub cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl CatalogConfig {
    /// Catalog configuration pointing at `base_url` with defaults otherwise.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_token: None,
            timeout: None,
            cache_ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
        }
    }

    /// Point the client at a different catalog.
    pub fn set_base_url(&mut self, base_url: Url) {
        self.base_url = with_trailing_slash(base_url);
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = get("CATALOG_API_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        let base_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_API_URL".to_string(), e))?;

        let timeout = get("CATALOG_TIMEOUT_SECS")
            .map(|v| parse_secs("CATALOG_TIMEOUT_SECS", &v))
            .transpose()?
            .filter(|d| !d.is_zero());

        let cache_ttl = match get("CATALOG_CACHE_TTL_SECS") {
            Some(v) => Some(parse_secs("CATALOG_CACHE_TTL_SECS", &v)?),
            None => Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
        }
        .filter(|d| !d.is_zero());

        let api_token = get("CATALOG_API_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);

        let store_path = get("CART_STORE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from);
        let storage_key = get("CART_STORAGE_KEY")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            catalog: CatalogConfig {
                base_url,
                api_token,
                timeout,
                cache_ttl,
            },
            store_path,
            storage_key,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a catalog base URL.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("URL cannot be used as a base".to_string());
    }
    Ok(with_trailing_slash(url))
}

/// Relative joins drop the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
