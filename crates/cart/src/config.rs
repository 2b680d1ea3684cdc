//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_BASE_URL` - Base URL of the catalog service (serves `products/{id}` and `stock/{id}`)
//!
//! ## Optional
//! - `CATALOG_API_TOKEN` - Bearer token sent with catalog requests
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `CATALOG_PRODUCT_CACHE_TTL_SECS` - Product detail cache TTL (default: 300)
//! - `CART_STORAGE_KEY` - Snapshot slot key (default: `@RocketShoes:cart`)
//! - `CART_STORAGE_DIR` - Directory for file-backed snapshots (default: `.rocketshoes`)
//! - `CART_LOCALE` - Notification language, `en` or `pt-BR` (default: en)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::messages::Locale;

/// Snapshot slot key the storefront has always used.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Default directory for [`crate::storage::FileStorage`].
pub const DEFAULT_STORAGE_DIR: &str = ".rocketshoes";

/// Product details are cached for five minutes by default.
pub const DEFAULT_PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog service configuration
    pub catalog: CatalogConfig,
    /// Key of the snapshot slot
    pub storage_key: String,
    /// Directory holding file-backed snapshots
    pub storage_dir: PathBuf,
    /// Language for shopper notifications
    pub locale: Locale,
}

/// Catalog service configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL, always ending in `/` so resource paths join beneath it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Optional per-request timeout
    pub timeout: Option<Duration>,
    /// How long fetched product details stay cached
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl CartConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let catalog = CatalogConfig::from_lookup(&lookup)?;
        let storage_key =
            get_or_default(&lookup, "CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let storage_dir =
            PathBuf::from(get_or_default(&lookup, "CART_STORAGE_DIR", DEFAULT_STORAGE_DIR));
        let locale = get_or_default(&lookup, "CART_LOCALE", "en")
            .parse::<Locale>()
            .map_err(|e| ConfigError::InvalidEnvVar("CART_LOCALE".to_string(), e.to_string()))?;

        Ok(Self {
            catalog,
            storage_key,
            storage_dir,
            locale,
        })
    }
}

impl CatalogConfig {
    /// Configuration with default timeout and cache settings.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_token: None,
            timeout: None,
            product_cache_ttl: DEFAULT_PRODUCT_CACHE_TTL,
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = get_required(lookup, "CATALOG_BASE_URL")?;
        let base_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), e))?;

        let api_token = lookup("CATALOG_API_TOKEN")
            .filter(|token| !token.is_empty())
            .map(SecretString::from);

        let timeout = get_optional_secs(lookup, "CATALOG_TIMEOUT_SECS")?;
        let product_cache_ttl = get_optional_secs(lookup, "CATALOG_PRODUCT_CACHE_TTL_SECS")?
            .unwrap_or(DEFAULT_PRODUCT_CACHE_TTL);

        Ok(Self {
            base_url,
            api_token,
            timeout,
            product_cache_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Get an optional duration given in whole seconds.
fn get_optional_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, ConfigError> {
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Parse the catalog base URL, requiring http(s).
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(with_trailing_slash(url))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
