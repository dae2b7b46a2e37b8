//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CORNERSHOP_API_BASE_URL` - Backend serving `/api/products` and
//!   `/api/newsletter` (default: `http://127.0.0.1:3000`)
//! - `CORNERSHOP_API_TOKEN` - Bearer token sent with backend requests
//! - `CORNERSHOP_STORAGE_DIR` - Directory backing local storage (default: `.cornershop`)
//! - `CORNERSHOP_CART_KEY` - Storage slot holding the cart (default: `cart`);
//!   letters, digits, `-`, `_` and `.`, not starting with `.`
//! - `CORNERSHOP_CATALOG_TTL_SECS` - How long a fetched catalog is reused (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::storage::validate_key;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_STORAGE_DIR: &str = ".cornershop";
const DEFAULT_CART_KEY: &str = "cart";
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
const MIN_API_TOKEN_LENGTH: usize = 16;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the storefront backend (always ends with `/`)
    pub api_base_url: Url,
    /// Optional bearer token for the backend
    pub api_token: Option<SecretString>,
    /// Directory backing local storage
    pub storage_dir: PathBuf,
    /// Storage slot holding the serialized cart
    pub cart_key: String,
    /// How long a fetched catalog is reused before refetching
    pub catalog_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("storage_dir", &self.storage_dir)
            .field("cart_key", &self.cart_key)
            .field("catalog_ttl", &self.catalog_ttl)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl StorefrontConfig {
    /// Configuration for a backend at `api_base_url` with every other setting
    /// at its default.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url: with_trailing_slash(api_base_url),
            api_token: None,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            cart_key: DEFAULT_CART_KEY.to_string(),
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = lookup("CORNERSHOP_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&base).map_err(|e| {
            ConfigError::InvalidEnvVar("CORNERSHOP_API_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "CORNERSHOP_API_BASE_URL".to_string(),
                format!("unsupported scheme '{}'", api_base_url.scheme()),
            ));
        }

        let api_token = match lookup("CORNERSHOP_API_TOKEN") {
            Some(token) => {
                validate_api_token(&token, "CORNERSHOP_API_TOKEN")?;
                Some(SecretString::from(token))
            }
            None => None,
        };

        let storage_dir = lookup("CORNERSHOP_STORAGE_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);

        let cart_key = lookup("CORNERSHOP_CART_KEY").unwrap_or_else(|| DEFAULT_CART_KEY.to_string());
        validate_key(&cart_key).map_err(|e| {
            ConfigError::InvalidEnvVar("CORNERSHOP_CART_KEY".to_string(), e.to_string())
        })?;

        let catalog_ttl = match lookup("CORNERSHOP_CATALOG_TTL_SECS") {
            Some(secs) => secs.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::InvalidEnvVar("CORNERSHOP_CATALOG_TTL_SECS".to_string(), e.to_string())
            })?,
            None => Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
        };

        Ok(Self {
            api_base_url: with_trailing_slash(api_base_url),
            api_token,
            storage_dir,
            cart_key,
            catalog_ttl,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Endpoint returning the product catalog.
    #[must_use]
    pub fn products_url(&self) -> Url {
        self.endpoint("api/products")
    }

    /// Endpoint accepting newsletter subscriptions.
    #[must_use]
    pub fn newsletter_url(&self) -> Url {
        self.endpoint("api/newsletter")
    }

    /// The bearer token value, if configured.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.api_token.as_ref().map(ExposeSecret::expose_secret)
    }

    fn endpoint(&self, path: &str) -> Url {
        // `path` is a relative literal, so joining onto an http(s) base cannot fail.
        self.api_base_url
            .join(path)
            .unwrap_or_else(|_| self.api_base_url.clone())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Ensure relative joins append to the base path instead of replacing its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Validate that an API token is not a placeholder and is long enough.
fn validate_api_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if token.len() < MIN_API_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_API_TOKEN_LENGTH} characters (got {})",
                token.len()
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.cart_key, "cart");
        assert_eq!(config.storage_dir, PathBuf::from(".cornershop"));
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
        assert!(config.api_token.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let config = load(&[("CORNERSHOP_API_BASE_URL", "https://shop.test/store")]).unwrap();
        assert_eq!(
            config.products_url().as_str(),
            "https://shop.test/store/api/products"
        );
        assert_eq!(
            config.newsletter_url().as_str(),
            "https://shop.test/store/api/newsletter"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("CORNERSHOP_API_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CORNERSHOP_API_BASE_URL"));

        let err = load(&[("CORNERSHOP_API_BASE_URL", "ftp://shop.test")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_ttl() {
        let err = load(&[("CORNERSHOP_CATALOG_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_empty_cart_key_rejected() {
        assert!(load(&[("CORNERSHOP_CART_KEY", "  ")]).is_err());
        assert!(load(&[("CORNERSHOP_CART_KEY", "")]).is_err());
    }

    #[test]
    fn test_unstorable_cart_key_rejected() {
        for key in ["my cart", ".hidden", "../cart"] {
            let err = load(&[("CORNERSHOP_CART_KEY", key)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref var, _) if var == "CORNERSHOP_CART_KEY"),
                "{key}"
            );
        }
        assert_eq!(load(&[("CORNERSHOP_CART_KEY", "cart-v2")]).unwrap().cart_key, "cart-v2");
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = load(&[("CORNERSHOP_API_TOKEN", "your-api-token-goes-here")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_short_token_rejected() {
        let err = load(&[("CORNERSHOP_API_TOKEN", "k3y")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("CORNERSHOP_API_TOKEN", "q8Zr2LmW7vNx4TkP9sYb")]).unwrap();
        assert_eq!(config.bearer_token(), Some("q8Zr2LmW7vNx4TkP9sYb"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("q8Zr2LmW7vNx4TkP9sYb"));
    }
}
