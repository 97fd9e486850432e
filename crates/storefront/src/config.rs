//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `WEARVIEW_HOST` - Bind address (default: 127.0.0.1)
//! - `WEARVIEW_PORT` - Listen port (default: 3000)
//! - `WEARVIEW_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `WEARVIEW_DATA_DIR` - Directory holding persisted carts (default: data/carts)
//! - `WEARVIEW_CHECKOUT_DELAY_MS` - Simulated payment processing time (default: 2000)
//! - `WEARVIEW_TRY_ON_DELAY_MS` - Simulated try-on processing time (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_DELAY_MS: &str = "2000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory holding one sub-directory of persisted state per client
    pub data_dir: PathBuf,
    /// How long the simulated payment takes
    pub checkout_delay: Duration,
    /// How long the simulated try-on takes
    pub try_on_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
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

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = parse_var("WEARVIEW_HOST", &get_or("WEARVIEW_HOST", "127.0.0.1"))?;
        let port = parse_var("WEARVIEW_PORT", &get_or("WEARVIEW_PORT", "3000"))?;
        let base_url = get_or("WEARVIEW_BASE_URL", "http://localhost:3000");
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("WEARVIEW_BASE_URL".to_string(), e.to_string())
        })?;
        let data_dir = PathBuf::from(get_or("WEARVIEW_DATA_DIR", "data/carts"));
        let checkout_delay = Duration::from_millis(parse_var(
            "WEARVIEW_CHECKOUT_DELAY_MS",
            &get_or("WEARVIEW_CHECKOUT_DELAY_MS", DEFAULT_DELAY_MS),
        )?);
        let try_on_delay = Duration::from_millis(parse_var(
            "WEARVIEW_TRY_ON_DELAY_MS",
            &get_or("WEARVIEW_TRY_ON_DELAY_MS", DEFAULT_DELAY_MS),
        )?);

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            checkout_delay,
            try_on_delay,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration suitable for tests: no delays, the given data directory.
    #[must_use]
    pub fn for_tests(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            data_dir: data_dir.into(),
            checkout_delay: Duration::ZERO,
            try_on_delay: Duration::ZERO,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable's value, naming the variable in the error.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.data_dir, PathBuf::from("data/carts"));
        assert_eq!(config.checkout_delay, Duration::from_secs(2));
        assert_eq!(config.try_on_delay, Duration::from_secs(2));
        assert!(!config.is_secure());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("WEARVIEW_HOST", "0.0.0.0"),
            ("WEARVIEW_PORT", "8080"),
            ("WEARVIEW_BASE_URL", "https://wearview.example"),
            ("WEARVIEW_DATA_DIR", "/var/lib/wearview"),
            ("WEARVIEW_CHECKOUT_DELAY_MS", "0"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.is_secure());
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/wearview"));
        assert_eq!(config.checkout_delay, Duration::ZERO);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("WEARVIEW_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "WEARVIEW_PORT"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("WEARVIEW_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "WEARVIEW_BASE_URL"));
    }

    #[test]
    fn test_empty_sentry_dsn_is_disabled() {
        let config = load(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
