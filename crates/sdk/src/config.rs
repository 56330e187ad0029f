//! Configuration types for the Zenodo SDK.

use crate::error::{ZenodoError, ZenodoResult};
use std::time::Duration;
use url::Url;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://zenodo.org/api/";
/// Sandbox API root, selected by `ZENODO_SANDBOX=true`.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.zenodo.org/api/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Zenodo client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Zenodo REST API. Always ends with `/`.
    pub base_url: Url,
    /// Personal access token, sent as a bearer token.
    pub api_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry_config: RetryConfig,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_config: RetryConfig::default(),
            user_agent: format!("zenodo-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Build a configuration from `ZENODO_*` environment variables.
    pub fn from_env() -> ZenodoResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ZenodoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sandbox = lookup("ZENODO_SANDBOX")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let base_url = match lookup("ZENODO_API_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => url,
            None if sandbox => SANDBOX_BASE_URL.to_string(),
            None => DEFAULT_BASE_URL.to_string(),
        };

        let mut config = Self::new(Url::parse(base_url.trim())?);
        config.api_token = lookup("ZENODO_API_TOKEN").filter(|t| !t.trim().is_empty());

        if let Some(raw) = lookup("ZENODO_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ZenodoError::Config(format!("ZENODO_TIMEOUT_SECS must be an integer, got {raw:?}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// HTTP status codes to retry on.
    pub retry_on_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            retry_on_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        std::cmp::min(backoff, self.max_backoff)
    }

    /// Check if a status code should trigger a retry.
    /// Authentication failures are never retried.
    pub fn should_retry_status(&self, status: u16) -> bool {
        !matches!(status, 401 | 403) && self.retry_on_status_codes.contains(&status)
    }
}
