//! Main client for the Zenodo SDK.

use crate::api::RecordsApi;
use crate::config::{ClientConfig, RetryConfig, DEFAULT_BASE_URL, SANDBOX_BASE_URL};
use crate::error::{ZenodoError, ZenodoResult};
use crate::transport::HttpTransport;
use crate::upstream::Upstream;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for interacting with the Zenodo API.
///
/// Cloning is cheap; every clone shares the same underlying transport.
#[derive(Clone)]
pub struct ZenodoClient {
    upstream: Arc<dyn Upstream>,
}

impl ZenodoClient {
    /// Create a new client builder.
    pub fn builder() -> ZenodoClientBuilder {
        ZenodoClientBuilder::new()
    }

    /// Wrap an existing upstream, such as an in-memory fake.
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }

    /// Create an HTTP-backed client from configuration.
    pub fn from_config(config: ClientConfig) -> ZenodoResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config)?;

        Ok(Self::new(Arc::new(http)))
    }

    /// Create an HTTP-backed client from `ZENODO_*` environment variables.
    pub fn from_env() -> ZenodoResult<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// The upstream collaborator requests go through.
    pub fn upstream(&self) -> &Arc<dyn Upstream> {
        &self.upstream
    }

    /// Get the records API.
    pub fn records(&self) -> RecordsApi<'_> {
        RecordsApi::new(self)
    }
}

impl std::fmt::Debug for ZenodoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenodoClient").finish_non_exhaustive()
    }
}

/// Builder for creating a ZenodoClient.
pub struct ZenodoClientBuilder {
    base_url: Option<String>,
    api_token: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
    sandbox: bool,
}

impl ZenodoClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
            sandbox: false,
        }
    }

    /// Set the base URL of the API. Overrides `sandbox`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the personal access token.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Use the sandbox instance instead of production.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the resolved configuration without creating a transport.
    pub fn build_config(self) -> ZenodoResult<ClientConfig> {
        let base_url_str = match self.base_url {
            Some(url) => url,
            None if self.sandbox => SANDBOX_BASE_URL.to_string(),
            None => DEFAULT_BASE_URL.to_string(),
        };
        if self.timeout.is_zero() {
            return Err(ZenodoError::Config("timeout must be greater than zero".to_string()));
        }

        let mut config = ClientConfig::new(Url::parse(&base_url_str)?);
        config.api_token = self.api_token;
        config.timeout = self.timeout;
        config.retry_config = self.retry_config;
        Ok(config)
    }

    /// Build the client.
    pub fn build(self) -> ZenodoResult<ZenodoClient> {
        ZenodoClient::from_config(self.build_config()?)
    }
}

impl Default for ZenodoClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
