use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use zenodo_mcp::settings::{default_download_dir, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS};
use zenodo_mcp::{build_registry, CachedDispatcher, ServerSettings};
use zenodo_sdk::ZenodoClient;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Overrides `sandbox` when set.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Falls back to `ZENODO_API_TOKEN` when absent.
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default)]
    pub sandbox: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            sandbox: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_max_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::info!("Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read configuration file")?;
        toml::from_str(&content).context("Failed to parse configuration file")
    }

    pub fn settings(&self) -> ServerSettings {
        ServerSettings {
            cache_ttl: Duration::from_secs(self.cache.ttl_secs),
            cache_max_entries: self.cache.max_entries,
            download_dir: self.download.dir.clone().unwrap_or_else(default_download_dir),
        }
    }

    pub fn client(&self) -> Result<ZenodoClient> {
        let mut builder = ZenodoClient::builder()
            .sandbox(self.upstream.sandbox)
            .timeout(Duration::from_secs(self.upstream.timeout_secs));

        if let Some(url) = &self.upstream.base_url {
            builder = builder.base_url(url.clone());
        }
        let token = self
            .upstream
            .api_token
            .clone()
            .or_else(|| std::env::var("ZENODO_API_TOKEN").ok())
            .filter(|t| !t.trim().is_empty());
        if let Some(token) = token {
            builder = builder.api_token(token);
        }

        builder.build().context("Failed to create Zenodo client")
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: CachedDispatcher,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = config.client()?;
        Self::with_client(client, &config.settings())
    }

    pub fn with_client(client: ZenodoClient, settings: &ServerSettings) -> Result<Self> {
        let registry = build_registry(client, settings).context("Failed to register tools")?;
        tracing::info!("Registered {} tools", registry.len());

        Ok(Self {
            dispatcher: CachedDispatcher::new(Arc::new(registry), settings),
        })
    }
}
