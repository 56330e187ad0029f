// Server-side settings for the tool catalogue

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

/// Settings shared by the stdio and HTTP front ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// How long a successful tool result is reused. Zero disables caching.
    pub cache_ttl: Duration,
    /// Upper bound on cached results.
    pub cache_max_entries: usize,
    /// Where downloaded files are stored.
    pub download_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            download_dir: default_download_dir(),
        }
    }
}

impl ServerSettings {
    /// Read `ZENODO_CACHE_TTL_SECS`, `ZENODO_CACHE_MAX_ENTRIES` and
    /// `ZENODO_DOWNLOAD_DIR`, keeping defaults for unset or unparseable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(ttl) = parse_var::<u64, _>(&lookup, "ZENODO_CACHE_TTL_SECS") {
            settings.cache_ttl = Duration::from_secs(ttl);
        }
        if let Some(max) = parse_var::<usize, _>(&lookup, "ZENODO_CACHE_MAX_ENTRIES") {
            settings.cache_max_entries = max;
        }
        if let Some(dir) = lookup("ZENODO_DOWNLOAD_DIR").filter(|d| !d.trim().is_empty()) {
            settings.download_dir = PathBuf::from(dir);
        }

        settings
    }

    pub fn cache_enabled(&self) -> bool {
        !self.cache_ttl.is_zero() && self.cache_max_entries > 0
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

/// `~/.zenodo_cache`, or `.zenodo_cache` in the working directory without `$HOME`.
pub fn default_download_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(".zenodo_cache"),
        _ => PathBuf::from(".zenodo_cache"),
    }
}
