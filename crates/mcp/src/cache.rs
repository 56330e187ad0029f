// TTL response cache in front of the tool registry

use crate::error::ToolResult;
use crate::settings::ServerSettings;
use crate::tools::ToolRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry {
    stored_at: Instant,
    value: Value,
}

/// Maps `tool name + canonical arguments` to a recent successful result.
///
/// Entries expire after `ttl`. When the cache is full the oldest entry is
/// evicted to make room.
pub struct ResponseCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn key(tool: &str, arguments: &Value) -> String {
        let mut key = String::from(tool);
        key.push(':');
        write_canonical(arguments, &mut key);
        key
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, value: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Object keys sorted at every level so equal arguments share a key.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Dispatches through the registry, reusing cached successes when enabled.
#[derive(Clone)]
pub struct CachedDispatcher {
    registry: Arc<ToolRegistry>,
    cache: Option<Arc<ResponseCache>>,
}

impl CachedDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, settings: &ServerSettings) -> Self {
        let cache = settings
            .cache_enabled()
            .then(|| Arc::new(ResponseCache::new(settings.cache_ttl, settings.cache_max_entries)));
        Self { registry, cache }
    }

    pub fn uncached(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            cache: None,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub async fn dispatch(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let cache = match &self.cache {
            Some(cache) if self.registry.is_cacheable(name) => cache,
            _ => return self.registry.dispatch(name, arguments).await,
        };

        let key = ResponseCache::key(name, &arguments);
        if let Some(hit) = cache.get(&key) {
            debug!(tool = %name, "Cache hit");
            return Ok(hit);
        }

        let value = self.registry.dispatch(name, arguments).await?;
        cache.insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_registry(calls: Arc<AtomicUsize>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn("count", "count", json!({}), move |args| {
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if args.get("fail").and_then(Value::as_bool).unwrap_or(false) {
                        return Err(ToolError::invalid_arguments("count", "asked to fail"));
                    }
                    Ok(json!({"call": n}))
                }
            })
            .unwrap();
        Arc::new(registry)
    }

    fn settings(ttl_secs: u64, max_entries: usize) -> ServerSettings {
        ServerSettings {
            cache_ttl: Duration::from_secs(ttl_secs),
            cache_max_entries: max_entries,
            ..ServerSettings::default()
        }
    }

    #[test]
    fn test_key_ignores_argument_order() {
        let a = ResponseCache::key("t", &json!({"b": 1, "a": {"y": 2, "x": [1, 2]}}));
        let b = ResponseCache::key("t", &json!({"a": {"x": [1, 2], "y": 2}, "b": 1}));
        assert_eq!(a, b);
        assert_ne!(a, ResponseCache::key("u", &json!({"b": 1, "a": {"y": 2, "x": [1, 2]}})));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = CachedDispatcher::new(counting_registry(calls.clone()), &settings(60, 10));

        let first = dispatcher.dispatch("count", json!({"q": 1})).await.unwrap();
        let second = dispatcher.dispatch("count", json!({"q": 1})).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        dispatcher.dispatch("count", json!({"q": 2})).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = CachedDispatcher::new(counting_registry(calls.clone()), &settings(5, 10));

        dispatcher.dispatch("count", json!({})).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        let again = dispatcher.dispatch("count", json!({})).await.unwrap();

        assert_eq!(again, json!({"call": 2}));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = CachedDispatcher::new(counting_registry(calls.clone()), &settings(60, 10));

        assert!(dispatcher.dispatch("count", json!({"fail": true})).await.is_err());
        assert!(dispatcher.dispatch("count", json!({"fail": true})).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_when_ttl_zero() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = CachedDispatcher::new(counting_registry(calls.clone()), &settings(0, 10));

        dispatcher.dispatch("count", json!({})).await.unwrap();
        dispatcher.dispatch("count", json!({})).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_download_file_bypasses_cache() {
        use crate::tools::{build_registry, test_support};
        use tempfile::TempDir;
        use zenodo_sdk::testing::MockUpstream;

        const URL: &str = "https://zenodo.org/records/5/files/data.csv/content";
        let temp = TempDir::new().unwrap();
        let mut record = test_support::record(5, "Rainfall", &[], &[]);
        record["files"] = json!([{"filename": "data.csv", "size": 3, "links": {"download": URL}}]);
        let mock = MockUpstream::new()
            .with_record("5", record)
            .with_download(URL, &b"a,b"[..]);
        let (client, mock) = test_support::client(mock);

        let settings = ServerSettings {
            download_dir: temp.path().to_path_buf(),
            ..ServerSettings::default()
        };
        let registry = build_registry(client, &settings).unwrap();
        assert!(!registry.is_cacheable("download_file"));
        assert!(registry.is_cacheable("get_metadata"));
        let dispatcher = CachedDispatcher::new(Arc::new(registry), &settings);

        let args = json!({"record_id": "5", "file_name": "data.csv", "force_download": true});
        dispatcher.dispatch("download_file", args.clone()).await.unwrap();
        let path = temp.path().join("5_data.csv");
        std::fs::remove_file(&path).unwrap();

        let second = dispatcher.dispatch("download_file", args).await.unwrap();
        assert_eq!(second["cached"], false);
        assert!(path.exists());
        assert_eq!(mock.request_count(URL), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);

        cache.insert("a".to_string(), json!(1));
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.insert("b".to_string(), json!(2));
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.insert("c".to_string(), json!(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some(json!(2)));
        assert_eq!(cache.get("c"), Some(json!(3)));
    }
}
