//! In-memory [`Upstream`] for tests.

use crate::error::{ZenodoError, ZenodoResult};
use crate::upstream::{Method, Query, Upstream};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// A request observed by [`MockUpstream`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// First value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Serves canned documents keyed by path and search query.
///
/// `records/{id}` paths resolve against records added with
/// [`with_record`](Self::with_record); `records` resolves the `q` parameter
/// against [`with_search`](Self::with_search) and returns an empty page for
/// unknown queries. Anything else is a 404.
#[derive(Debug, Default)]
pub struct MockUpstream {
    documents: HashMap<String, Value>,
    searches: HashMap<String, Vec<Value>>,
    failures: HashMap<String, u16>,
    timeouts: Vec<String>,
    downloads: HashMap<String, Bytes>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `record` at `records/{record_id}`.
    pub fn with_record(mut self, record_id: &str, record: Value) -> Self {
        self.documents.insert(format!("records/{record_id}"), record);
        self
    }

    /// Serve `hits` for a search whose `q` equals `query`.
    pub fn with_search(mut self, query: &str, hits: Vec<Value>) -> Self {
        self.searches.insert(query.to_string(), hits);
        self
    }

    /// Fail requests to `path` with an HTTP status.
    pub fn with_failure(mut self, path: &str, status: u16) -> Self {
        self.failures.insert(path.to_string(), status);
        self
    }

    /// Fail requests to `path` with a timeout.
    pub fn with_timeout(mut self, path: &str) -> Self {
        self.timeouts.push(path.to_string());
        self
    }

    /// Serve `body` for a download of `url`.
    pub fn with_download(mut self, url: &str, body: impl Into<Bytes>) -> Self {
        self.downloads.insert(url.to_string(), body.into());
        self
    }

    /// All requests seen so far, downloads included.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests made to `path`.
    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    fn record(&self, method: Method, path: &str, query: &Query) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method,
                path: path.to_string(),
                query: query.to_vec(),
            });
    }

    fn injected_failure(&self, path: &str) -> Option<ZenodoError> {
        if self.timeouts.iter().any(|p| p == path) {
            return Some(ZenodoError::Timeout);
        }
        self.failures.get(path).map(|status| {
            ZenodoError::from_response(*status, &json!({"status": status, "message": "mock failure"}).to_string())
        })
    }
}

fn not_found(path: &str) -> ZenodoError {
    ZenodoError::Api {
        status: 404,
        message: format!("No mock document for {path}"),
        details: None,
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn fetch(&self, method: Method, path: &str, query: &Query) -> ZenodoResult<Value> {
        let path = path.trim_start_matches('/');
        self.record(method, path, query);

        if let Some(err) = self.injected_failure(path) {
            return Err(err);
        }

        if path == "records" {
            let q = query
                .iter()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.as_str())
                .unwrap_or_default();
            let hits = self.searches.get(q).cloned().unwrap_or_default();
            let total = hits.len();
            return Ok(json!({"hits": {"hits": hits, "total": total}}));
        }

        self.documents.get(path).cloned().ok_or_else(|| not_found(path))
    }

    async fn fetch_bytes(&self, url: &str) -> ZenodoResult<Bytes> {
        self.record(Method::GET, url, &[]);

        if let Some(err) = self.injected_failure(url) {
            return Err(err);
        }
        self.downloads.get(url).cloned().ok_or_else(|| not_found(url))
    }
}
