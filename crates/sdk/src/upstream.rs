//! The outbound seam every tool talks through.

use crate::error::ZenodoResult;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

pub use reqwest::Method;

/// Query string pairs, in the order they are sent.
pub type Query = [(String, String)];

/// A source of Zenodo API documents.
///
/// `fetch` fails with [`ZenodoError::Authentication`](crate::ZenodoError::Authentication)
/// on 401/403, [`ZenodoError::Api`](crate::ZenodoError::Api) on any other
/// status >= 400, [`ZenodoError::Timeout`](crate::ZenodoError::Timeout) when
/// the deadline passes, and [`ZenodoError::Http`](crate::ZenodoError::Http)
/// for network-level failures.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue a request against an API-relative `path` and parse the JSON body.
    async fn fetch(&self, method: Method, path: &str, query: &Query) -> ZenodoResult<Value>;

    /// Download raw bytes from an absolute URL (or an API-relative path).
    async fn fetch_bytes(&self, url: &str) -> ZenodoResult<Bytes>;
}
