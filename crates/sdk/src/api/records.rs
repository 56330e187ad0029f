//! Records API endpoints.

use crate::client::ZenodoClient;
use crate::error::{ZenodoError, ZenodoResult};
use crate::upstream::Method;
use bytes::Bytes;
use serde_json::Value;

/// Sort order used when a search does not ask for one.
pub const DEFAULT_SORT: &str = "mostrecent";

/// Records API for fetching and searching published records.
pub struct RecordsApi<'a> {
    client: &'a ZenodoClient,
}

impl<'a> RecordsApi<'a> {
    pub(crate) fn new(client: &'a ZenodoClient) -> Self {
        Self { client }
    }

    /// Get a single record by ID.
    pub async fn get(&self, record_id: &str) -> ZenodoResult<Value> {
        let record_id = record_id.trim();
        if record_id.is_empty() || record_id.contains(['/', '?', '#']) {
            return Err(ZenodoError::InvalidInput(format!("Invalid record id: {record_id:?}")));
        }
        self.client
            .upstream()
            .fetch(Method::GET, &format!("records/{record_id}"), &[])
            .await
    }

    /// Run a search query.
    pub async fn search(&self, query: &str, size: usize, sort: Option<&str>) -> ZenodoResult<SearchPage> {
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("size".to_string(), size.to_string()),
            ("sort".to_string(), sort.unwrap_or(DEFAULT_SORT).to_string()),
        ];
        let body = self
            .client
            .upstream()
            .fetch(Method::GET, "records", &params)
            .await?;
        Ok(SearchPage::from_value(body))
    }

    /// Download a file's bytes from its link.
    pub async fn download(&self, url: &str) -> ZenodoResult<Bytes> {
        self.client.upstream().fetch_bytes(url).await
    }
}

/// One page of search hits.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub hits: Vec<Value>,
    pub total: u64,
}

impl SearchPage {
    /// Read `hits.hits` and `hits.total`, which is either an integer or
    /// `{"value": n}` depending on the API version.
    pub fn from_value(body: Value) -> Self {
        let hits_obj = body.get("hits");
        let hits = hits_obj
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let total = hits_obj
            .and_then(|h| h.get("total"))
            .and_then(|t| t.as_u64().or_else(|| t.get("value").and_then(Value::as_u64)))
            .unwrap_or(hits.len() as u64);

        Self { hits, total }
    }
}
