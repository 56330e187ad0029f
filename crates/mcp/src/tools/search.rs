// Full-text record search

use crate::error::{ToolError, ToolResult};
use crate::protocol::ToolSchema;
use crate::tools::{json_schema_integer, json_schema_object, json_schema_string, parse_args, Tool};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use zenodo_sdk::{ZenodoClient, DEFAULT_SORT};

const NAME: &str = "search_records";
const DEFAULT_MAX_RESULTS: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

pub struct SearchTool {
    client: ZenodoClient,
}

impl SearchTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_max_results")]
    max_results: usize,
    #[serde(default)]
    sort: Option<String>,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

#[async_trait::async_trait]
impl Tool for SearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Search Zenodo records by free-text query".to_string(),
            input_schema: json_schema_object(
                json!({
                    "query": json_schema_string("Search query (Elasticsearch query string syntax)"),
                    "max_results": json_schema_integer("Maximum number of records to return (default: 10, max: 100)"),
                    "sort": json_schema_string("Sort order: mostrecent, bestmatch, ... (default: mostrecent)")
                }),
                vec!["query"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: SearchArgs = parse_args(NAME, arguments)?;

        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::invalid_arguments(NAME, "query must not be empty"));
        }
        if args.max_results == 0 || args.max_results > MAX_PAGE_SIZE {
            return Err(ToolError::invalid_arguments(
                NAME,
                format!("max_results must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        let sort = args
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SORT);

        let page = self
            .client
            .records()
            .search(query, args.max_results, Some(sort))
            .await?;

        info!(query = %query, returned = page.hits.len(), total = page.total, "Search completed");

        Ok(json!({
            "query": query,
            "total_results": page.total,
            "records": page.hits,
        }))
    }
}
