// Plain-text record summaries

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    fetch_record, json_schema_boolean, json_schema_integer, json_schema_object, json_schema_string,
    parse_args, query_time, RecordId, Tool,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;
use zenodo_core::summary::{build_summary, SummaryOptions, DEFAULT_MAX_LENGTH};
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "summarize_record";

pub struct SummarizeTool {
    client: ZenodoClient,
}

impl SummarizeTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SummarizeArgs {
    record_id: RecordId,
    #[serde(default)]
    include_files: bool,
    #[serde(default)]
    include_versions: bool,
    #[serde(default = "default_max_length")]
    max_length: usize,
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

#[async_trait::async_trait]
impl Tool for SummarizeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Summarize a Zenodo record as readable text".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID"),
                    "include_files": json_schema_boolean("Add a section about the record's files (default: false)"),
                    "include_versions": json_schema_boolean("Add a section about the record's versions (default: false)"),
                    "max_length": json_schema_integer("Maximum description length in characters (default: 500)")
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: SummarizeArgs = parse_args(NAME, arguments)?;
        let start = Instant::now();

        let record = fetch_record(&self.client, NAME, &args.record_id).await?;
        let summary = build_summary(
            &RecordView::new(&record),
            SummaryOptions {
                include_files: args.include_files,
                include_versions: args.include_versions,
                max_length: args.max_length,
            },
        );

        info!(record_id = %args.record_id, chars = summary.chars().count(), "Summary built");

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "summary": summary,
            "query_time": query_time(start),
        }))
    }
}
