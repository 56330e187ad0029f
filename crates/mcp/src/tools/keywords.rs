// Frequency-based keyword extraction

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    fetch_record, json_schema_integer, json_schema_object, json_schema_string, parse_args, RecordId,
    Tool,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use zenodo_core::keywords::{extract_keywords, record_text, DEFAULT_MAX_KEYWORDS, DEFAULT_MIN_FREQUENCY};
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "extract_keywords";

pub struct ExtractKeywordsTool {
    client: ZenodoClient,
}

impl ExtractKeywordsTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct KeywordArgs {
    record_id: RecordId,
    #[serde(default = "default_max_keywords")]
    max_keywords: usize,
    #[serde(default = "default_min_frequency")]
    min_frequency: usize,
}

fn default_max_keywords() -> usize {
    DEFAULT_MAX_KEYWORDS
}

fn default_min_frequency() -> usize {
    DEFAULT_MIN_FREQUENCY
}

#[async_trait::async_trait]
impl Tool for ExtractKeywordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Extract the most frequent terms from a record's title, description and keywords".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID"),
                    "max_keywords": json_schema_integer("Maximum number of keywords (default: 10)"),
                    "min_frequency": json_schema_integer("Minimum occurrences for a keyword (default: 2)")
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: KeywordArgs = parse_args(NAME, arguments)?;

        let record = fetch_record(&self.client, NAME, &args.record_id).await?;
        let text = record_text(&RecordView::new(&record));
        let keywords = extract_keywords(&text, args.max_keywords, args.min_frequency);

        info!(record_id = %args.record_id, count = keywords.len(), "Keywords extracted");

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "total_count": keywords.len(),
            "keywords": keywords,
        }))
    }
}
