// Citation formatting

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    fetch_record, json_schema_object, json_schema_string, parse_args, query_time, RecordId, Tool,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;
use zenodo_core::citation::{format_citation, CitationFormat};
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "get_citation";

pub struct CitationTool {
    client: ZenodoClient,
}

impl CitationTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CitationArgs {
    record_id: RecordId,
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    CitationFormat::Bibtex.as_str().to_string()
}

#[async_trait::async_trait]
impl Tool for CitationTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Format a citation for a Zenodo record".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID"),
                    "format": {
                        "type": "string",
                        "enum": ["bibtex", "apa"],
                        "description": "Citation format (default: bibtex)"
                    }
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: CitationArgs = parse_args(NAME, arguments)?;
        // Unknown formats fail before any network traffic.
        let format: CitationFormat = args.format.parse()?;
        let start = Instant::now();

        let record = fetch_record(&self.client, NAME, &args.record_id).await?;
        let citation = format_citation(args.record_id.as_str(), &RecordView::new(&record), format);

        info!(record_id = %args.record_id, format = format.as_str(), "Citation generated");

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "citation": citation,
            "format": format.as_str(),
            "query_time": query_time(start),
        }))
    }
}
