// Embeddable record links

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    fetch_record, json_schema_object, json_schema_string, parse_args, query_time, RecordId, Tool,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;
use zenodo_core::data_type::detect;
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "generate_embed_link";

pub const EMBED_URL_BASE: &str = "https://zenodo.org/record";

pub struct EmbedLinkTool {
    client: ZenodoClient,
}

impl EmbedLinkTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct EmbedArgs {
    record_id: RecordId,
}

pub fn embed_url(record_id: &RecordId) -> String {
    format!("{EMBED_URL_BASE}/{record_id}/embed")
}

#[async_trait::async_trait]
impl Tool for EmbedLinkTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Create an embeddable link for a Zenodo record (PDF, dataset)".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID")
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: EmbedArgs = parse_args(NAME, arguments)?;
        let start = Instant::now();

        // The record type comes from the same heuristics as detect_data_type.
        let record = fetch_record(&self.client, NAME, &args.record_id).await?;
        let detection = detect(&RecordView::new(&record));

        info!(record_id = %args.record_id, record_type = ?detection.data_type, "Embed link generated");

        Ok(json!({
            "embed_url": embed_url(&args.record_id),
            "record_id": args.record_id.as_str(),
            "record_type": detection.data_type,
            "query_time": query_time(start),
        }))
    }
}
