// Raw record metadata

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    default_true, fetch_record, json_schema_boolean, json_schema_object, json_schema_string,
    parse_args, query_time, RecordId, Tool,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "get_metadata";

pub struct MetadataTool {
    client: ZenodoClient,
}

impl MetadataTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataArgs {
    record_id: RecordId,
    #[serde(default = "default_true")]
    include_files: bool,
    #[serde(default = "default_true")]
    include_versions: bool,
}

#[async_trait::async_trait]
impl Tool for MetadataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Get the full metadata document of a Zenodo record".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID"),
                    "include_files": json_schema_boolean("Include the file list (default: true)"),
                    "include_versions": json_schema_boolean("Include version relations (default: true)")
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: MetadataArgs = parse_args(NAME, arguments)?;
        let start = Instant::now();

        let mut record = fetch_record(&self.client, NAME, &args.record_id).await?;

        if !args.include_files {
            if let Some(obj) = record.as_object_mut() {
                obj.remove("files");
            }
        }
        if !args.include_versions {
            if let Some(metadata) = record.get_mut("metadata").and_then(Value::as_object_mut) {
                metadata.remove("relations");
            }
        }

        info!(record_id = %args.record_id, "Metadata fetched");

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "record": record,
            "query_time": query_time(start),
        }))
    }
}
