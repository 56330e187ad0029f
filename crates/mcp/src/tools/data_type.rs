// Software / dataset / article classification

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{fetch_record, json_schema_object, json_schema_string, parse_args, RecordId, Tool};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use zenodo_core::data_type::{detect, file_extensions};
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "detect_data_type";

pub struct DetectDataTypeTool {
    client: ZenodoClient,
}

impl DetectDataTypeTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DetectArgs {
    record_id: RecordId,
}

#[async_trait::async_trait]
impl Tool for DetectDataTypeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Guess whether a Zenodo record is software, a dataset or an article".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID")
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: DetectArgs = parse_args(NAME, arguments)?;

        let record = fetch_record(&self.client, NAME, &args.record_id).await?;
        let view = RecordView::new(&record);
        let detection = detect(&view);

        info!(record_id = %args.record_id, data_type = ?detection.data_type, "Data type detected");

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "data_type": detection.data_type,
            "confidence": detection.confidence,
            "metadata": {
                "title": view.title(),
                "description": view.description(),
                "keywords": view.keywords(),
                "file_count": view.files().len(),
                "file_types": file_extensions(&view),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support;
    use zenodo_sdk::testing::MockUpstream;

    #[tokio::test]
    async fn test_keyword_detection() {
        let record = test_support::record(1, "Parser", &[], &["Software", "rust"]);
        let (client, _) = test_support::client(MockUpstream::new().with_record("1", record));
        let tool = DetectDataTypeTool::new(client);

        let result = tool.execute(json!({"record_id": "1"})).await.unwrap();
        assert_eq!(result["data_type"], "software");
        assert_eq!(result["confidence"], 0.8);
        assert_eq!(result["metadata"]["keywords"], json!(["Software", "rust"]));
    }

    #[tokio::test]
    async fn test_extension_detection_and_file_types() {
        let mut record = test_support::record(2, "Measurements", &[], &[]);
        record["files"] = json!([{"key": "b.CSV"}, {"key": "a.csv"}, {"key": "notes.pdf"}]);
        let (client, _) = test_support::client(MockUpstream::new().with_record("2", record));
        let tool = DetectDataTypeTool::new(client);

        let result = tool.execute(json!({"record_id": "2"})).await.unwrap();
        assert_eq!(result["data_type"], "dataset");
        assert_eq!(result["confidence"], 0.6);
        assert_eq!(result["metadata"]["file_count"], 3);
        assert_eq!(result["metadata"]["file_types"], json!(["csv", "pdf"]));
    }

    #[tokio::test]
    async fn test_unknown() {
        let record = test_support::record(3, "Misc", &[], &["ocean"]);
        let (client, _) = test_support::client(MockUpstream::new().with_record("3", record));
        let tool = DetectDataTypeTool::new(client);

        let result = tool.execute(json!({"record_id": "3"})).await.unwrap();
        assert_eq!(result["data_type"], "unknown");
        assert_eq!(result["confidence"], 0.0);
    }
}
