// File listing

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    default_true, fetch_record, json_schema_boolean, json_schema_object, json_schema_string,
    parse_args, RecordId, Tool,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use zenodo_core::record::FileView;
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "list_files";

pub struct ListFilesTool {
    client: ZenodoClient,
}

impl ListFilesTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListFilesArgs {
    record_id: RecordId,
    #[serde(default = "default_true")]
    include_metadata: bool,
}

fn describe(file: FileView<'_>, include_metadata: bool) -> Value {
    let mut entry = json!({
        "filename": file.name(),
        "size": file.size(),
        "type": file.file_type(),
        "download_url": file.download_url(),
    });
    if include_metadata {
        if let Some(obj) = entry.as_object_mut() {
            obj.insert("checksum".to_string(), json!(file.checksum()));
            obj.insert("file_type".to_string(), json!(file.file_type()));
            obj.insert("mime_type".to_string(), json!(file.mime_type()));
        }
    }
    entry
}

#[async_trait::async_trait]
impl Tool for ListFilesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "List the files attached to a Zenodo record".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID"),
                    "include_metadata": json_schema_boolean("Include checksum and type details (default: true)")
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: ListFilesArgs = parse_args(NAME, arguments)?;

        let record = fetch_record(&self.client, NAME, &args.record_id).await?;
        let files: Vec<Value> = RecordView::new(&record)
            .files()
            .iter()
            .map(|file| describe(FileView::new(file), args.include_metadata))
            .collect();

        info!(record_id = %args.record_id, count = files.len(), "Files listed");

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "total_count": files.len(),
            "files": files,
        }))
    }
}
