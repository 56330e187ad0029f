// File download with an on-disk cache

use crate::error::{ToolError, ToolResult};
use crate::protocol::ToolSchema;
use crate::tools::{
    fetch_record, json_schema_boolean, json_schema_object, json_schema_string, parse_args,
    query_time, RecordId, Tool,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "download_file";

/// Downloads files into `<download_dir>/<record_id>_<file_name>` and serves
/// later requests from there.
pub struct DownloadFileTool {
    client: ZenodoClient,
    download_dir: PathBuf,
}

impl DownloadFileTool {
    pub fn new(client: ZenodoClient, download_dir: PathBuf) -> Self {
        Self {
            client,
            download_dir,
        }
    }

    fn cache_path(&self, record_id: &RecordId, file_name: &str) -> PathBuf {
        self.download_dir.join(format!("{record_id}_{file_name}"))
    }
}

#[derive(Debug, Deserialize)]
struct DownloadArgs {
    record_id: RecordId,
    file_name: String,
    #[serde(default)]
    force_download: bool,
}

fn validate_file_name(file_name: &str) -> ToolResult<()> {
    if file_name.trim().is_empty() {
        return Err(ToolError::invalid_arguments(NAME, "file_name must not be empty"));
    }
    if file_name.contains(['/', '\\']) || file_name.contains("..") || file_name.contains('\0') {
        return Err(ToolError::invalid_arguments(
            NAME,
            format!("file_name {file_name:?} must be a plain file name"),
        ));
    }
    Ok(())
}

fn guess_mime(declared: &str, path: &Path) -> String {
    if declared.is_empty() {
        mime_guess::from_path(path).first_or_octet_stream().to_string()
    } else {
        declared.to_string()
    }
}

/// Write through a sibling temp file so a failed download never leaves a
/// truncated file where the cache expects a complete one.
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let written = match tokio::fs::write(&partial, bytes).await {
        Ok(()) => tokio::fs::rename(&partial, path).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        if let Err(e) = tokio::fs::remove_file(&partial).await {
            debug!(path = %partial.display(), error = %e, "No partial download to remove");
        }
    }
    written
}

#[async_trait::async_trait]
impl Tool for DownloadFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Download a file from a Zenodo record into the local cache".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID"),
                    "file_name": json_schema_string("Name of the file within the record"),
                    "force_download": json_schema_boolean("Download again even if cached (default: false)")
                }),
                vec!["record_id", "file_name"],
            ),
        }
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: DownloadArgs = parse_args(NAME, arguments)?;
        validate_file_name(&args.file_name)?;
        let start = Instant::now();

        let record = fetch_record(&self.client, NAME, &args.record_id).await?;
        let view = RecordView::new(&record);
        let file = view
            .find_file(&args.file_name)
            .ok_or_else(|| ToolError::FileNotFound {
                record_id: args.record_id.to_string(),
                file_name: args.file_name.clone(),
            })?;

        let path = self.cache_path(&args.record_id, &args.file_name);
        let mime_type = guess_mime(file.mime_type(), &path);

        let cached = !args.force_download && tokio::fs::try_exists(&path).await?;
        let file_size = if cached {
            debug!(path = %path.display(), "Serving file from download cache");
            tokio::fs::metadata(&path).await?.len()
        } else {
            let url = match file.download_url() {
                "" => format!("records/{}/files/{}/content", args.record_id, args.file_name),
                url => url.to_string(),
            };
            let bytes = self.client.records().download(&url).await?;

            tokio::fs::create_dir_all(&self.download_dir).await?;
            write_atomically(&path, &bytes).await?;
            bytes.len() as u64
        };

        info!(
            record_id = %args.record_id,
            file_name = %args.file_name,
            cached,
            bytes = file_size,
            "File ready"
        );

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "file_name": args.file_name,
            "file_path": path.display().to_string(),
            "file_size": file_size,
            "mime_type": mime_type,
            "cached": cached,
            "query_time": query_time(start),
        }))
    }
}
