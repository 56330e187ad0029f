// The Zenodo tool catalogue

mod citation;
mod compare;
mod data_type;
mod download;
mod embed;
mod files;
mod keywords;
mod metadata;
mod registry;
mod related;
mod search;
mod summarize;

pub use citation::CitationTool;
pub use compare::CompareRecordsTool;
pub use data_type::DetectDataTypeTool;
pub use download::DownloadFileTool;
pub use embed::EmbedLinkTool;
pub use files::ListFilesTool;
pub use keywords::ExtractKeywordsTool;
pub use metadata::MetadataTool;
pub use registry::{
    json_schema_array, json_schema_boolean, json_schema_integer, json_schema_number,
    json_schema_object, json_schema_string, parse_args, Tool, ToolRegistry,
};
pub use related::RelatedRecordsTool;
pub use search::SearchTool;
pub use summarize::SummarizeTool;

use crate::error::{ToolError, ToolResult};
use crate::settings::ServerSettings;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use zenodo_core::compare::PAIR_SEPARATOR;
use zenodo_sdk::{ZenodoClient, ZenodoError};

/// Compose the default catalogue. Registration order is discovery order.
pub fn build_registry(client: ZenodoClient, settings: &ServerSettings) -> ToolResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(SearchTool::new(client.clone())))?;
    registry.register(Arc::new(MetadataTool::new(client.clone())))?;
    registry.register(Arc::new(CitationTool::new(client.clone())))?;
    registry.register(Arc::new(DownloadFileTool::new(
        client.clone(),
        settings.download_dir.clone(),
    )))?;
    registry.register(Arc::new(SummarizeTool::new(client.clone())))?;
    registry.register(Arc::new(DetectDataTypeTool::new(client.clone())))?;
    registry.register(Arc::new(ListFilesTool::new(client.clone())))?;
    registry.register(Arc::new(RelatedRecordsTool::new(client.clone())))?;
    registry.register(Arc::new(CompareRecordsTool::new(client.clone())))?;
    registry.register(Arc::new(ExtractKeywordsTool::new(client.clone())))?;
    registry.register(Arc::new(EmbedLinkTool::new(client)))?;

    Ok(registry)
}

/// A record identifier as accepted from callers: a non-empty string or an
/// integer, with no path syntax and no pair-key separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        let id = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.trim().to_string(),
            Raw::Number(n) => n.to_string(),
        };
        if id.is_empty() {
            return Err(serde::de::Error::custom("record_id must not be empty"));
        }
        if id.contains(['/', '\\', '?', '#', PAIR_SEPARATOR]) || id.contains("..") {
            return Err(serde::de::Error::custom(format!("invalid record_id {id:?}")));
        }
        Ok(Self(id))
    }
}

/// Fetch one record, reporting rejected ids against the calling tool.
pub(crate) async fn fetch_record(
    client: &ZenodoClient,
    tool: &str,
    record_id: &RecordId,
) -> ToolResult<Value> {
    client
        .records()
        .get(record_id.as_str())
        .await
        .map_err(|err| match err {
            ZenodoError::InvalidInput(message) => ToolError::invalid_arguments(tool, message),
            other => ToolError::Upstream(other),
        })
}

/// Seconds elapsed since `start`, as reported in `query_time`.
pub(crate) fn query_time(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}

pub(crate) fn default_true() -> bool {
    true
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::{json, Value};
    use std::sync::Arc;
    use zenodo_sdk::testing::MockUpstream;
    use zenodo_sdk::ZenodoClient;

    pub fn client(mock: MockUpstream) -> (ZenodoClient, Arc<MockUpstream>) {
        let mock = Arc::new(mock);
        (ZenodoClient::new(mock.clone()), mock)
    }

    /// A record document in the shape the records API returns.
    pub fn record(id: u64, title: &str, creators: &[&str], keywords: &[&str]) -> Value {
        let creators: Vec<Value> = creators.iter().map(|name| json!({"name": name})).collect();
        json!({
            "id": id,
            "metadata": {
                "title": title,
                "creators": creators,
                "keywords": keywords,
                "publication_date": "2021-06-15",
                "description": format!("Description of {title}"),
                "doi": format!("10.5281/zenodo.{id}"),
                "access_right": "open",
                "resource_type": {"type": "dataset", "title": "Dataset"},
                "license": {"id": "cc-by-4.0"}
            },
            "files": []
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zenodo_sdk::testing::MockUpstream;

    #[test]
    fn test_build_registry_order() {
        let (client, _) = test_support::client(MockUpstream::new());
        let registry = build_registry(client, &ServerSettings::default()).unwrap();

        let names: Vec<String> = registry.export_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "search_records",
                "get_metadata",
                "get_citation",
                "download_file",
                "summarize_record",
                "detect_data_type",
                "list_files",
                "get_related_records",
                "compare_records",
                "extract_keywords",
                "generate_embed_link",
            ]
        );
    }

    #[test]
    fn test_every_schema_is_an_object() {
        let (client, _) = test_support::client(MockUpstream::new());
        let registry = build_registry(client, &ServerSettings::default()).unwrap();

        for schema in registry.export_schemas() {
            assert_eq!(schema.input_schema["type"], "object", "{}", schema.name);
            assert!(!schema.description.is_empty(), "{}", schema.name);
        }
    }

    #[test]
    fn test_record_id_accepts_strings_and_integers() {
        let id: RecordId = serde_json::from_value(json!(" 1234 ")).unwrap();
        assert_eq!(id.as_str(), "1234");
        let id: RecordId = serde_json::from_value(json!(1234)).unwrap();
        assert_eq!(id.as_str(), "1234");
    }

    #[test]
    fn test_record_id_rejects_empty_and_paths() {
        assert!(serde_json::from_value::<RecordId>(json!("")).is_err());
        assert!(serde_json::from_value::<RecordId>(json!("12/files")).is_err());
        assert!(serde_json::from_value::<RecordId>(json!("..")).is_err());
        assert!(serde_json::from_value::<RecordId>(json!("1_2")).is_err());
        assert!(serde_json::from_value::<RecordId>(json!(true)).is_err());
    }
}
