// Field-by-field comparison of several records

use crate::error::ToolResult;
use crate::protocol::ToolSchema;
use crate::tools::{
    fetch_record, json_schema_array, json_schema_object, json_schema_string, parse_args, RecordId,
    Tool,
};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{info, warn};
use zenodo_core::compare::{compare_records, DEFAULT_COMPARE_FIELDS};
use zenodo_sdk::ZenodoClient;

const NAME: &str = "compare_records";

pub struct CompareRecordsTool {
    client: ZenodoClient,
}

impl CompareRecordsTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CompareArgs {
    record_ids: Vec<RecordId>,
    #[serde(default)]
    compare_fields: Option<Vec<String>>,
}

#[async_trait::async_trait]
impl Tool for CompareRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Compare two or more Zenodo records field by field".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_ids": json_schema_array(
                        json_schema_string("Zenodo record ID"),
                        "Records to compare (at least 2)"
                    ),
                    "compare_fields": json_schema_array(
                        json_schema_string("Field name"),
                        "Fields to compare (default: title, authors, topics, publication_date)"
                    )
                }),
                vec!["record_ids"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: CompareArgs = parse_args(NAME, arguments)?;

        let mut seen = HashSet::new();
        let ids: Vec<RecordId> = args
            .record_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let fields: Vec<String> = match args.compare_fields {
            Some(fields) if !fields.is_empty() => fields,
            _ => DEFAULT_COMPARE_FIELDS.iter().map(|f| f.to_string()).collect(),
        };

        let fetches = ids.iter().map(|id| fetch_record(&self.client, NAME, id));
        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();
        for (id, outcome) in ids.iter().zip(join_all(fetches).await) {
            match outcome {
                Ok(record) => records.push((id.to_string(), record)),
                Err(e) => {
                    warn!(record_id = %id, error = %e, "Skipping record that could not be fetched");
                    skipped.push(id.to_string());
                }
            }
        }

        let report = compare_records(&records, &fields)?;

        info!(
            compared = report.record_ids.len(),
            skipped = skipped.len(),
            overall = report.overall_similarity,
            "Records compared"
        );

        let mut result = serde_json::to_value(&report)?;
        if let Some(obj) = result.as_object_mut() {
            obj.insert("skipped_ids".to_string(), json!(skipped));
        }
        Ok(result)
    }
}
