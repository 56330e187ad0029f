// Related-record discovery

use crate::error::{ToolError, ToolResult};
use crate::protocol::ToolSchema;
use crate::tools::{
    fetch_record, json_schema_integer, json_schema_number, json_schema_object, json_schema_string,
    parse_args, RecordId, Tool,
};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use zenodo_core::related::{
    rank_candidates, search_terms, DEFAULT_MAX_RESULTS, DEFAULT_SIMILARITY_THRESHOLD,
};
use zenodo_core::RecordView;
use zenodo_sdk::ZenodoClient;

const NAME: &str = "get_related_records";

/// Searches once per title, keyword and creator of the target record and
/// ranks the pooled hits by composite similarity.
pub struct RelatedRecordsTool {
    client: ZenodoClient,
}

impl RelatedRecordsTool {
    pub fn new(client: ZenodoClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct RelatedArgs {
    record_id: RecordId,
    #[serde(default = "default_max_results")]
    max_results: usize,
    #[serde(default = "default_threshold")]
    similarity_threshold: f64,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

#[async_trait::async_trait]
impl Tool for RelatedRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.to_string(),
            description: "Find records similar to a given record by title, keywords and creators".to_string(),
            input_schema: json_schema_object(
                json!({
                    "record_id": json_schema_string("Zenodo record ID"),
                    "max_results": json_schema_integer("Maximum number of related records (default: 5)"),
                    "similarity_threshold": json_schema_number("Minimum similarity score between 0 and 1 (default: 0.3)")
                }),
                vec!["record_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        let args: RelatedArgs = parse_args(NAME, arguments)?;
        if !(0.0..=1.0).contains(&args.similarity_threshold) {
            return Err(ToolError::invalid_arguments(
                NAME,
                "similarity_threshold must be between 0 and 1",
            ));
        }
        if args.max_results == 0 {
            return Ok(json!({
                "record_id": args.record_id.as_str(),
                "related_records": [],
                "total_count": 0,
            }));
        }

        let target = fetch_record(&self.client, NAME, &args.record_id).await?;
        let target_view = RecordView::new(&target);
        let terms = search_terms(&target_view);

        let records = self.client.records();
        let searches = terms
            .iter()
            .map(|term| records.search(term, args.max_results, None));
        let mut hits = Vec::new();
        for (term, outcome) in terms.iter().zip(join_all(searches).await) {
            match outcome {
                Ok(page) => hits.extend(page.hits),
                Err(e) => warn!(term = %term, error = %e, "Search for related records failed, skipping term"),
            }
        }

        let related = rank_candidates(
            args.record_id.as_str(),
            &target_view,
            &hits,
            args.similarity_threshold,
            args.max_results,
        );

        info!(
            record_id = %args.record_id,
            terms = terms.len(),
            candidates = hits.len(),
            related = related.len(),
            "Related records ranked"
        );

        Ok(json!({
            "record_id": args.record_id.as_str(),
            "total_count": related.len(),
            "related_records": related,
        }))
    }
}
