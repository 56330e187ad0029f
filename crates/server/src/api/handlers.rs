use super::{ApiError, ApiResult};
use crate::config::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use zenodo_mcp::protocol::{ListToolsResult, ToolSchema};

/// List every registered tool in registration order
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ListToolsResult> {
    Json(ListToolsResult {
        tools: state.dispatcher.registry().export_schemas(),
    })
}

/// Describe a single tool
pub async fn get_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<ToolSchema>> {
    let schema = state.dispatcher.registry().lookup(&name)?;
    Ok(Json(schema))
}

/// Invoke a tool. An empty body means no arguments.
pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))?
    };

    match state.dispatcher.dispatch(&name, arguments).await {
        Ok(result) => {
            tracing::info!(tool = %name, "Tool call succeeded");
            Ok(Json(result))
        }
        Err(err) => {
            tracing::error!(tool = %name, error = %err, "Tool call failed");
            Err(err.into())
        }
    }
}
