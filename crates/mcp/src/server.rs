// MCP server: JSON-RPC 2.0, one message per line over stdio

use crate::cache::CachedDispatcher;
use crate::error::ToolError;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo,
    ToolsCapability, PROTOCOL_VERSION,
};
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

/// Longest accepted request line.
const MAX_LINE_LENGTH: usize = 8 * 1024 * 1024;

pub struct McpServer {
    dispatcher: CachedDispatcher,
}

impl McpServer {
    pub fn new(dispatcher: CachedDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serve on stdin/stdout until stdin closes.
    pub async fn start(&self) -> Result<()> {
        info!(tools = self.dispatcher.registry().len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
        info!("stdin closed, shutting down");
        Ok(())
    }

    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
        let mut out = FramedWrite::new(writer, LinesCodec::new());

        while let Some(line) = lines.next().await {
            let response = match line {
                Ok(line) => match self.handle_line(&line).await {
                    Some(response) => response,
                    None => continue,
                },
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(limit = MAX_LINE_LENGTH, "Request line too long");
                    JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error())
                }
                Err(LinesCodecError::Io(e)) => return Err(e).context("Failed to read request"),
            };

            let encoded = serde_json::to_string(&response).context("Failed to encode response")?;
            out.send(encoded).await.context("Failed to write response")?;
        }

        Ok(())
    }

    /// Handle one raw line. Blank lines and notifications produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable request");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) if request.jsonrpc == "2.0" => self.handle_request(request).await,
            _ => Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request())),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "Handling request");

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            method if method.starts_with("notifications/") => {
                debug!(method, "Notification received");
                return None;
            }
            method => Err(JsonRpcError::method_not_found(method)),
        };

        let id = request.id?;
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::error(id, err),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Value {
        if let Some(params) = params.and_then(|p| serde_json::from_value::<InitializeParams>(p).ok()) {
            info!(
                client_version = %params.protocol_version,
                client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
                "Client initializing"
            );
        }

        json!(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    fn list_tools(&self) -> Value {
        json!(ListToolsResult {
            tools: self.dispatcher.registry().export_schemas(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}")))?;

        let arguments = params.arguments.unwrap_or(Value::Null);
        let result = match self.dispatcher.dispatch(&params.name, arguments).await {
            Ok(payload) => CallToolResult::json(&payload),
            Err(err) => {
                if let ToolError::NotFound(name) = err.root() {
                    return Err(JsonRpcError::invalid_params(format!("Unknown tool: {name}")));
                }
                error!(tool = %params.name, error = %err, "Tool call failed");
                CallToolResult::failure(err.to_string())
            }
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn("echo", "Echo arguments", json!({"type": "object"}), |args| async move {
                Ok(json!({"echo": args}))
            })
            .unwrap();
        registry
            .register_fn("cite", "Always fails", json!({"type": "object"}), |_| async {
                Err(ToolError::UnsupportedFormat("ris".to_string()))
            })
            .unwrap();
        McpServer::new(CachedDispatcher::uncached(Arc::new(registry)))
    }

    async fn call(server: &McpServer, line: &str) -> Value {
        let response = server.handle_line(line).await.expect("expected a response");
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server();
        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1"}}}"#,
        )
        .await;

        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(resp["result"]["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(resp["result"]["serverInfo"]["name"], "zenodo-mcp");
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server();
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
        assert!(server.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_tools_list_in_registration_order() {
        let server = server();
        let resp = call(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;

        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "echo");
        assert_eq!(tools[1]["name"], "cite");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let server = server();
        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"q":"x"}}}"#,
        )
        .await;

        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload, json!({"echo": {"q": "x"}}));
        assert!(resp["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_tools_call_failure_sets_is_error() {
        let server = server();
        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"cite","arguments":{}}}"#,
        )
        .await;

        assert_eq!(resp["result"]["isError"], true);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: "));
        assert!(text.contains("ris"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let server = server();
        let resp = call(
            &server,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await;

        assert_eq!(resp["error"]["code"], JsonRpcError::INVALID_PARAMS);
        assert_eq!(resp["error"]["message"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = server();

        let resp = call(&server, "{not json").await;
        assert_eq!(resp["error"]["code"], JsonRpcError::PARSE_ERROR);
        assert_eq!(resp["id"], Value::Null);

        let resp = call(&server, r#"{"jsonrpc":"2.0","id":6,"method":"resources/list"}"#).await;
        assert_eq!(resp["error"]["code"], JsonRpcError::METHOD_NOT_FOUND);

        let resp = call(&server, r#"{"jsonrpc":"2.0","id":7,"method":"tools/call"}"#).await;
        assert_eq!(resp["error"]["code"], JsonRpcError::INVALID_PARAMS);

        let resp = call(&server, r#"{"jsonrpc":"1.0","id":8,"method":"ping"}"#).await;
        assert_eq!(resp["error"]["code"], JsonRpcError::INVALID_REQUEST);
        assert_eq!(resp["id"], 8);
    }

    #[tokio::test]
    async fn test_serve_over_streams() {
        let server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );
        let mut output: Vec<u8> = Vec::new();

        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["result"], json!({}));
        assert_eq!(lines[1]["id"], 2);
    }
}
