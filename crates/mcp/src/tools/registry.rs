// Tool trait, registry and dispatch

use crate::error::{ToolError, ToolResult};
use crate::protocol::ToolSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with an object of named arguments
    async fn execute(&self, arguments: Value) -> ToolResult<Value>;

    /// Whether a result may be replayed from the response cache. Tools with
    /// side effects return false.
    fn cacheable(&self) -> bool {
        true
    }
}

type BoxedHandler =
    Box<dyn Fn(Value) -> Pin<Box<dyn Future<Output = ToolResult<Value>> + Send>> + Send + Sync>;

/// A tool backed by a closure, see [`ToolRegistry::register_fn`].
struct FnTool {
    schema: ToolSchema,
    handler: BoxedHandler,
}

#[async_trait::async_trait]
impl Tool for FnTool {
    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    async fn execute(&self, arguments: Value) -> ToolResult<Value> {
        (self.handler)(arguments).await
    }
}

/// Tool registry for managing available tools.
///
/// Populated once at startup and read-only afterwards, so it can be shared
/// behind an `Arc` without locking. Schemas are exported in registration
/// order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool under its schema name.
    ///
    /// Registering a name twice replaces the earlier tool but keeps its
    /// position in the discovery order.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> ToolResult<()> {
        let name = tool.schema().name;
        if name.trim().is_empty() {
            warn!("Rejected tool registration with an empty name");
            return Err(ToolError::Registration("tool name must not be empty".to_string()));
        }

        match self.index.get(&name) {
            Some(&slot) => {
                warn!(tool = %name, "Tool registered twice, replacing earlier registration");
                self.tools[slot] = tool;
            }
            None => {
                debug!(tool = %name, "Registered tool");
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
        Ok(())
    }

    /// Register an async closure as a tool.
    pub fn register_fn<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: F,
    ) -> ToolResult<()>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult<Value>> + Send + 'static,
    {
        let schema = ToolSchema {
            name: name.into(),
            description: description.into(),
            input_schema: parameters,
        };
        let handler: BoxedHandler = Box::new(move |args| Box::pin(handler(args)));
        self.register(Arc::new(FnTool { schema, handler }))
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| self.tools[slot].clone())
    }

    /// Look up the schema of a tool.
    pub fn lookup(&self, name: &str) -> ToolResult<ToolSchema> {
        self.get(name)
            .map(|tool| tool.schema())
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// All schemas, in registration order.
    pub fn export_schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Whether results of `name` may be cached. Unknown tools are not.
    pub fn is_cacheable(&self, name: &str) -> bool {
        self.get(name).is_some_and(|tool| tool.cacheable())
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name.
    ///
    /// `arguments` must be a JSON object (or null, treated as empty). Handler
    /// failures come back as [`ToolError::Execution`] wrapping the cause.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            obj @ Value::Object(_) => obj,
            other => {
                return Err(ToolError::invalid_arguments(
                    name,
                    format!("expected an object of named arguments, got {other}"),
                ))
            }
        };

        debug!(tool = %name, "Dispatching tool call");
        tool.execute(arguments)
            .await
            .map_err(|e| ToolError::execution(name, e))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize tool arguments, reporting failures against the tool name.
pub fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> ToolResult<T> {
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_arguments(tool, e.to_string()))
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_number(description: &str) -> Value {
    serde_json::json!({
        "type": "number",
        "description": description
    })
}

pub fn json_schema_boolean(description: &str) -> Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_array(items: Value, description: &str) -> Value {
    serde_json::json!({
        "type": "array",
        "items": items,
        "description": description
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_registry(names: &[&str]) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for name in names {
            let tool_name = name.to_string();
            registry
                .register_fn(*name, format!("{name} tool"), json_schema_object(json!({}), vec![]), move |args| {
                    let tool_name = tool_name.clone();
                    async move { Ok(json!({"tool": tool_name, "args": args})) }
                })
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_export_schemas_in_registration_order() {
        let registry = echo_registry(&["search", "get_metadata"]);

        let names: Vec<String> = registry.export_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["search", "get_metadata"]);
    }

    #[test]
    fn test_export_schemas_end_to_end_shape() {
        let registry = echo_registry(&["search", "get_metadata"]);

        let exported = serde_json::to_value(registry.export_schemas()).unwrap();
        let exported = exported.as_array().unwrap();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0]["name"], "search");
        assert_eq!(exported[0]["description"], "search tool");
        assert_eq!(exported[0]["inputSchema"]["type"], "object");
        assert_eq!(exported[1]["name"], "get_metadata");
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut registry = ToolRegistry::new();
        let result = registry.register_fn("  ", "blank", json!({}), |_| async { Ok(json!(null)) });

        assert!(matches!(result, Err(ToolError::Registration(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_reregistration_last_wins_keeps_position() {
        let mut registry = echo_registry(&["a", "b"]);
        registry
            .register_fn("a", "replacement", json!({}), |_| async { Ok(json!("second")) })
            .unwrap();

        let names: Vec<String> = registry.export_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.lookup("a").unwrap().description, "replacement");
        assert_eq!(registry.dispatch("a", json!({})).await.unwrap(), json!("second"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = echo_registry(&["search"]);

        match registry.dispatch("nonexistent_tool", json!({})).await {
            Err(ToolError::NotFound(name)) => assert_eq!(name, "nonexistent_tool"),
            other => panic!("Expected NotFound, got {other:?}"),
        }
        assert!(matches!(registry.lookup("nonexistent_tool"), Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_dispatch_passes_arguments_through() {
        let registry = echo_registry(&["search"]);

        let result = registry.dispatch("search", json!({"query": "ocean"})).await.unwrap();
        assert_eq!(result, json!({"tool": "search", "args": {"query": "ocean"}}));

        let result = registry.dispatch("search", Value::Null).await.unwrap();
        assert_eq!(result["args"], json!({}));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_positional_arguments() {
        let registry = echo_registry(&["search"]);

        let result = registry.dispatch("search", json!(["ocean"])).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments { .. })));
    }

    #[tokio::test]
    async fn test_dispatch_wraps_handler_failures() {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn("cite", "cite", json!({}), |_| async {
                Err(ToolError::UnsupportedFormat("ris".to_string()))
            })
            .unwrap();

        let err = registry.dispatch("cite", json!({})).await.unwrap_err();
        match &err {
            ToolError::Execution { tool, .. } => assert_eq!(tool, "cite"),
            other => panic!("Expected Execution, got {other:?}"),
        }
        assert!(matches!(err.root(), ToolError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_parse_args_reports_tool() {
        #[derive(Debug, serde::Deserialize)]
        struct Args {
            #[allow(dead_code)]
            record_id: String,
        }

        let err = parse_args::<Args>("get_metadata", json!({})).unwrap_err();
        match err {
            ToolError::InvalidArguments { tool, message } => {
                assert_eq!(tool, "get_metadata");
                assert!(message.contains("record_id"));
            }
            other => panic!("Expected InvalidArguments, got {other:?}"),
        }
    }
}
