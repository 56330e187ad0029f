// MCP (Model Context Protocol) server exposing Zenodo records as tools
// to agent clients over stdio.

pub mod cache;
pub mod error;
pub mod protocol;
pub mod server;
pub mod settings;
pub mod tools;

pub use cache::{CachedDispatcher, ResponseCache};
pub use error::{ToolError, ToolResult};
pub use server::McpServer;
pub use settings::ServerSettings;
pub use tools::{build_registry, Tool, ToolRegistry};
