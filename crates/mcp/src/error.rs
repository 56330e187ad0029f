// Tool error taxonomy shared by the registry, the tools and both transports

use zenodo_core::CoreError;
use zenodo_sdk::ZenodoError;

pub type ToolResult<T> = Result<T, ToolError>;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Dispatch was asked for a name nothing is registered under.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("At least 2 valid records are required for comparison, found {found}")]
    InsufficientRecords { found: usize },

    #[error("Unsupported citation format: {0}")]
    UnsupportedFormat(String),

    #[error("File {file_name:?} not found in record {record_id}")]
    FileNotFound { record_id: String, file_name: String },

    #[error("Tool registration failed: {0}")]
    Registration(String),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] ZenodoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A handler failure surfaced through dispatch.
    #[error("Tool {tool} failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: Box<ToolError>,
    },
}

impl ToolError {
    pub fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Wrap a handler failure. Already-wrapped errors are not wrapped twice.
    pub fn execution(tool: &str, source: ToolError) -> Self {
        match source {
            wrapped @ Self::Execution { .. } => wrapped,
            source => Self::Execution {
                tool: tool.to_string(),
                source: Box::new(source),
            },
        }
    }

    /// The original cause, looking through the execution wrapper.
    pub fn root(&self) -> &ToolError {
        match self {
            Self::Execution { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<CoreError> for ToolError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientRecords { found } => Self::InsufficientRecords { found },
            CoreError::UnsupportedFormat(format) => Self::UnsupportedFormat(format),
        }
    }
}
