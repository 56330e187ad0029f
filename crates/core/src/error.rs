// Errors raised by the pure record algorithms

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// A comparison needs at least two records
    #[error("at least two valid records are required for comparison, got {found}")]
    InsufficientRecords { found: usize },

    /// Citation format string not recognised
    #[error("unsupported citation format: {0}")]
    UnsupportedFormat(String),
}
