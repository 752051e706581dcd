use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Validation failures raised while constructing extracted entities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// Symbol name is empty
    #[error("Symbol name cannot be empty")]
    EmptyName,

    /// Start line is after end line
    #[error("Invalid line range: start {start} > end {end}")]
    InvalidRange { start: usize, end: usize },

    /// Caller or callee of a call is empty
    #[error("Call {0} cannot be empty")]
    EmptyCallTarget(&'static str),

    /// Line numbers are 1-based
    #[error("Invalid line number: {0}")]
    InvalidLine(usize),
}

impl ExtractorError {
    /// Create an invalid range error
    pub const fn invalid_range(start: usize, end: usize) -> Self {
        Self::InvalidRange { start, end }
    }
}
