use thiserror::Error;

/// Result type for syntax operations
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors raised while preparing a syntax tree provider
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// Tree-sitter refused the grammar
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Source bytes are not valid UTF-8
    #[error("Source is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

impl SyntaxError {
    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
