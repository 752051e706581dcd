use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Syntax error: {0}")]
    SyntaxError(#[from] codescope_syntax::SyntaxError),

    #[error("Extraction error: {0}")]
    ExtractorError(#[from] codescope_extractor::ExtractorError),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] codescope_chunker::ChunkerError),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_source_message() {
        let chunker: IndexerError =
            codescope_chunker::ChunkerError::InvalidConfig("min > max".to_string()).into();
        assert!(matches!(chunker, IndexerError::ChunkerError(_)));
        assert_eq!(
            chunker.to_string(),
            "Chunker error: Invalid configuration: min > max"
        );

        let io: IndexerError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io.to_string(), "IO error: gone");
    }
}
