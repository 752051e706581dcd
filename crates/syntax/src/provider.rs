use crate::error::Result;
use crate::node::SyntaxTree;

/// Source of syntax trees for one language.
///
/// Implementations hold no per-parse state, so a single provider can be shared
/// between threads and reused across files.
pub trait TreeProvider: Send + Sync {
    /// Parse source text. Returns `None` when the source has a syntax error.
    fn parse(&self, source: &str) -> Option<SyntaxTree>;

    /// Parse raw bytes. Invalid UTF-8 is an [`SyntaxError::InvalidEncoding`]
    /// error; a syntax error is `Ok(None)`.
    ///
    /// [`SyntaxError::InvalidEncoding`]: crate::SyntaxError::InvalidEncoding
    fn try_parse_bytes(&self, bytes: &[u8]) -> Result<Option<SyntaxTree>> {
        let source = std::str::from_utf8(bytes)?;
        Ok(self.parse(source))
    }

    /// Parse raw bytes; anything that is not valid UTF-8 yields `None`
    fn parse_bytes(&self, bytes: &[u8]) -> Option<SyntaxTree> {
        self.try_parse_bytes(bytes).unwrap_or_else(|e| {
            log::debug!("Rejecting source: {e}");
            None
        })
    }
}
