use crate::complexity::ComplexityScorer;
use crate::config::{ChunkerConfig, ChunkingMode};
use crate::error::Result;
use crate::merge::merge_chunks;
use crate::patterns::PatternLibrary;
use crate::strategy::{ChunkContext, StrategyExecutor};
use crate::types::CodeChunk;
use codescope_syntax::SyntaxTree;

/// Main chunker interface for processing syntax trees
pub struct Chunker {
    config: ChunkerConfig,
    library: PatternLibrary,
    scorer: ComplexityScorer,
}

impl Chunker {
    /// Create a new chunker, validating the configuration and compiling its patterns
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        let library = PatternLibrary::for_config(&config)?;
        let scorer = ComplexityScorer::new(config.complexity_keywords.clone());
        Ok(Self {
            config,
            library,
            scorer,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk a parsed file according to the configured mode
    pub fn chunk_tree(
        &self,
        tree: &SyntaxTree,
        file_path: &str,
        module_path: &str,
    ) -> Result<Vec<CodeChunk>> {
        let ctx = ChunkContext {
            tree,
            file_path,
            module_path,
        };
        let executor = StrategyExecutor::new(&self.config, &self.library, &self.scorer);

        let chunks = match self.config.mode {
            ChunkingMode::Hybrid => {
                let semantic = executor.semantic(ctx)?;
                let structural = executor.structural(ctx)?;
                merge_chunks(semantic, structural)
            }
            ChunkingMode::Structural => executor.structural(ctx)?,
            ChunkingMode::Semantic => executor.semantic(ctx)?,
        };

        log::debug!(
            "{file_path}: {} chunks ({:?} mode)",
            chunks.len(),
            self.config.mode
        );
        Ok(chunks)
    }

    /// Get chunking statistics
    #[must_use]
    pub fn get_stats(chunks: &[CodeChunk]) -> ChunkingStats {
        let lines: Vec<usize> = chunks.iter().map(CodeChunk::line_count).collect();
        ChunkingStats {
            total_chunks: chunks.len(),
            semantic_chunks: chunks.iter().filter(|c| c.is_semantic()).count(),
            structural_chunks: chunks.iter().filter(|c| c.is_structural()).count(),
            total_lines: lines.iter().sum(),
            total_complexity: chunks.iter().filter_map(|c| c.complexity).sum(),
            min_lines: lines.iter().copied().min().unwrap_or(0),
            max_lines: lines.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Statistics about chunking results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub semantic_chunks: usize,
    pub structural_chunks: usize,
    pub total_lines: usize,
    pub total_complexity: u32,
    pub min_lines: usize,
    pub max_lines: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} ({} semantic, {} structural) | Lines: {} | Complexity: {} | Range: {}-{}",
            self.total_chunks,
            self.semantic_chunks,
            self.structural_chunks,
            self.total_lines,
            self.total_complexity,
            self.min_lines,
            self.max_lines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::keys;
    use codescope_syntax::{PythonTreeProvider, TreeProvider};
    use pretty_assertions::assert_eq;

    const PYTHON_CODE: &str = r#"
def validate_user_token(token):
    """Check a session token."""
    if not token:
        return False
    return True


def compute_total(items):
    return sum(items)
"#;

    fn chunk(config: ChunkerConfig) -> Vec<CodeChunk> {
        let tree = PythonTreeProvider::new()
            .unwrap()
            .parse(PYTHON_CODE)
            .unwrap();
        Chunker::new(config)
            .unwrap()
            .chunk_tree(&tree, "auth.py", "auth")
            .unwrap()
    }

    #[test]
    fn test_hybrid_chunking() {
        let chunks = chunk(ChunkerConfig::default());
        assert_eq!(chunks.len(), 2);

        let token = &chunks[0];
        assert_eq!(token.symbol_name.as_deref(), Some("validate_user_token"));
        assert!(token.is_semantic());
        assert_eq!(token.metadata_str(keys::SEMANTIC_TYPE), Some("authentication"));
        assert_eq!(
            token.metadata_str(keys::BUSINESS_DOMAIN),
            Some("user_management")
        );
        assert_eq!(token.complexity, Some(1));

        let total = &chunks[1];
        assert_eq!(total.symbol_name.as_deref(), Some("compute_total"));
        assert!(total.is_structural());
        assert!(!total.is_semantic());
    }

    #[test]
    fn test_modes() {
        assert_eq!(chunk(ChunkerConfig::structural_only()).len(), 2);
        let semantic = chunk(ChunkerConfig::semantic_only());
        assert_eq!(semantic.len(), 1);
        assert!(semantic[0].is_semantic());
    }

    #[test]
    fn test_no_duplicate_pairs() {
        let chunks = chunk(ChunkerConfig::default());
        for (i, a) in chunks.iter().enumerate() {
            for b in &chunks[i + 1..] {
                assert!(!(a.symbol_name == b.symbol_name && a.start_line == b.start_line));
            }
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ChunkerConfig {
            medium_line_threshold: 100,
            complex_line_threshold: 10,
            ..Default::default()
        };
        assert!(Chunker::new(config).is_err());
    }

    #[test]
    fn test_chunking_stats() {
        let chunks = chunk(ChunkerConfig::default());
        let stats = Chunker::get_stats(&chunks);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.semantic_chunks, 1);
        assert_eq!(stats.structural_chunks, 1);
        assert_eq!(stats.min_lines, 2);
        assert_eq!(stats.max_lines, 5);
        assert!(stats.to_string().starts_with("Chunks: 2"));
    }
}
