use crate::complexity::ComplexityScorer;
use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::patterns::{business_domain, complexity_level, PatternLibrary};
use crate::types::{keys, ChunkKind, CodeChunk};
use codescope_syntax::{NodeKind, SyntaxNode, SyntaxTree};
use serde_json::Value;

/// File being chunked
#[derive(Debug, Clone, Copy)]
pub struct ChunkContext<'a> {
    pub tree: &'a SyntaxTree,
    pub file_path: &'a str,
    pub module_path: &'a str,
}

/// Runs the structural and semantic passes over every class and function,
/// at any depth, in pre-order
pub struct StrategyExecutor<'c> {
    config: &'c ChunkerConfig,
    library: &'c PatternLibrary,
    scorer: &'c ComplexityScorer,
}

impl<'c> StrategyExecutor<'c> {
    pub const fn new(
        config: &'c ChunkerConfig,
        library: &'c PatternLibrary,
        scorer: &'c ComplexityScorer,
    ) -> Self {
        Self {
            config,
            library,
            scorer,
        }
    }

    /// One chunk per definition, tagged with its syntactic shape
    pub fn structural(&self, ctx: ChunkContext<'_>) -> Result<Vec<CodeChunk>> {
        definitions(ctx.tree)
            .map(|node| {
                let mut chunk = self.definition_chunk(ctx, node)?;
                chunk.set_metadata(keys::IS_STRUCTURAL_CHUNK, true);
                chunk.set_metadata(keys::AST_NODE_TYPE, node.kind.label());
                chunk.set_metadata(
                    keys::HAS_DOCSTRING,
                    node.doc_comment().is_some_and(|doc| !doc.is_empty()),
                );
                chunk.set_metadata(keys::DECORATOR_COUNT, node.decorators().len());
                Ok(chunk)
            })
            .collect()
    }

    /// One chunk per definition whose name or doc comment matches the pattern library
    pub fn semantic(&self, ctx: ChunkContext<'_>) -> Result<Vec<CodeChunk>> {
        let mut chunks = Vec::new();
        for node in definitions(ctx.tree) {
            let name = node.name().unwrap_or_default();
            let matched = self.library.classify(name, node.doc_comment());
            let Some(semantic_type) = matched.semantic_type else {
                continue;
            };

            let mut chunk = self.definition_chunk(ctx, node)?;
            let level = complexity_level(chunk.content.split('\n').count(), self.config);
            chunk.set_metadata(keys::SEMANTIC_TYPE, semantic_type);
            chunk.set_metadata(
                keys::BUSINESS_DOMAIN,
                business_domain(name).map_or(Value::Null, Value::from),
            );
            chunk.set_metadata(keys::COMPLEXITY_LEVEL, level);
            chunk.set_metadata(keys::KEY_PHRASES, matched.key_phrases);
            chunk.set_metadata(keys::IS_SEMANTIC_CHUNK, true);
            chunks.push(chunk);
        }
        Ok(chunks)
    }

    fn definition_chunk(&self, ctx: ChunkContext<'_>, node: &SyntaxNode) -> Result<CodeChunk> {
        let kind = match node.kind {
            NodeKind::Class(_) => ChunkKind::Class,
            NodeKind::Function(_) => ChunkKind::Function,
            _ => ChunkKind::Module,
        };
        let content = ctx
            .tree
            .text_for_lines(node.span.start_line, node.span.end_line);
        let mut chunk = CodeChunk::new(
            content,
            kind,
            ctx.file_path,
            ctx.module_path,
            node.span.start_line,
            node.span.end_line,
        )?;
        if let Some(name) = node.name() {
            chunk = chunk.symbol_name(name);
        }
        chunk.complexity = Some(self.scorer.score(&chunk.content));
        Ok(chunk)
    }
}

fn definitions(tree: &SyntaxTree) -> impl Iterator<Item = &SyntaxNode> {
    tree.walk().filter(|node| node.is_definition())
}
