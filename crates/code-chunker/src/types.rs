use crate::error::{ChunkerError, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Metadata keys written by the chunking passes
pub mod keys {
    pub const IS_SEMANTIC_CHUNK: &str = "is_semantic_chunk";
    pub const IS_STRUCTURAL_CHUNK: &str = "is_structural_chunk";
    pub const SEMANTIC_TYPE: &str = "semantic_type";
    pub const BUSINESS_DOMAIN: &str = "business_domain";
    pub const COMPLEXITY_LEVEL: &str = "complexity_level";
    pub const KEY_PHRASES: &str = "key_phrases";
    pub const AST_NODE_TYPE: &str = "ast_node_type";
    pub const HAS_DOCSTRING: &str = "has_docstring";
    pub const DECORATOR_COUNT: &str = "decorator_count";
}

/// A contiguous span of source code with retrieval metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CodeChunk {
    /// The actual code content
    pub content: String,

    pub kind: ChunkKind,

    /// Source file path
    pub file_path: String,

    /// Module the file belongs to (the file stem)
    pub module_path: String,

    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed, inclusive)
    pub end_line: usize,

    /// Name of the class or function the chunk covers
    pub symbol_name: Option<String>,

    /// Free-form metadata written by the chunking passes
    pub metadata: BTreeMap<String, Value>,

    /// Callees, deduplicated on add
    pub calls: Vec<String>,

    /// Callers, deduplicated on add
    pub called_by: Vec<String>,

    pub dependencies: BTreeSet<String>,

    /// Decision point count, see [`ComplexityScorer`](crate::ComplexityScorer)
    pub complexity: Option<u32>,

    pub created_at: DateTime<Utc>,
}

impl CodeChunk {
    /// Create a new code chunk, rejecting empty content, an empty file path and
    /// inverted line ranges
    pub fn new(
        content: impl Into<String>,
        kind: ChunkKind,
        file_path: impl Into<String>,
        module_path: impl Into<String>,
        start_line: usize,
        end_line: usize,
    ) -> Result<Self> {
        let content = content.into();
        let file_path = file_path.into();
        if content.is_empty() {
            return Err(ChunkerError::EmptyContent);
        }
        if start_line > end_line {
            return Err(ChunkerError::InvalidBoundaries {
                start: start_line,
                end: end_line,
            });
        }
        if file_path.is_empty() {
            return Err(ChunkerError::EmptyFilePath);
        }
        Ok(Self {
            content,
            kind,
            file_path,
            module_path: module_path.into(),
            start_line,
            end_line,
            symbol_name: None,
            metadata: BTreeMap::new(),
            calls: Vec::new(),
            called_by: Vec::new(),
            dependencies: BTreeSet::new(),
            complexity: None,
            created_at: Utc::now(),
        })
    }

    /// Builder: set symbol name
    #[must_use]
    pub fn symbol_name(mut self, name: impl Into<String>) -> Self {
        self.symbol_name = Some(name.into());
        self
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Number of Unicode scalar values in the content
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.kind == ChunkKind::Partial
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        self.kind == ChunkKind::Function
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        self.kind == ChunkKind::Class
    }

    /// Produced by the semantic pass
    #[must_use]
    pub fn is_semantic(&self) -> bool {
        self.metadata_bool(keys::IS_SEMANTIC_CHUNK)
    }

    /// Produced by the structural pass
    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.metadata_bool(keys::IS_STRUCTURAL_CHUNK)
    }

    /// Hex SHA-256 of the content
    #[must_use]
    pub fn content_hash(&self) -> String {
        let digest = Sha256::digest(self.content.as_bytes());
        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    /// Check if chunk contains a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    pub fn add_call(&mut self, callee: impl Into<String>) {
        let callee = callee.into();
        if !self.calls.contains(&callee) {
            self.calls.push(callee);
        }
    }

    pub fn add_called_by(&mut self, caller: impl Into<String>) {
        let caller = caller.into();
        if !self.called_by.contains(&caller) {
            self.called_by.push(caller);
        }
    }

    pub fn add_dependency(&mut self, dependency: impl Into<String>) {
        self.dependencies.insert(dependency.into());
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// String metadata value, `None` when absent or not a string
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    fn metadata_bool(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Retrieval document: the content plus a flat metadata map of the chunk's
    /// fields merged with its metadata entries
    #[must_use]
    pub fn to_document(&self) -> ChunkDocument {
        let mut metadata = Map::new();
        metadata.insert("file_path".into(), self.file_path.clone().into());
        metadata.insert("module_path".into(), self.module_path.clone().into());
        metadata.insert("type".into(), self.kind.as_str().into());
        metadata.insert(
            "name".into(),
            self.symbol_name.clone().map_or(Value::Null, Value::from),
        );
        metadata.insert("start_line".into(), self.start_line.into());
        metadata.insert("end_line".into(), self.end_line.into());
        metadata.insert("calls".into(), self.calls.clone().into());
        metadata.insert("called_by".into(), self.called_by.clone().into());
        metadata.insert(
            "dependencies".into(),
            self.dependencies.iter().cloned().collect::<Vec<_>>().into(),
        );
        metadata.insert(
            "complexity".into(),
            self.complexity.map_or(Value::Null, Value::from),
        );
        metadata.insert("lines_count".into(), self.line_count().into());
        metadata.insert("characters_count".into(), self.character_count().into());
        metadata.insert("is_partial".into(), self.is_partial().into());
        metadata.insert("content_hash".into(), self.content_hash().into());
        for (key, value) in &self.metadata {
            metadata.insert(key.clone(), value.clone());
        }

        ChunkDocument {
            page_content: self.content.clone(),
            metadata,
        }
    }
}

#[derive(Serialize)]
struct ChunkView<'a> {
    content: &'a str,
    kind: ChunkKind,
    file_path: &'a str,
    module_path: &'a str,
    start_line: usize,
    end_line: usize,
    symbol_name: Option<&'a str>,
    metadata: &'a BTreeMap<String, Value>,
    calls: &'a [String],
    called_by: &'a [String],
    dependencies: &'a BTreeSet<String>,
    complexity: Option<u32>,
    created_at: DateTime<Utc>,
    line_count: usize,
    character_count: usize,
    is_partial: bool,
    content_hash: String,
}

impl Serialize for CodeChunk {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ChunkView {
            content: &self.content,
            kind: self.kind,
            file_path: &self.file_path,
            module_path: &self.module_path,
            start_line: self.start_line,
            end_line: self.end_line,
            symbol_name: self.symbol_name.as_deref(),
            metadata: &self.metadata,
            calls: &self.calls,
            called_by: &self.called_by,
            dependencies: &self.dependencies,
            complexity: self.complexity,
            created_at: self.created_at,
            line_count: self.line_count(),
            character_count: self.character_count(),
            is_partial: self.is_partial(),
            content_hash: self.content_hash(),
        }
        .serialize(serializer)
    }
}

/// Chunk rendered for a retrieval index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkDocument {
    pub page_content: String,
    pub metadata: Map<String, Value>,
}

/// Type of code chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Function,
    Class,
    Module,
    LineChunk,
    Partial,
}

impl ChunkKind {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Module => "module",
            Self::LineChunk => "line_chunk",
            Self::Partial => "partial",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk() -> CodeChunk {
        CodeChunk::new("def f():\n    pass", ChunkKind::Function, "a.py", "a", 10, 11)
            .unwrap()
            .symbol_name("f")
    }

    #[test]
    fn test_chunk_validation() {
        assert!(matches!(
            CodeChunk::new("", ChunkKind::Function, "a.py", "a", 1, 1),
            Err(ChunkerError::EmptyContent)
        ));
        assert!(matches!(
            CodeChunk::new("x", ChunkKind::Function, "a.py", "a", 3, 2),
            Err(ChunkerError::InvalidBoundaries { start: 3, end: 2 })
        ));
        assert!(matches!(
            CodeChunk::new("x", ChunkKind::Function, "", "a", 1, 1),
            Err(ChunkerError::EmptyFilePath)
        ));
    }

    #[test]
    fn test_chunk_counts() {
        let chunk = CodeChunk::new("héllo", ChunkKind::Partial, "a.py", "a", 4, 4).unwrap();
        assert_eq!(chunk.line_count(), 1);
        assert_eq!(chunk.character_count(), 5);
        assert!(chunk.is_partial());
        assert!(chunk.contains_line(4));
        assert!(!chunk.contains_line(5));
    }

    #[test]
    fn test_relations_are_deduplicated() {
        let mut chunk = chunk();
        chunk.add_call("g");
        chunk.add_call("g");
        chunk.add_called_by("main");
        chunk.add_called_by("main");
        chunk.add_dependency("os");
        chunk.add_dependency("os");
        assert_eq!(chunk.calls, vec!["g"]);
        assert_eq!(chunk.called_by, vec!["main"]);
        assert_eq!(chunk.dependencies.len(), 1);
    }

    #[test]
    fn test_content_hash_is_stable() {
        let a = chunk();
        let b = chunk();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }

    #[test]
    fn test_document_merges_metadata() {
        let mut chunk = chunk();
        chunk.set_metadata(keys::SEMANTIC_TYPE, "api");
        chunk.complexity = Some(2);
        let doc = chunk.to_document();
        assert_eq!(doc.page_content, chunk.content);
        assert_eq!(doc.metadata["type"], "function");
        assert_eq!(doc.metadata["name"], "f");
        assert_eq!(doc.metadata["semantic_type"], "api");
        assert_eq!(doc.metadata["complexity"], 2);
        assert_eq!(doc.metadata["lines_count"], 2);
    }

    #[test]
    fn test_serialization_includes_derived_fields() {
        let json = serde_json::to_value(chunk()).unwrap();
        assert_eq!(json["kind"], "function");
        assert_eq!(json["line_count"], 2);
        assert_eq!(json["is_partial"], false);
        assert!(json["content_hash"].as_str().is_some());
    }
}
