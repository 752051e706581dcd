use crate::config::AnalysisMode;
use crate::error::Result;
use codescope_chunker::{Chunker, ChunkerConfig, CodeChunk};
use codescope_extractor::{CallExtractor, CallRelationship, ImportMap, Symbol, SymbolExtractor};
use codescope_syntax::{PythonTreeProvider, SyntaxTree, TreeProvider};
use serde::Serialize;
use std::path::Path;

/// Everything extracted from one source file
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileAnalysis {
    pub symbols: Vec<Symbol>,
    pub calls: Vec<CallRelationship>,
    pub chunks: Vec<CodeChunk>,
    /// Lines in the source, counted even when nothing could be extracted
    #[serde(skip)]
    pub line_count: usize,
}

impl FileAnalysis {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.calls.is_empty() && self.chunks.is_empty()
    }
}

/// Per-file facade: syntax tree → symbols, calls and chunks
pub struct FileParser {
    provider: Box<dyn TreeProvider>,
    symbols: SymbolExtractor,
    calls: CallExtractor,
    chunker: Chunker,
    mode: AnalysisMode,
}

impl FileParser {
    /// Create a parser backed by tree-sitter-python
    pub fn new(mode: AnalysisMode, config: ChunkerConfig) -> Result<Self> {
        Self::with_provider(Box::new(PythonTreeProvider::new()?), mode, config)
    }

    pub fn with_provider(
        provider: Box<dyn TreeProvider>,
        mode: AnalysisMode,
        config: ChunkerConfig,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            symbols: SymbolExtractor::new(),
            calls: CallExtractor::new(),
            chunker: Chunker::new(config)?,
            mode,
        })
    }

    #[must_use]
    pub const fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Parse source text; any failure yields an empty analysis
    #[must_use]
    pub fn parse_source(&self, source: &str, file_path: &str) -> FileAnalysis {
        self.try_parse_source(source, file_path)
            .unwrap_or_else(|e| {
                log::warn!("{file_path}: {e}");
                FileAnalysis::default()
            })
    }

    /// Read and parse a file; any failure yields an empty analysis
    #[must_use]
    pub fn parse_file(&self, path: &Path) -> FileAnalysis {
        self.try_parse_file(path).unwrap_or_else(|e| {
            log::warn!("{}: {e}", path.display());
            FileAnalysis::default()
        })
    }

    /// Parse source text. A syntax error yields an empty analysis; entity
    /// validation failures are returned.
    pub fn try_parse_source(&self, source: &str, file_path: &str) -> Result<FileAnalysis> {
        self.try_parse_source_as(source, file_path, self.mode)
    }

    /// Read and parse a file. IO errors and validation failures are returned;
    /// invalid UTF-8 and syntax errors yield an empty analysis.
    pub fn try_parse_file(&self, path: &Path) -> Result<FileAnalysis> {
        self.try_parse_file_as(path, self.mode)
    }

    /// Like [`FileParser::try_parse_file`] with an explicit mode
    pub fn try_parse_file_as(&self, path: &Path, mode: AnalysisMode) -> Result<FileAnalysis> {
        let bytes = std::fs::read(path)?;
        let file_path = path.to_string_lossy();
        let mut analysis = match self.provider.parse_bytes(&bytes) {
            Some(tree) => self.analyze(&tree, &file_path, mode)?,
            None => {
                log::debug!("{file_path}: not parseable, skipping");
                FileAnalysis::default()
            }
        };
        analysis.line_count = line_count(&bytes);
        Ok(analysis)
    }

    /// Like [`FileParser::try_parse_source`] with an explicit mode
    pub fn try_parse_source_as(
        &self,
        source: &str,
        file_path: &str,
        mode: AnalysisMode,
    ) -> Result<FileAnalysis> {
        let mut analysis = match self.provider.parse(source) {
            Some(tree) => self.analyze(&tree, file_path, mode)?,
            None => {
                log::debug!("{file_path}: not parseable, skipping");
                FileAnalysis::default()
            }
        };
        analysis.line_count = line_count(source.as_bytes());
        Ok(analysis)
    }

    fn analyze(&self, tree: &SyntaxTree, file_path: &str, mode: AnalysisMode) -> Result<FileAnalysis> {
        let module_path = module_path(file_path);
        let symbols = self.symbols.extract(tree, file_path, &module_path)?;
        let imports = ImportMap::from_tree(tree);
        let calls = self.calls.extract(tree, &imports, file_path)?;

        let chunks = match mode {
            AnalysisMode::Ast => Vec::new(),
            AnalysisMode::Hybrid => self.chunker.chunk_tree(tree, file_path, &module_path)?,
            AnalysisMode::Semantic => self
                .chunker
                .chunk_tree(tree, file_path, &module_path)?
                .into_iter()
                .filter(CodeChunk::is_semantic)
                .collect(),
        };

        log::debug!(
            "{file_path}: {} symbols, {} calls, {} chunks ({mode})",
            symbols.len(),
            calls.len(),
            chunks.len()
        );
        Ok(FileAnalysis {
            symbols,
            calls,
            chunks,
            line_count: 0,
        })
    }
}

/// Line count with `str::lines` semantics: a trailing newline does not start a new line
fn line_count(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        None | Some(b'\n') => newlines,
        Some(_) => newlines + 1,
    }
}

/// Module path of a file: its stem
fn module_path(file_path: &str) -> String {
    Path::new(file_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
