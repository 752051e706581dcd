use crate::config::{AnalysisMode, AnalyzerConfig, ScanOptions};
use crate::error::{IndexerError, Result};
use crate::parser::{FileAnalysis, FileParser};
use crate::scanner::FileScanner;
use crate::stats::AnalysisStats;
use codescope_chunker::CodeChunk;
use codescope_extractor::{CallRelationship, Symbol};
use codescope_store::{CallStore, ChunkStore, CycleDetector, SymbolStore};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

/// One project analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub root: PathBuf,
    pub scan: ScanOptions,
}

impl AnalysisRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scan: ScanOptions::default(),
        }
    }

    #[must_use]
    pub fn scan(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub symbols: Vec<Symbol>,
    pub calls: Vec<CallRelationship>,
    pub chunks: Vec<CodeChunk>,
    pub statistics: AnalysisStats,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Restricts a file's chunks to one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFilter {
    Semantic,
    Structural,
}

impl ChunkFilter {
    #[must_use]
    pub fn matches(self, chunk: &CodeChunk) -> bool {
        match self {
            Self::Semantic => chunk.is_semantic(),
            Self::Structural => chunk.is_structural(),
        }
    }
}

impl fmt::Display for ChunkFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Semantic => "semantic",
            Self::Structural => "structural",
        })
    }
}

impl FromStr for ChunkFilter {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "structural" => Ok(Self::Structural),
            _ => Err(IndexerError::UnknownVariant {
                kind: "chunk filter",
                value: s.to_string(),
            }),
        }
    }
}

/// Scans a project, parses every file and keeps the results in indexed stores
pub struct ProjectAnalyzer {
    config: AnalyzerConfig,
    parser: FileParser,
    symbols: SymbolStore,
    calls: CallStore,
    chunks: ChunkStore,
}

impl ProjectAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let parser = FileParser::new(config.mode, config.chunker.clone())?;
        Ok(Self {
            config,
            parser,
            symbols: SymbolStore::new(),
            calls: CallStore::new(),
            chunks: ChunkStore::new(),
        })
    }

    /// Use `detector` for call cycle reporting
    #[must_use]
    pub fn cycle_detector(mut self, detector: impl CycleDetector + 'static) -> Self {
        self.calls.set_detector(detector);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Request for `root` with the configured scan options
    pub fn request(&self, root: impl Into<PathBuf>) -> AnalysisRequest {
        AnalysisRequest::new(root).scan(self.config.scan.clone())
    }

    /// Clear the stores, then scan, parse and store every file under the request root
    pub fn analyze(&mut self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let start = Instant::now();
        if !request.root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                request.root.display()
            )));
        }

        self.clear();
        let files = FileScanner::new(&request.root, request.scan.clone()).scan();

        let mut stats = AnalysisStats::new();
        let mut collected = FileAnalysis::default();
        for path in &files {
            match self.parser.try_parse_file(path) {
                Ok(analysis) => {
                    stats.add_file(analysis.line_count);
                    collected.symbols.extend(analysis.symbols);
                    collected.calls.extend(analysis.calls);
                    collected.chunks.extend(analysis.chunks);
                }
                Err(e) => {
                    log::warn!("Failed to analyze {}: {e}", path.display());
                    stats.add_error(format!("{}: {e}", path.display()));
                }
            }
        }

        self.store(&collected);
        stats.summarize(&collected.symbols, &collected.calls, &collected.chunks);
        let duration = start.elapsed();
        log::info!("{stats} in {duration:?}");

        Ok(AnalysisResult {
            symbols: collected.symbols,
            calls: collected.calls,
            chunks: collected.chunks,
            statistics: stats,
            duration,
        })
    }

    /// Parse and store a single file with an explicit mode
    pub fn analyze_file(&mut self, path: &Path, mode: AnalysisMode) -> Result<FileAnalysis> {
        ensure_file(path)?;
        let analysis = self.parser.try_parse_file_as(path, mode)?;
        self.store(&analysis);
        Ok(analysis)
    }

    /// Semantic chunks in the stores matching `query`
    #[must_use]
    pub fn search_semantic(&self, query: &str) -> Vec<&CodeChunk> {
        let query = query.to_lowercase();
        self.chunks
            .get_all()
            .into_iter()
            .filter(|chunk| chunk.is_semantic() && matches_query(chunk, &query))
            .collect()
    }

    /// Semantic chunks of one freshly parsed file matching `query`
    pub fn search_file(&self, path: &Path, query: &str) -> Result<Vec<CodeChunk>> {
        let query = query.to_lowercase();
        let chunks = self.chunks_for_file(path, Some(ChunkFilter::Semantic))?;
        Ok(chunks
            .into_iter()
            .filter(|chunk| matches_query(chunk, &query))
            .collect())
    }

    /// Hybrid chunks of one freshly parsed file, optionally restricted to one pass
    pub fn chunks_for_file(&self, path: &Path, filter: Option<ChunkFilter>) -> Result<Vec<CodeChunk>> {
        ensure_file(path)?;
        let analysis = self.parser.try_parse_file_as(path, AnalysisMode::Hybrid)?;
        Ok(analysis
            .chunks
            .into_iter()
            .filter(|chunk| filter.map_or(true, |f| f.matches(chunk)))
            .collect())
    }

    #[must_use]
    pub const fn symbols(&self) -> &SymbolStore {
        &self.symbols
    }

    #[must_use]
    pub const fn calls(&self) -> &CallStore {
        &self.calls
    }

    #[must_use]
    pub const fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.calls.clear();
        self.chunks.clear();
    }

    fn store(&mut self, analysis: &FileAnalysis) {
        for symbol in &analysis.symbols {
            self.symbols.save(symbol.clone());
        }
        for call in &analysis.calls {
            let target = self.symbols.find_by_name(&call.callee).map(Symbol::key);
            if let Some(key) = target {
                self.symbols.add_reference(key, call.caller.clone());
            }
            self.calls.save(call.clone());
        }
        for chunk in &analysis.chunks {
            self.chunks.save(chunk.clone());
        }
    }
}

/// Case-insensitive match of a lowercased query against a chunk's string
/// metadata, its key phrases, or its content
fn matches_query(chunk: &CodeChunk, query: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(query);
    let in_metadata = chunk.metadata.values().any(|value| match value {
        Value::String(text) => contains(text.as_str()),
        Value::Array(items) => items.iter().filter_map(Value::as_str).any(contains),
        _ => false,
    });
    in_metadata || contains(chunk.content.as_str())
}

fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IndexerError::InvalidPath(format!(
            "File not found: {}",
            path.display()
        )))
    }
}
