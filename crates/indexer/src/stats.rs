use codescope_chunker::CodeChunk;
use codescope_extractor::{CallRelationship, Symbol};
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics about one project analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisStats {
    /// Number of files parsed successfully
    pub files: usize,

    /// Total lines across parsed files
    pub total_lines: usize,

    pub total_symbols: usize,
    pub total_calls: usize,
    pub total_chunks: usize,

    pub symbol_kinds: BTreeMap<String, usize>,
    pub call_kinds: BTreeMap<String, usize>,
    pub chunk_kinds: BTreeMap<String, usize>,

    pub average_complexity: f64,
    pub max_complexity: u32,
    pub min_complexity: u32,

    /// Per-file failures, as `path: reason`
    pub errors: Vec<String>,
}

impl AnalysisStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, lines: usize) {
        self.files += 1;
        self.total_lines += lines;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Fill the totals and distributions from the collected entities
    pub fn summarize(&mut self, symbols: &[Symbol], calls: &[CallRelationship], chunks: &[CodeChunk]) {
        self.total_symbols = symbols.len();
        self.total_calls = calls.len();
        self.total_chunks = chunks.len();
        self.symbol_kinds = count(symbols.iter().map(|s| s.kind.as_str()));
        self.call_kinds = count(calls.iter().map(|c| c.kind.as_str()));
        self.chunk_kinds = count(chunks.iter().map(|c| c.kind.as_str()));

        let complexities: Vec<u32> = chunks.iter().filter_map(|c| c.complexity).collect();
        if !complexities.is_empty() {
            let total: u32 = complexities.iter().sum();
            self.average_complexity = f64::from(total) / complexities.len() as f64;
            self.max_complexity = complexities.iter().copied().max().unwrap_or(0);
            self.min_complexity = complexities.iter().copied().min().unwrap_or(0);
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl std::fmt::Display for AnalysisStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Files: {} ({} lines) | Symbols: {} | Calls: {} | Chunks: {} | Errors: {}",
            self.files,
            self.total_lines,
            self.total_symbols,
            self.total_calls,
            self.total_chunks,
            self.errors.len()
        )
    }
}

fn count<'a>(names: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for name in names {
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts
}
