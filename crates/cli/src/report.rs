//! JSON documents written to stdout by each command

use codescope_chunker::CodeChunk;
use codescope_indexer::{AnalysisResult, AnalysisStats, FileAnalysis};
use codescope_store::{CallStatistics, ChunkStatistics, GraphSnapshot, SymbolStatistics};
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct AnalyzeReport<'a> {
    pub root: String,
    pub summary: &'a AnalysisStats,
    pub duration_ms: u64,
    pub stores: StoreStatistics,
    /// Every extracted entity, only with `--full`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<&'a AnalysisResult>,
}

#[derive(Serialize)]
pub(crate) struct StoreStatistics {
    pub symbols: SymbolStatistics,
    pub calls: CallStatistics,
    pub chunks: ChunkStatistics,
}

#[derive(Serialize)]
pub(crate) struct ParseReport<'a> {
    pub file: String,
    pub analysis_type: &'static str,
    #[serde(flatten)]
    pub analysis: &'a FileAnalysis,
}

#[derive(Serialize)]
pub(crate) struct CyclesReport {
    pub detector: &'static str,
    pub cycles: Vec<Vec<String>>,
    pub call_graph: GraphSnapshot,
    pub statistics: CallStatistics,
}

#[derive(Serialize)]
pub(crate) struct SearchReport<'a> {
    pub query: &'a str,
    pub matches: Vec<&'a CodeChunk>,
}

#[derive(Serialize)]
pub(crate) struct ChunksReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub summary: String,
    pub chunks: Vec<CodeChunk>,
}
