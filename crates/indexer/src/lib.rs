//! # Codescope Indexer
//!
//! Project-level analysis of Python codebases.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (*.py, tests/docs/size/exclude filters)
//!     │      └─> Source files
//!     │
//!     ├──> File Parser (per file, failures isolated)
//!     │      └─> symbols, calls, chunks
//!     │
//!     └──> Indexed stores
//!            └─> lookups, call graph, cycles, statistics
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codescope_indexer::{AnalyzerConfig, ProjectAnalyzer};
//!
//! fn main() -> codescope_indexer::Result<()> {
//!     let mut analyzer = ProjectAnalyzer::new(AnalyzerConfig::default())?;
//!     let request = analyzer.request("/path/to/project");
//!     let result = analyzer.analyze(&request)?;
//!
//!     println!("{}", result.statistics);
//!     for cycle in analyzer.calls().find_cycles() {
//!         println!("cycle: {}", cycle.join(" -> "));
//!     }
//!     Ok(())
//! }
//! ```

mod analyzer;
mod config;
mod error;
mod parser;
mod scanner;
mod stats;

pub use analyzer::{AnalysisRequest, AnalysisResult, ChunkFilter, ProjectAnalyzer};
pub use config::{AnalysisMode, AnalyzerConfig, ScanOptions};
pub use error::{IndexerError, Result};
pub use parser::{FileAnalysis, FileParser};
pub use scanner::FileScanner;
pub use stats::AnalysisStats;
