//! # Codescope Chunker
//!
//! Splits parsed Python files into retrievable code chunks.
//!
//! ## Architecture
//!
//! ```text
//! SyntaxTree
//!     │
//!     ├──> Structural pass: one chunk per class/function
//!     │      └─ ast_node_type, has_docstring, decorator_count
//!     │
//!     ├──> Semantic pass: pattern library over names and doc comments
//!     │      └─ semantic_type, business_domain, complexity_level, key_phrases
//!     │
//!     └──> Merge: semantic chunks first, then unshadowed structural chunks
//!            └─ every chunk gets a decision-point complexity score
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codescope_chunker::{Chunker, ChunkerConfig};
//! use codescope_syntax::{PythonTreeProvider, TreeProvider};
//!
//! let provider = PythonTreeProvider::new().unwrap();
//! let tree = provider.parse("def process_payment(x):\n    return x\n").unwrap();
//!
//! let chunker = Chunker::new(ChunkerConfig::default()).unwrap();
//! for chunk in chunker.chunk_tree(&tree, "billing.py", "billing").unwrap() {
//!     println!("Chunk at lines {}-{}: {}",
//!              chunk.start_line, chunk.end_line, chunk.symbol_name.unwrap_or_default());
//! }
//! ```

mod chunker;
mod complexity;
mod config;
mod error;
mod merge;
mod patterns;
mod strategy;
mod types;

pub use chunker::{Chunker, ChunkingStats};
pub use complexity::ComplexityScorer;
pub use config::{default_patterns, ChunkerConfig, ChunkingMode, PatternCategory};
pub use error::{ChunkerError, Result};
pub use merge::merge_chunks;
pub use patterns::{business_domain, complexity_level, PatternLibrary, SemanticMatch};
pub use strategy::{ChunkContext, StrategyExecutor};
pub use types::{keys, ChunkDocument, ChunkKind, CodeChunk};
