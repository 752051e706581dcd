//! In-memory indexed stores for extracted symbols, calls and chunks.
//!
//! ```text
//! SymbolStore   key: module.qualified_name ─┬─ by kind / module / file
//!                                           └─ references → find_unused
//! CallStore     CallId ─┬─ by caller / callee / kind / file
//!                       └─ CallGraph (forward + reverse, refcounted edges)
//!                              └─ CycleDetector (PathDfs | Tarjan)
//! ChunkStore    ChunkId ── by kind / file / module / symbol / complexity
//! ```
//!
//! Every store owns one primary collection. Secondary indices hold handles
//! and are updated through the same insert/remove helpers on each save and
//! delete. Stores are plain owned values; wrap them in a mutex to share them
//! across threads.

mod calls;
mod chunks;
mod cycles;
mod error;
mod graph;
mod index;
mod symbols;

pub use calls::{CallId, CallStatistics, CallStore};
pub use chunks::{ChunkId, ChunkStatistics, ChunkStore, ComplexityStatistics, Summary};
pub use cycles::{CycleDetector, PathDfsDetector, TarjanDetector};
pub use error::{Result, StoreError};
pub use graph::{CallGraph, GraphSnapshot};
pub use symbols::{SymbolId, SymbolStatistics, SymbolStore};
