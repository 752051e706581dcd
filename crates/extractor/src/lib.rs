//! Symbol and call extraction for Python syntax trees.
//!
//! Given a [`SyntaxTree`](codescope_syntax::SyntaxTree), this crate produces
//! the symbol table of a file and the best-effort call relationships between
//! its functions. Resolution is purely static and limited to one file.

pub mod calls;
pub mod error;
pub mod imports;
pub mod scope;
pub mod symbols;
pub mod types;

pub use calls::{CallExtractor, CallResolver, COMPLEX_EXPRESSION, KWARGS_SPLAT_KEY};
pub use error::{ExtractorError, Result};
pub use imports::ImportMap;
pub use scope::{definitions, Definition, Scope};
pub use symbols::{SymbolExtractor, UNKNOWN_DECORATOR};
pub use types::{
    CallArgument, CallContext, CallKind, CallRelationship, Symbol, SymbolKind, SymbolUpdate,
    Visibility,
};
