//! Syntax trees for Python source.
//!
//! Parses source with tree-sitter and lowers the result into a small closed
//! node model that the extractors and chunkers dispatch on.
//!
//! # Example
//!
//! ```no_run
//! use codescope_syntax::{NodeKind, PythonTreeProvider, TreeProvider};
//!
//! let provider = PythonTreeProvider::new()?;
//! if let Some(tree) = provider.parse("def hello():\n    print('hi')\n") {
//!     for node in tree.walk() {
//!         if let NodeKind::Function(function) = &node.kind {
//!             println!("{} at line {}", function.name, node.span.start_line);
//!         }
//!     }
//! }
//! # Ok::<(), codescope_syntax::SyntaxError>(())
//! ```

pub mod docstring;
pub mod error;
pub mod node;
pub mod provider;
pub mod python;

pub use error::{Result, SyntaxError};
pub use node::{
    Assignment, CallSite, ClassDef, Expr, FunctionDef, ImportAlias, ImportFrom, Keyword, NodeKind,
    Parameters, Preorder, Span, SyntaxNode, SyntaxTree,
};
pub use provider::TreeProvider;
pub use python::PythonTreeProvider;
