use serde::Serialize;

/// Source location of a node (lines are 1-indexed and inclusive, column is a 0-indexed byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
    pub column: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start_line: usize, end_line: usize, column: usize) -> Self {
        Self {
            start_line,
            end_line,
            column,
        }
    }

    /// Number of lines covered by the span
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// A parsed source file: the node tree plus the text it was built from
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: SyntaxNode,
    source: String,
}

impl SyntaxTree {
    #[must_use]
    pub fn new(root: SyntaxNode, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> &SyntaxNode {
        &self.root
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source text of lines `start..=end` (1-indexed), joined with `\n`
    #[must_use]
    pub fn text_for_lines(&self, start: usize, end: usize) -> String {
        if start == 0 || end < start {
            return String::new();
        }
        self.source
            .lines()
            .skip(start - 1)
            .take(end - start + 1)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pre-order traversal over every node, starting at the module root
    pub fn walk(&self) -> Preorder<'_> {
        self.root.preorder()
    }
}

/// A node of the syntax tree.
///
/// Only nodes that matter for structure extraction are kept. Everything else is
/// folded into [`NodeKind::Other`] containers, and those are pruned when nothing
/// interesting lives beneath them.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    #[must_use]
    pub const fn new(kind: NodeKind, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            span,
            children,
        }
    }

    /// Declared name for classes and functions
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Class(class) => Some(&class.name),
            NodeKind::Function(function) => Some(&function.name),
            _ => None,
        }
    }

    /// Cleaned doc comment for classes and functions
    #[must_use]
    pub fn doc_comment(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Class(class) => class.doc_comment.as_deref(),
            NodeKind::Function(function) => function.doc_comment.as_deref(),
            _ => None,
        }
    }

    /// Decorator expressions for classes and functions
    #[must_use]
    pub fn decorators(&self) -> &[Expr] {
        match &self.kind {
            NodeKind::Class(class) => &class.decorators,
            NodeKind::Function(function) => &function.decorators,
            _ => &[],
        }
    }

    /// Whether this node is a class or function definition
    #[must_use]
    pub const fn is_definition(&self) -> bool {
        matches!(self.kind, NodeKind::Class(_) | NodeKind::Function(_))
    }

    /// Pre-order traversal including this node
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Pre-order traversal of everything below this node
    pub fn descendants(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.preorder().skip(1)
    }
}

/// Closed set of node kinds the extractors dispatch on
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Module,
    Class(ClassDef),
    Function(FunctionDef),
    Import(Vec<ImportAlias>),
    ImportFrom(ImportFrom),
    Call(CallSite),
    /// `name = value` with a single plain name target
    Assign(Assignment),
    /// Any other construct, labelled with the grammar's node kind
    Other(String),
}

impl NodeKind {
    /// Short label used in logs and chunk metadata
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Module => "module",
            Self::Class(_) => "class_definition",
            Self::Function(function) if function.is_async => "async_function_definition",
            Self::Function(_) => "function_definition",
            Self::Import(_) => "import",
            Self::ImportFrom(_) => "import_from",
            Self::Call(_) => "call",
            Self::Assign(_) => "assignment",
            Self::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub doc_comment: Option<String>,
    pub decorators: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub is_async: bool,
    pub parameters: Parameters,
    pub doc_comment: Option<String>,
    pub decorators: Vec<Expr>,
}

/// Parameter names of a function definition, grouped by binding style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    /// Parameters declared before `/`
    pub positional_only: Vec<String>,
    /// Positional-or-keyword parameters in declaration order
    pub positional: Vec<String>,
    /// `*args` name
    pub vararg: Option<String>,
    /// Parameters declared after `*` or `*args`
    pub keyword_only: Vec<String>,
    /// `**kwargs` name
    pub kwarg: Option<String>,
}

/// `name [as asname]` inside an import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAlias {
    pub name: String,
    pub asname: Option<String>,
}

impl ImportAlias {
    /// Name bound in the importing module
    #[must_use]
    pub fn bound_name(&self) -> &str {
        self.asname.as_deref().unwrap_or(&self.name)
    }
}

/// `from module import names`; `module` is `None` for a bare relative import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFrom {
    pub module: Option<String>,
    pub names: Vec<ImportAlias>,
}

/// A call expression
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub callee: Expr,
    pub arguments: Vec<Expr>,
    pub keywords: Vec<Keyword>,
}

/// Simple assignment to a local name
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: String,
    pub value: Expr,
}

/// `name=value`, or `**value` when `name` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: Option<String>,
    pub value: Expr,
}

/// Expression shapes the resolvers care about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Name(String),
    Attribute { value: Box<Expr>, attr: String },
    Call { func: Box<Expr> },
    /// Literal constant, already rendered as text
    Constant(String),
    Other,
}

impl Expr {
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// Depth-first pre-order iterator over syntax nodes
pub struct Preorder<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
