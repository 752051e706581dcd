use crate::error::{ExtractorError, Result};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Kind of declared symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Module,
    Variable,
    Import,
}

impl SymbolKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Module => "module",
            Self::Variable => "variable",
            Self::Import => "import",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    /// Naming convention: a leading underscore marks a private name
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.starts_with('_') {
            Self::Private
        } else {
            Self::Public
        }
    }
}

/// A declared symbol (class, function, method)
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub module_path: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// End line (1-indexed, inclusive)
    pub end_line: usize,
    pub signature: Option<String>,
    pub doc_comment: Option<String>,
    pub visibility: Visibility,
    pub decorators: Vec<String>,
    /// Enclosing class for methods
    pub parent_class: Option<String>,
    pub is_async: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Symbol {
    /// Create a symbol, rejecting empty names and inverted line ranges
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        file_path: impl Into<String>,
        module_path: impl Into<String>,
        start_line: usize,
        end_line: usize,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ExtractorError::EmptyName);
        }
        if start_line > end_line {
            return Err(ExtractorError::invalid_range(start_line, end_line));
        }
        let now = Utc::now();
        Ok(Self {
            name,
            kind,
            file_path: file_path.into(),
            module_path: module_path.into(),
            start_line,
            end_line,
            signature: None,
            doc_comment: None,
            visibility: Visibility::Public,
            decorators: Vec::new(),
            parent_class: None,
            is_async: false,
            is_static: false,
            is_abstract: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builder: set signature
    #[must_use]
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Builder: set doc comment
    #[must_use]
    pub fn doc_comment(mut self, doc: Option<String>) -> Self {
        self.doc_comment = doc;
        self
    }

    /// Builder: set visibility
    #[must_use]
    pub const fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder: set decorator names, deriving the static and abstract flags
    #[must_use]
    pub fn decorators(mut self, decorators: Vec<String>) -> Self {
        self.is_static = decorators.iter().any(|d| d == "staticmethod");
        self.is_abstract = decorators.iter().any(|d| d == "abstractmethod");
        self.decorators = decorators;
        self
    }

    /// Builder: set parent class
    #[must_use]
    pub fn parent_class(mut self, class: Option<String>) -> Self {
        self.parent_class = class;
        self
    }

    /// Builder: mark as `async def`
    #[must_use]
    pub const fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Apply a set of changes and refresh `updated_at`.
    ///
    /// The change is rejected as a whole if it would break the line-range
    /// invariant.
    pub fn update(&mut self, changes: SymbolUpdate) -> Result<()> {
        let start = changes.start_line.unwrap_or(self.start_line);
        let end = changes.end_line.unwrap_or(self.end_line);
        if start > end {
            return Err(ExtractorError::invalid_range(start, end));
        }
        self.start_line = start;
        self.end_line = end;
        if let Some(signature) = changes.signature {
            self.signature = Some(signature);
        }
        if let Some(doc) = changes.doc_comment {
            self.doc_comment = Some(doc);
        }
        if let Some(visibility) = changes.visibility {
            self.visibility = visibility;
        }
        if let Some(decorators) = changes.decorators {
            self.decorators = decorators;
        }
        if let Some(is_async) = changes.is_async {
            self.is_async = is_async;
        }
        if let Some(is_static) = changes.is_static {
            self.is_static = is_static;
        }
        if let Some(is_abstract) = changes.is_abstract {
            self.is_abstract = is_abstract;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `module_path.name`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.module_path, self.name)
    }

    /// `ParentClass.name` for methods, `name` otherwise
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.parent_class {
            Some(class) => format!("{class}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Store key: `module_path.qualified_name`
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.module_path, self.qualified_name())
    }

    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    #[must_use]
    pub fn is_method(&self) -> bool {
        self.kind == SymbolKind::Function && self.parent_class.is_some()
    }

    #[must_use]
    pub fn is_class_method(&self) -> bool {
        self.is_method() && self.decorators.iter().any(|d| d == "classmethod")
    }

    #[must_use]
    pub fn is_static_method(&self) -> bool {
        self.is_method() && self.decorators.iter().any(|d| d == "staticmethod")
    }
}

/// Partial changes accepted by [`Symbol::update`]
#[derive(Debug, Clone, Default)]
pub struct SymbolUpdate {
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
    pub signature: Option<String>,
    pub doc_comment: Option<String>,
    pub visibility: Option<Visibility>,
    pub decorators: Option<Vec<String>>,
    pub is_async: Option<bool>,
    pub is_static: Option<bool>,
    pub is_abstract: Option<bool>,
}

#[derive(Serialize)]
struct SymbolView<'a> {
    name: &'a str,
    kind: SymbolKind,
    file_path: &'a str,
    module_path: &'a str,
    start_line: usize,
    end_line: usize,
    signature: Option<&'a str>,
    doc_comment: Option<&'a str>,
    visibility: Visibility,
    decorators: &'a [String],
    parent_class: Option<&'a str>,
    is_async: bool,
    is_static: bool,
    is_abstract: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    full_name: String,
    qualified_name: String,
    line_count: usize,
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SymbolView {
            name: &self.name,
            kind: self.kind,
            file_path: &self.file_path,
            module_path: &self.module_path,
            start_line: self.start_line,
            end_line: self.end_line,
            signature: self.signature.as_deref(),
            doc_comment: self.doc_comment.as_deref(),
            visibility: self.visibility,
            decorators: &self.decorators,
            parent_class: self.parent_class.as_deref(),
            is_async: self.is_async,
            is_static: self.is_static,
            is_abstract: self.is_abstract,
            created_at: self.created_at,
            updated_at: self.updated_at,
            full_name: self.full_name(),
            qualified_name: self.qualified_name(),
            line_count: self.line_count(),
        }
        .serialize(serializer)
    }
}

/// How a call reaches its callee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    FunctionCall,
    MethodCall,
    ConstructorCall,
    ImportCall,
}

impl CallKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FunctionCall => "function_call",
            Self::MethodCall => "method_call",
            Self::ConstructorCall => "constructor_call",
            Self::ImportCall => "import_call",
        }
    }
}

/// Syntactic position of a call. Extraction always reports `FunctionCall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallContext {
    Assignment,
    Return,
    Condition,
    Loop,
    Exception,
    #[default]
    FunctionCall,
}

/// One rendered argument of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallArgument {
    pub name: Option<String>,
    pub value: String,
    pub type_hint: Option<String>,
    pub is_keyword: bool,
}

/// A caller to callee edge observed at one call site
#[derive(Debug, Clone, PartialEq)]
pub struct CallRelationship {
    pub caller: String,
    pub callee: String,
    pub kind: CallKind,
    pub context: CallContext,
    pub file_path: String,
    /// Line of the call (1-indexed)
    pub line: usize,
    /// Column of the call (0-indexed)
    pub column: usize,
    pub arguments: Vec<CallArgument>,
    /// Keyword arguments in insertion order; re-adding a key replaces its value in place
    pub keyword_arguments: Vec<(String, String)>,
    pub created_at: DateTime<Utc>,
}

impl CallRelationship {
    /// Create a call, rejecting empty endpoints and line 0
    pub fn new(
        caller: impl Into<String>,
        callee: impl Into<String>,
        kind: CallKind,
        file_path: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Result<Self> {
        let caller = caller.into();
        let callee = callee.into();
        if caller.is_empty() {
            return Err(ExtractorError::EmptyCallTarget("caller"));
        }
        if callee.is_empty() {
            return Err(ExtractorError::EmptyCallTarget("callee"));
        }
        if line < 1 {
            return Err(ExtractorError::InvalidLine(line));
        }
        Ok(Self {
            caller,
            callee,
            kind,
            context: CallContext::FunctionCall,
            file_path: file_path.into(),
            line,
            column,
            arguments: Vec::new(),
            keyword_arguments: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Builder: set call context
    #[must_use]
    pub const fn context(mut self, context: CallContext) -> Self {
        self.context = context;
        self
    }

    pub fn add_argument(&mut self, name: Option<String>, value: impl Into<String>) {
        self.arguments.push(CallArgument {
            name,
            value: value.into(),
            type_hint: None,
            is_keyword: false,
        });
    }

    pub fn add_keyword_argument(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.keyword_arguments.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.keyword_arguments.push((key, value)),
        }
    }

    /// Value of a keyword argument
    #[must_use]
    pub fn keyword_argument(&self, key: &str) -> Option<&str> {
        self.keyword_arguments
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn arguments_count(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    pub fn keyword_arguments_count(&self) -> usize {
        self.keyword_arguments.len()
    }

    #[must_use]
    pub fn is_method_call(&self) -> bool {
        self.kind == CallKind::MethodCall
    }

    #[must_use]
    pub fn is_function_call(&self) -> bool {
        self.kind == CallKind::FunctionCall
    }
}

/// Serializes ordered pairs as a JSON object
struct OrderedMap<'a>(&'a [(String, String)]);

impl Serialize for OrderedMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct CallView<'a> {
    caller: &'a str,
    callee: &'a str,
    kind: CallKind,
    context: CallContext,
    file_path: &'a str,
    line: usize,
    column: usize,
    arguments: &'a [CallArgument],
    keyword_arguments: OrderedMap<'a>,
    created_at: DateTime<Utc>,
    arguments_count: usize,
    keyword_arguments_count: usize,
}

impl Serialize for CallRelationship {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        CallView {
            caller: &self.caller,
            callee: &self.callee,
            kind: self.kind,
            context: self.context,
            file_path: &self.file_path,
            line: self.line,
            column: self.column,
            arguments: &self.arguments,
            keyword_arguments: OrderedMap(&self.keyword_arguments),
            created_at: self.created_at,
            arguments_count: self.arguments_count(),
            keyword_arguments_count: self.keyword_arguments_count(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbol_rejects_invalid_input() {
        assert_eq!(
            Symbol::new("", SymbolKind::Function, "a.py", "a", 1, 1).unwrap_err(),
            ExtractorError::EmptyName
        );
        assert_eq!(
            Symbol::new("f", SymbolKind::Function, "a.py", "a", 5, 4).unwrap_err(),
            ExtractorError::invalid_range(5, 4)
        );
    }

    #[test]
    fn symbol_derived_names() {
        let symbol = Symbol::new("add", SymbolKind::Function, "calc.py", "calc", 3, 7)
            .unwrap()
            .parent_class(Some("Calculator".to_string()));
        assert_eq!(symbol.full_name(), "calc.add");
        assert_eq!(symbol.qualified_name(), "Calculator.add");
        assert_eq!(symbol.key(), "calc.Calculator.add");
        assert_eq!(symbol.line_count(), 5);
        assert!(symbol.is_method());
    }

    #[test]
    fn decorators_drive_method_flags() {
        let symbol = Symbol::new("make", SymbolKind::Function, "m.py", "m", 1, 2)
            .unwrap()
            .parent_class(Some("Factory".to_string()))
            .decorators(vec!["staticmethod".to_string(), "abstractmethod".to_string()]);
        assert!(symbol.is_static);
        assert!(symbol.is_abstract);
        assert!(symbol.is_static_method());
        assert!(!symbol.is_class_method());

        let free = Symbol::new("make", SymbolKind::Function, "m.py", "m", 1, 2)
            .unwrap()
            .decorators(vec!["classmethod".to_string()]);
        assert!(!free.is_class_method());
    }

    #[test]
    fn update_refreshes_timestamp_and_keeps_invariant() {
        let mut symbol = Symbol::new("f", SymbolKind::Function, "a.py", "a", 1, 3).unwrap();
        let created = symbol.updated_at;
        symbol
            .update(SymbolUpdate {
                signature: Some("f(x)".to_string()),
                end_line: Some(9),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(symbol.signature.as_deref(), Some("f(x)"));
        assert_eq!(symbol.end_line, 9);
        assert!(symbol.updated_at >= created);

        let err = symbol.update(SymbolUpdate {
            start_line: Some(20),
            ..Default::default()
        });
        assert!(err.is_err());
        assert_eq!(symbol.start_line, 1);
    }

    #[test]
    fn call_rejects_invalid_input() {
        assert!(CallRelationship::new("", "g", CallKind::FunctionCall, "a.py", 1, 0).is_err());
        assert!(CallRelationship::new("f", "", CallKind::FunctionCall, "a.py", 1, 0).is_err());
        assert_eq!(
            CallRelationship::new("f", "g", CallKind::FunctionCall, "a.py", 0, 0).unwrap_err(),
            ExtractorError::InvalidLine(0)
        );
    }

    #[test]
    fn call_serializes_derived_counts_and_ordered_keywords() {
        let mut call = CallRelationship::new("f", "g", CallKind::MethodCall, "a.py", 2, 4).unwrap();
        call.add_argument(None, "x");
        call.add_keyword_argument("zeta", "1");
        call.add_keyword_argument("alpha", "2");
        call.add_keyword_argument("zeta", "3");

        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["kind"], "method_call");
        assert_eq!(json["context"], "function_call");
        assert_eq!(json["arguments_count"], 1);
        assert_eq!(json["keyword_arguments_count"], 2);
        assert_eq!(json["keyword_arguments"]["zeta"], "3");
        assert_eq!(call.keyword_argument("alpha"), Some("2"));
        assert_eq!(call.keyword_arguments[0].0, "zeta");
    }

    #[test]
    fn symbol_serializes_derived_fields() {
        let symbol = Symbol::new("_helper", SymbolKind::Function, "a.py", "a", 1, 2)
            .unwrap()
            .visibility(Visibility::from_name("_helper"));
        let json = serde_json::to_value(&symbol).unwrap();
        assert_eq!(json["full_name"], "a._helper");
        assert_eq!(json["line_count"], 2);
        assert_eq!(json["visibility"], "private");
        assert_eq!(json["kind"], "function");
    }
}
