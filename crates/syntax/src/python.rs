use crate::docstring::{clean_docstring, string_literal_value};
use crate::error::{Result, SyntaxError};
use crate::node::{
    Assignment, CallSite, ClassDef, Expr, FunctionDef, ImportAlias, ImportFrom, Keyword, NodeKind,
    Parameters, Span, SyntaxNode, SyntaxTree,
};
use crate::provider::TreeProvider;
use tree_sitter::{Language, Node, Parser};

/// Tree provider backed by tree-sitter-python
pub struct PythonTreeProvider {
    language: Language,
}

impl PythonTreeProvider {
    /// Create a provider, checking that the grammar loads
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| SyntaxError::tree_sitter(format!("Failed to set language: {e}")))?;
        Ok(Self { language })
    }
}

impl TreeProvider for PythonTreeProvider {
    fn parse(&self, source: &str) -> Option<SyntaxTree> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&self.language) {
            log::warn!("Failed to set language: {e}");
            return None;
        }
        let tree = parser.parse(source, None)?;
        let root = tree.root_node();
        if root.has_error() {
            log::debug!("Source has syntax errors, skipping");
            return None;
        }

        let converter = Converter { source };
        let children = converter.convert_children(root);
        let module = SyntaxNode::new(NodeKind::Module, span_of(root), children);
        Some(SyntaxTree::new(module, source))
    }
}

fn span_of(node: Node) -> Span {
    Span::new(
        node.start_position().row + 1,
        node.end_position().row + 1,
        node.start_position().column,
    )
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children
}

/// Lowers a tree-sitter tree into the closed node model
struct Converter<'s> {
    source: &'s str,
}

impl<'s> Converter<'s> {
    fn text(&self, node: Node) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn convert_children(&self, node: Node) -> Vec<SyntaxNode> {
        named_children(node)
            .into_iter()
            .flat_map(|child| self.convert(child))
            .collect()
    }

    /// Convert one node. Blocks are spliced into their parent, and containers
    /// with nothing of interest below them disappear.
    fn convert(&self, node: Node) -> Vec<SyntaxNode> {
        match node.kind() {
            "block" => self.convert_children(node),
            "decorated_definition" => self.convert_decorated(node).into_iter().collect(),
            "function_definition" => vec![self.convert_function(node, Vec::new())],
            "class_definition" => vec![self.convert_class(node, Vec::new())],
            "import_statement" => vec![SyntaxNode::new(
                NodeKind::Import(self.import_names(node)),
                span_of(node),
                Vec::new(),
            )],
            "import_from_statement" | "future_import_statement" => vec![SyntaxNode::new(
                NodeKind::ImportFrom(self.import_from(node)),
                span_of(node),
                Vec::new(),
            )],
            "call" => vec![self.convert_call(node)],
            "assignment" => match self.convert_assignment(node) {
                Some(assign) => vec![assign],
                None => self.convert_other(node),
            },
            _ => self.convert_other(node),
        }
    }

    fn convert_other(&self, node: Node) -> Vec<SyntaxNode> {
        let children = self.convert_children(node);
        if children.is_empty() {
            Vec::new()
        } else {
            vec![SyntaxNode::new(
                NodeKind::Other(node.kind().to_string()),
                span_of(node),
                children,
            )]
        }
    }

    fn convert_assignment(&self, node: Node) -> Option<SyntaxNode> {
        let left = node.child_by_field_name("left")?;
        let right = node.child_by_field_name("right")?;
        if left.kind() != "identifier" {
            return None;
        }
        Some(SyntaxNode::new(
            NodeKind::Assign(Assignment {
                target: self.text(left).to_string(),
                value: self.expr(right),
            }),
            span_of(node),
            self.convert_children(node),
        ))
    }

    fn convert_decorated(&self, node: Node) -> Option<SyntaxNode> {
        let decorators: Vec<Node> = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "decorator")
            .collect();
        let definition = node.child_by_field_name("definition")?;
        match definition.kind() {
            "function_definition" => Some(self.convert_function(definition, decorators)),
            "class_definition" => Some(self.convert_class(definition, decorators)),
            _ => None,
        }
    }

    fn decorator_exprs(&self, decorators: &[Node]) -> Vec<Expr> {
        decorators
            .iter()
            .filter_map(|decorator| {
                named_children(*decorator)
                    .into_iter()
                    .find(|child| child.kind() != "comment")
            })
            .map(|expr| self.expr(expr))
            .collect()
    }

    fn decorator_children(&self, decorators: &[Node]) -> Vec<SyntaxNode> {
        decorators
            .iter()
            .flat_map(|decorator| self.convert_children(*decorator))
            .collect()
    }

    fn convert_function(&self, node: Node, decorators: Vec<Node>) -> SyntaxNode {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let is_async = node.child(0).is_some_and(|first| first.kind() == "async");
        let parameters = node
            .child_by_field_name("parameters")
            .map(|params| self.parameters(params))
            .unwrap_or_default();

        let mut children = self.decorator_children(&decorators);
        children.extend(self.convert_children(node));

        SyntaxNode::new(
            NodeKind::Function(FunctionDef {
                name,
                is_async,
                parameters,
                doc_comment: self.doc_comment(node),
                decorators: self.decorator_exprs(&decorators),
            }),
            span_of(node),
            children,
        )
    }

    fn convert_class(&self, node: Node, decorators: Vec<Node>) -> SyntaxNode {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let mut children = self.decorator_children(&decorators);
        children.extend(self.convert_children(node));

        SyntaxNode::new(
            NodeKind::Class(ClassDef {
                name,
                doc_comment: self.doc_comment(node),
                decorators: self.decorator_exprs(&decorators),
            }),
            span_of(node),
            children,
        )
    }

    /// Docstring of a class or function: a leading plain string statement in its body
    fn doc_comment(&self, definition: Node) -> Option<String> {
        let body = definition.child_by_field_name("body")?;
        let first = named_children(body)
            .into_iter()
            .find(|stmt| stmt.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let children = named_children(first);
        let [literal] = children.as_slice() else {
            return None;
        };
        let value = self.string_value(*literal)?;
        Some(clean_docstring(&value))
    }

    fn parameters(&self, node: Node) -> Parameters {
        let mut params = Parameters::default();
        let mut after_star = false;

        for child in named_children(node) {
            let target = if child.kind() == "typed_parameter" {
                named_children(child).into_iter().next()
            } else {
                Some(child)
            };
            let Some(target) = target else { continue };

            match target.kind() {
                "identifier" => self.push_param(&mut params, after_star, target),
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(name) = target.child_by_field_name("name") {
                        if name.kind() == "identifier" {
                            self.push_param(&mut params, after_star, name);
                        }
                    }
                }
                "list_splat_pattern" => {
                    params.vararg = self.splat_name(target);
                    after_star = true;
                }
                "dictionary_splat_pattern" => params.kwarg = self.splat_name(target),
                "keyword_separator" => after_star = true,
                "positional_separator" => {
                    params.positional_only.append(&mut params.positional);
                }
                _ => {}
            }
        }
        params
    }

    fn push_param(&self, params: &mut Parameters, keyword_only: bool, name: Node) {
        let name = self.text(name).to_string();
        if keyword_only {
            params.keyword_only.push(name);
        } else {
            params.positional.push(name);
        }
    }

    fn splat_name(&self, pattern: Node) -> Option<String> {
        named_children(pattern)
            .into_iter()
            .find(|child| child.kind() == "identifier")
            .map(|ident| self.text(ident).to_string())
    }

    fn dotted_name(&self, node: Node) -> String {
        if node.kind() != "dotted_name" {
            return self.text(node).to_string();
        }
        named_children(node)
            .into_iter()
            .map(|part| self.text(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn alias(&self, node: Node) -> Option<ImportAlias> {
        match node.kind() {
            "dotted_name" => Some(ImportAlias {
                name: self.dotted_name(node),
                asname: None,
            }),
            "aliased_import" => Some(ImportAlias {
                name: self.dotted_name(node.child_by_field_name("name")?),
                asname: node
                    .child_by_field_name("alias")
                    .map(|alias| self.text(alias).to_string()),
            }),
            _ => None,
        }
    }

    fn import_names(&self, node: Node) -> Vec<ImportAlias> {
        let mut cursor = node.walk();
        let names: Vec<ImportAlias> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|child| self.alias(child))
            .collect();
        names
    }

    fn import_from(&self, node: Node) -> ImportFrom {
        let module = if node.kind() == "future_import_statement" {
            Some("__future__".to_string())
        } else {
            node.child_by_field_name("module_name")
                .and_then(|module| match module.kind() {
                    "relative_import" => named_children(module)
                        .into_iter()
                        .find(|part| part.kind() == "dotted_name")
                        .map(|dotted| self.dotted_name(dotted)),
                    _ => Some(self.dotted_name(module)),
                })
        };
        ImportFrom {
            module,
            names: self.import_names(node),
        }
    }

    fn convert_call(&self, node: Node) -> SyntaxNode {
        let callee = node
            .child_by_field_name("function")
            .map_or(Expr::Other, |function| self.expr(function));

        let mut arguments = Vec::new();
        let mut keywords = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            if args.kind() == "argument_list" {
                for arg in named_children(args) {
                    match arg.kind() {
                        "comment" => {}
                        "keyword_argument" => keywords.push(Keyword {
                            name: arg
                                .child_by_field_name("name")
                                .map(|name| self.text(name).to_string()),
                            value: arg
                                .child_by_field_name("value")
                                .map_or(Expr::Other, |value| self.expr(value)),
                        }),
                        "dictionary_splat" => keywords.push(Keyword {
                            name: None,
                            value: named_children(arg)
                                .into_iter()
                                .next()
                                .map_or(Expr::Other, |value| self.expr(value)),
                        }),
                        _ => arguments.push(self.expr(arg)),
                    }
                }
            } else {
                // bare generator argument: f(x for x in xs)
                arguments.push(Expr::Other);
            }
        }

        SyntaxNode::new(
            NodeKind::Call(CallSite {
                callee,
                arguments,
                keywords,
            }),
            span_of(node),
            self.convert_children(node),
        )
    }

    fn expr(&self, node: Node) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node).to_string()),
            "attribute" => {
                let (Some(object), Some(attr)) = (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("attribute"),
                ) else {
                    return Expr::Other;
                };
                Expr::Attribute {
                    value: Box::new(self.expr(object)),
                    attr: self.text(attr).to_string(),
                }
            }
            "call" => Expr::Call {
                func: Box::new(
                    node.child_by_field_name("function")
                        .map_or(Expr::Other, |function| self.expr(function)),
                ),
            },
            "parenthesized_expression" => {
                let inner: Vec<Node> = named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() != "comment")
                    .collect();
                match inner.as_slice() {
                    [single] => self.expr(*single),
                    _ => Expr::Other,
                }
            }
            "string" | "concatenated_string" => self
                .string_value(node)
                .map_or(Expr::Other, Expr::Constant),
            "integer" => Expr::Constant(integer_text(self.text(node))),
            "float" => Expr::Constant(self.text(node).replace('_', "")),
            "true" => Expr::Constant("True".to_string()),
            "false" => Expr::Constant("False".to_string()),
            "none" => Expr::Constant("None".to_string()),
            "ellipsis" => Expr::Constant("Ellipsis".to_string()),
            _ => Expr::Other,
        }
    }

    /// Value of a constant string expression; `None` for f-strings and bytes
    fn string_value(&self, node: Node) -> Option<String> {
        match node.kind() {
            "string" => {
                let mut cursor = node.walk();
                let interpolated = node
                    .named_children(&mut cursor)
                    .any(|child| child.kind() == "interpolation");
                if interpolated {
                    return None;
                }
                string_literal_value(self.text(node))
            }
            "concatenated_string" => named_children(node)
                .into_iter()
                .filter(|part| part.kind() != "comment")
                .map(|part| self.string_value(part))
                .collect(),
            _ => None,
        }
    }
}

/// Decimal rendering of an integer literal, falling back to the source text
fn integer_text(literal: &str) -> String {
    let cleaned = literal.replace('_', "").to_ascii_lowercase();
    let parsed = if let Some(hex) = cleaned.strip_prefix("0x") {
        i128::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = cleaned.strip_prefix("0o") {
        i128::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        i128::from_str_radix(bin, 2).ok()
    } else {
        cleaned.parse::<i128>().ok()
    };
    parsed.map_or_else(|| literal.to_string(), |value| value.to_string())
}
