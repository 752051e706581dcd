use crate::error::Result;
use crate::scope::{definitions, Definition};
use crate::types::{Symbol, SymbolKind, Visibility};
use codescope_syntax::{Expr, FunctionDef, SyntaxNode, SyntaxTree};

/// Placeholder for decorator shapes that have no simple name
pub const UNKNOWN_DECORATOR: &str = "unknown_decorator";

/// Builds class and function symbols from a syntax tree
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolExtractor;

impl SymbolExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extract symbols in walk order. Fails on the first symbol that does not validate.
    pub fn extract(
        &self,
        tree: &SyntaxTree,
        file_path: &str,
        module_path: &str,
    ) -> Result<Vec<Symbol>> {
        definitions(tree)
            .into_iter()
            .map(|definition| -> Result<Symbol> {
                match definition {
                    Definition::Class { node, class } => Ok(Symbol::new(
                        class.name.clone(),
                        SymbolKind::Class,
                        file_path,
                        module_path,
                        node.span.start_line,
                        node.span.end_line,
                    )?
                    .doc_comment(class.doc_comment.clone())
                    .decorators(decorator_names(&class.decorators))
                    .visibility(Visibility::from_name(&class.name))),
                    Definition::Function {
                        node,
                        function,
                        scope,
                    } => Ok(function_symbol(node, function, file_path, module_path)?
                        .parent_class(scope.class().map(str::to_string))),
                }
            })
            .collect()
    }
}

fn function_symbol(
    node: &SyntaxNode,
    function: &FunctionDef,
    file_path: &str,
    module_path: &str,
) -> Result<Symbol> {
    Ok(Symbol::new(
        function.name.clone(),
        SymbolKind::Function,
        file_path,
        module_path,
        node.span.start_line,
        node.span.end_line,
    )?
    .signature(signature(function))
    .doc_comment(function.doc_comment.clone())
    .decorators(decorator_names(&function.decorators))
    .with_async(function.is_async)
    .visibility(Visibility::from_name(&function.name)))
}

/// Render `name(a, b, *args, **kwargs)`; a leading `self`/`cls` is dropped and
/// positional-only and keyword-only parameters are not listed
#[must_use]
pub fn signature(function: &FunctionDef) -> String {
    let params = &function.parameters;
    let mut args: Vec<String> = params.positional.clone();
    if matches!(args.first().map(String::as_str), Some("self" | "cls")) {
        args.remove(0);
    }
    if let Some(vararg) = &params.vararg {
        args.push(format!("*{vararg}"));
    }
    if let Some(kwarg) = &params.kwarg {
        args.push(format!("**{kwarg}"));
    }
    format!("{}({})", function.name, args.join(", "))
}

/// Simple name of a decorator expression
#[must_use]
pub fn decorator_name(decorator: &Expr) -> &str {
    match decorator {
        Expr::Name(name) => name,
        Expr::Attribute { attr, .. } => attr,
        Expr::Call { func } => match func.as_ref() {
            Expr::Name(name) => name,
            Expr::Attribute { attr, .. } => attr,
            _ => UNKNOWN_DECORATOR,
        },
        _ => UNKNOWN_DECORATOR,
    }
}

fn decorator_names(decorators: &[Expr]) -> Vec<String> {
    decorators
        .iter()
        .map(|d| decorator_name(d).to_string())
        .collect()
}
