use crate::error::Result;
use crate::imports::ImportMap;
use crate::scope::{definitions, Definition, Scope};
use crate::types::{CallContext, CallKind, CallRelationship};
use codescope_syntax::{CallSite, Expr, NodeKind, SyntaxNode, SyntaxTree};
use std::collections::{HashMap, HashSet};

/// Rendering of arguments that are neither names nor constants
pub const COMPLEX_EXPRESSION: &str = "complex_expression";

/// Key used for `**mapping` splats in the keyword map
pub const KWARGS_SPLAT_KEY: &str = "**";

/// Resolves call sites inside functions into caller/callee relationships
#[derive(Debug, Clone, Copy, Default)]
pub struct CallExtractor;

impl CallExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extract every resolvable call made inside a function or method.
    ///
    /// A call inside a nested free function is reported once for each enclosing
    /// function that is walked.
    pub fn extract(
        &self,
        tree: &SyntaxTree,
        imports: &ImportMap,
        file_path: &str,
    ) -> Result<Vec<CallRelationship>> {
        let definitions = definitions(tree);
        let classes: HashSet<&str> = definitions
            .iter()
            .filter_map(|definition| match definition {
                Definition::Class { class, .. } => Some(class.name.as_str()),
                Definition::Function { .. } => None,
            })
            .collect();

        let mut calls = Vec::new();
        for definition in &definitions {
            let Definition::Function {
                node,
                function,
                scope,
            } = *definition
            else {
                continue;
            };
            let caller = scope.qualify(&function.name);
            let resolver = CallResolver {
                scope,
                imports,
                instances: instance_bindings(node, &classes),
            };

            for inner in node.descendants() {
                let NodeKind::Call(site) = &inner.kind else {
                    continue;
                };
                let Some(callee) = resolver.resolve(&site.callee) else {
                    log::debug!(
                        "{file_path}:{}: dropping call with unresolvable callee",
                        inner.span.start_line
                    );
                    continue;
                };
                calls.push(relationship(
                    site,
                    &caller,
                    callee,
                    file_path,
                    inner.span.start_line,
                    inner.span.column,
                )?);
            }
        }
        Ok(calls)
    }
}

/// Local names assigned straight from a constructor of a class declared in the
/// same file, e.g. `calc = Calculator()`. The last assignment wins.
fn instance_bindings<'t>(
    function: &'t SyntaxNode,
    classes: &HashSet<&str>,
) -> HashMap<&'t str, &'t str> {
    let mut bindings = HashMap::new();
    for node in function.descendants() {
        let NodeKind::Assign(assign) = &node.kind else {
            continue;
        };
        if let Expr::Call { func } = &assign.value {
            if let Some(class) = func.as_name().filter(|name| classes.contains(name)) {
                bindings.insert(assign.target.as_str(), class);
            }
        }
    }
    bindings
}

fn relationship(
    site: &CallSite,
    caller: &str,
    callee: String,
    file_path: &str,
    line: usize,
    column: usize,
) -> Result<CallRelationship> {
    let kind = match site.callee {
        Expr::Attribute { .. } => CallKind::MethodCall,
        _ => CallKind::FunctionCall,
    };
    let mut call = CallRelationship::new(caller, callee, kind, file_path, line, column)?
        .context(CallContext::FunctionCall);

    for arg in &site.arguments {
        call.add_argument(None, render_argument(arg));
    }
    for keyword in &site.keywords {
        let key = keyword.name.as_deref().unwrap_or(KWARGS_SPLAT_KEY);
        call.add_keyword_argument(key, render_argument(&keyword.value));
    }
    Ok(call)
}

/// Name resolution context for the calls of one function
#[derive(Debug, Clone)]
pub struct CallResolver<'a> {
    pub scope: Scope<'a>,
    pub imports: &'a ImportMap,
    /// Local variables holding instances of classes declared in the same file
    pub instances: HashMap<&'a str, &'a str>,
}

impl CallResolver<'_> {
    /// Best-effort static name of a call target
    #[must_use]
    pub fn resolve(&self, callee: &Expr) -> Option<String> {
        match callee {
            Expr::Name(name) => Some(self.imports.resolve(name).unwrap_or(name).to_string()),
            Expr::Attribute { value, attr } => {
                let receiver = value.as_name()?;
                if let (Some(class), "self" | "cls") = (self.scope.class(), receiver) {
                    return Some(format!("{class}.{attr}"));
                }
                if let Some(class) = self.instances.get(receiver) {
                    return Some(format!("{class}.{attr}"));
                }
                match self.imports.resolve(receiver) {
                    Some(target) => Some(format!("{target}.{attr}")),
                    None => Some(format!("{receiver}.{attr}")),
                }
            }
            _ => None,
        }
    }
}

/// Render an argument expression as text
#[must_use]
pub fn render_argument(expr: &Expr) -> &str {
    match expr {
        Expr::Name(name) => name,
        Expr::Constant(value) => value,
        _ => COMPLEX_EXPRESSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_syntax::{PythonTreeProvider, TreeProvider};
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> Vec<CallRelationship> {
        let tree = PythonTreeProvider::new().unwrap().parse(source).unwrap();
        let imports = ImportMap::from_tree(&tree);
        CallExtractor::new()
            .extract(&tree, &imports, "svc.py")
            .unwrap()
    }

    fn pairs(calls: &[CallRelationship]) -> Vec<(String, String)> {
        calls
            .iter()
            .map(|c| (c.caller.clone(), c.callee.clone()))
            .collect()
    }

    #[test]
    fn resolves_names_through_imports() {
        let calls = extract(
            "\
import numpy as np
from os.path import join

def build(parts):
    np.array(parts)
    join('a', 'b')
    local_helper()
    session.commit()
",
        );
        assert_eq!(
            pairs(&calls),
            vec![
                ("build".to_string(), "numpy.array".to_string()),
                ("build".to_string(), "os.path.join".to_string()),
                ("build".to_string(), "local_helper".to_string()),
                ("build".to_string(), "session.commit".to_string()),
            ]
        );
        assert_eq!(calls[0].kind, CallKind::MethodCall);
        assert_eq!(calls[1].kind, CallKind::FunctionCall);
        assert!(calls.iter().all(|c| c.context == CallContext::FunctionCall));
    }

    #[test]
    fn self_calls_resolve_to_class() {
        let calls = extract(
            "\
class Service:
    def run(self):
        self.step()
        cls.make()

    def step(self):
        pass
",
        );
        assert_eq!(
            pairs(&calls),
            vec![
                ("Service.run".to_string(), "Service.step".to_string()),
                ("Service.run".to_string(), "Service.make".to_string()),
            ]
        );
    }

    #[test]
    fn unresolvable_callees_are_dropped() {
        let calls = extract("def f():\n    items[0]()\n    a.b.c()\n    get()()\n");
        assert_eq!(
            pairs(&calls),
            vec![("f".to_string(), "get".to_string())]
        );
    }

    #[test]
    fn arguments_are_rendered() {
        let calls = extract("def f():\n    g(x, 'y', 3, a.b, *rest, key=True, other=z, **opts)\n");
        let call = &calls[0];
        let values: Vec<_> = call.arguments.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec!["x", "y", "3", COMPLEX_EXPRESSION, COMPLEX_EXPRESSION]);
        assert!(call.arguments.iter().all(|a| a.name.is_none() && !a.is_keyword));
        assert_eq!(call.keyword_argument("key"), Some("True"));
        assert_eq!(call.keyword_argument("other"), Some("z"));
        assert_eq!(call.keyword_argument(KWARGS_SPLAT_KEY), Some("opts"));
        assert_eq!(call.line, 2);
        assert_eq!(call.column, 4);
    }

    #[test]
    fn constructor_assignment_types_the_receiver() {
        let calls = extract(
            "\
class Calculator:
    def add(self, a, b):
        return a + b

def main():
    calc = Calculator()
    calc.add(5, 3)
    other.add(1, 2)
",
        );
        assert_eq!(
            pairs(&calls),
            vec![
                ("main".to_string(), "Calculator".to_string()),
                ("main".to_string(), "Calculator.add".to_string()),
                ("main".to_string(), "other.add".to_string()),
            ]
        );
        assert_eq!(calls[1].kind, CallKind::MethodCall);
    }

    #[test]
    fn module_level_calls_are_ignored() {
        assert!(extract("print('hello')\n").is_empty());
    }

    #[test]
    fn nested_function_calls_count_for_both_functions() {
        let calls = extract("def outer():\n    def inner():\n        work()\n    inner()\n");
        assert_eq!(
            pairs(&calls),
            vec![
                ("outer".to_string(), "work".to_string()),
                ("outer".to_string(), "inner".to_string()),
                ("inner".to_string(), "work".to_string()),
            ]
        );
    }
}
