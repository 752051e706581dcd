use codescope_syntax::{ClassDef, FunctionDef, NodeKind, SyntaxNode, SyntaxTree};

/// Lexical position during a walk. Passed by value into each recursive call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope<'t> {
    class: Option<&'t str>,
}

impl<'t> Scope<'t> {
    /// Module level scope
    #[must_use]
    pub const fn module() -> Self {
        Self { class: None }
    }

    #[must_use]
    pub const fn in_class(class: &'t str) -> Self {
        Self { class: Some(class) }
    }

    /// Innermost class being walked
    #[must_use]
    pub const fn class(&self) -> Option<&'t str> {
        self.class
    }

    /// `Class.name` inside a class, `name` otherwise
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        match self.class {
            Some(class) => format!("{class}.{name}"),
            None => name.to_string(),
        }
    }
}

/// A definition reported by [`definitions`], with the scope it was found in
#[derive(Debug, Clone, Copy)]
pub enum Definition<'t> {
    Class {
        node: &'t SyntaxNode,
        class: &'t ClassDef,
    },
    Function {
        node: &'t SyntaxNode,
        function: &'t FunctionDef,
        scope: Scope<'t>,
    },
}

/// Classes, their direct methods, and free functions in walk order.
///
/// Each class is followed by the functions defined directly in its body. A
/// function met while a class is active is not reported again, so helpers
/// nested inside methods stay invisible. Nested classes are reported and
/// become the active class for their own bodies.
#[must_use]
pub fn definitions(tree: &SyntaxTree) -> Vec<Definition<'_>> {
    let mut out = Vec::new();
    collect(tree.root(), Scope::module(), &mut out);
    out
}

fn collect<'t>(node: &'t SyntaxNode, scope: Scope<'t>, out: &mut Vec<Definition<'t>>) {
    match &node.kind {
        NodeKind::Class(class) => {
            out.push(Definition::Class { node, class });
            let inner = Scope::in_class(&class.name);
            for child in &node.children {
                if let NodeKind::Function(function) = &child.kind {
                    out.push(Definition::Function {
                        node: child,
                        function,
                        scope: inner,
                    });
                }
            }
            for child in &node.children {
                collect(child, inner, out);
            }
        }
        NodeKind::Function(function) => {
            if scope.class().is_none() {
                out.push(Definition::Function {
                    node,
                    function,
                    scope,
                });
            }
            for child in &node.children {
                collect(child, scope, out);
            }
        }
        _ => {
            for child in &node.children {
                collect(child, scope, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_syntax::{PythonTreeProvider, TreeProvider};
    use pretty_assertions::assert_eq;

    fn names(source: &str) -> Vec<String> {
        let tree = PythonTreeProvider::new().unwrap().parse(source).unwrap();
        definitions(&tree)
            .into_iter()
            .map(|def| match def {
                Definition::Class { class, .. } => format!("class {}", class.name),
                Definition::Function {
                    function, scope, ..
                } => scope.qualify(&function.name),
            })
            .collect()
    }

    #[test]
    fn class_is_followed_by_its_methods() {
        let source = "\
def free():
    pass

class A:
    def one(self):
        def hidden():
            pass

    @property
    def two(self):
        pass

def tail():
    pass
";
        assert_eq!(
            names(source),
            vec!["free", "class A", "A.one", "A.two", "tail"]
        );
    }

    #[test]
    fn nested_class_takes_over_scope() {
        let source = "\
class Outer:
    class Inner:
        def m(self):
            pass
    def n(self):
        pass
";
        assert_eq!(
            names(source),
            vec!["class Outer", "Outer.n", "class Inner", "Inner.m"]
        );
    }

    #[test]
    fn functions_nested_in_free_functions_are_reported() {
        assert_eq!(
            names("def outer():\n    def inner():\n        pass\n"),
            vec!["outer", "inner"]
        );
    }

    #[test]
    fn qualify_uses_active_class() {
        assert_eq!(Scope::module().qualify("f"), "f");
        assert_eq!(Scope::in_class("C").qualify("f"), "C.f");
    }
}
