use codescope_syntax::{NodeKind, SyntaxTree};
use std::collections::HashMap;

/// Local name to fully-qualified name bindings of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    bindings: HashMap<String, String>,
}

impl ImportMap {
    /// Collect every import statement in the tree, wherever it appears.
    ///
    /// Later bindings of the same local name win. Relative imports without a
    /// module and wildcard imports bind nothing.
    #[must_use]
    pub fn from_tree(tree: &SyntaxTree) -> Self {
        let mut map = Self::default();
        for node in tree.walk() {
            match &node.kind {
                NodeKind::Import(aliases) => {
                    for alias in aliases {
                        map.bind(alias.bound_name(), &alias.name);
                    }
                }
                NodeKind::ImportFrom(from) => {
                    let Some(module) = &from.module else {
                        continue;
                    };
                    for alias in &from.names {
                        map.bind(alias.bound_name(), &format!("{module}.{}", alias.name));
                    }
                }
                _ => {}
            }
        }
        map
    }

    fn bind(&mut self, local: &str, target: &str) {
        self.bindings.insert(local.to_string(), target.to_string());
    }

    /// Fully-qualified target of a local name
    #[must_use]
    pub fn resolve(&self, local: &str) -> Option<&str> {
        self.bindings.get(local).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, local: &str) -> bool {
        self.bindings.contains_key(local)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_syntax::{PythonTreeProvider, TreeProvider};

    fn imports(source: &str) -> ImportMap {
        let tree = PythonTreeProvider::new().unwrap().parse(source).unwrap();
        ImportMap::from_tree(&tree)
    }

    #[test]
    fn binds_plain_and_aliased_imports() {
        let map = imports("import os.path\nimport numpy as np\nfrom a.b import c as d, e\n");
        assert_eq!(map.resolve("os.path"), Some("os.path"));
        assert_eq!(map.resolve("np"), Some("numpy"));
        assert_eq!(map.resolve("d"), Some("a.b.c"));
        assert_eq!(map.resolve("e"), Some("a.b.e"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn skips_bare_relative_and_wildcard_imports() {
        let map = imports("from . import sibling\nfrom os import *\n");
        assert!(map.is_empty());
    }

    #[test]
    fn later_binding_wins_and_nested_imports_count() {
        let map = imports("import json as j\n\ndef f():\n    import simplejson as j\n");
        assert_eq!(map.resolve("j"), Some("simplejson"));
    }
}
