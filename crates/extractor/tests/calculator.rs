use codescope_extractor::{CallExtractor, CallKind, ImportMap, SymbolExtractor, SymbolKind};
use codescope_syntax::{PythonTreeProvider, TreeProvider};
use pretty_assertions::assert_eq;

const CALCULATOR: &str = r#"
class Calculator:
    """Adds numbers."""

    def add(self, a, b):
        return a + b


def main():
    calc = Calculator()
    calc.add(5, 3)
"#;

#[test]
fn calculator_symbols_and_calls() {
    let tree = PythonTreeProvider::new()
        .unwrap()
        .parse(CALCULATOR)
        .expect("valid python");

    let symbols = SymbolExtractor::new()
        .extract(&tree, "calculator.py", "calculator")
        .unwrap();
    let described: Vec<_> = symbols
        .iter()
        .map(|s| (s.qualified_name(), s.kind, s.parent_class.clone()))
        .collect();
    assert_eq!(
        described,
        vec![
            ("Calculator".to_string(), SymbolKind::Class, None),
            (
                "Calculator.add".to_string(),
                SymbolKind::Function,
                Some("Calculator".to_string())
            ),
            ("main".to_string(), SymbolKind::Function, None),
        ]
    );
    assert_eq!(symbols[1].signature.as_deref(), Some("add(a, b)"));
    assert_eq!(symbols[0].start_line, 2);
    assert_eq!(symbols[0].end_line, 6);

    let imports = ImportMap::from_tree(&tree);
    let calls = CallExtractor::new()
        .extract(&tree, &imports, "calculator.py")
        .unwrap();
    let method_calls: Vec<_> = calls
        .iter()
        .filter(|c| c.kind == CallKind::MethodCall)
        .collect();
    assert_eq!(method_calls.len(), 1);
    assert_eq!(method_calls[0].caller, "main");
    assert_eq!(method_calls[0].callee, "Calculator.add");
    assert_eq!(method_calls[0].arguments_count(), 2);
    assert_eq!(method_calls[0].arguments[0].value, "5");
}

#[test]
fn every_symbol_keeps_a_valid_range() {
    let tree = PythonTreeProvider::new()
        .unwrap()
        .parse(CALCULATOR)
        .unwrap();
    let symbols = SymbolExtractor::new()
        .extract(&tree, "calculator.py", "calculator")
        .unwrap();
    for symbol in &symbols {
        assert!(symbol.start_line <= symbol.end_line);
        assert!(!symbol.name.is_empty());
        assert_eq!(symbol.full_name(), format!("calculator.{}", symbol.name));
    }
}
