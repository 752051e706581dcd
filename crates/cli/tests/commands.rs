use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CALCULATOR: &str = r#"
class Calculator:
    def add(self, a, b):
        return a + b


def main():
    calc = Calculator()
    calc.add(5, 3)
"#;

const CYCLE: &str = r#"
def a():
    b()


def b():
    c()


def c():
    a()
"#;

const AUTH: &str = r#"
def validate_user_token(token):
    return token is not None


def compute_total(items):
    return sum(items)
"#;

#[allow(deprecated)]
fn codescope() -> Command {
    Command::cargo_bin("codescope").expect("binary")
}

fn run_json(args: &[&str]) -> Value {
    let output = codescope().arg("--quiet").args(args).output().expect("run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn setup_project() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("calculator.py"), CALCULATOR).unwrap();
    fs::write(root.join("cycle.py"), CYCLE).unwrap();
    fs::write(root.join("auth.py"), AUTH).unwrap();
    temp
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn parse_reports_symbols_and_calls() {
    let temp = setup_project();
    let file = temp.path().join("calculator.py");
    let body = run_json(&["parse", path_str(&file), "--mode", "ast"]);

    assert_eq!(body["analysis_type"], "ast");
    assert_eq!(body["symbols"].as_array().unwrap().len(), 3);
    assert_eq!(body["symbols"][1]["full_name"], "calculator.add");
    assert_eq!(body["symbols"][1]["qualified_name"], "Calculator.add");
    assert!(body["chunks"].as_array().unwrap().is_empty());

    let calls = body["calls"].as_array().unwrap();
    assert!(calls
        .iter()
        .any(|c| c["callee"] == "Calculator.add" && c["kind"] == "method_call"));
}

#[test]
fn analyze_prints_store_statistics() {
    let temp = setup_project();
    let body = run_json(&["analyze", path_str(temp.path())]);

    assert_eq!(body["summary"]["files"], 3);
    assert_eq!(body["stores"]["calls"]["cycles_count"], 1);
    assert_eq!(body["stores"]["symbols"]["symbols_by_kind"]["class"], 1);
    assert!(body.get("entities").is_none());

    let full = run_json(&["analyze", path_str(temp.path()), "--full"]);
    assert!(full["entities"]["symbols"].as_array().unwrap().len() >= 6);
}

#[test]
fn cycles_with_both_detectors() {
    let temp = setup_project();

    let dfs = run_json(&["cycles", path_str(temp.path())]);
    assert_eq!(dfs["detector"], "path_dfs");
    assert_eq!(dfs["cycles"], serde_json::json!([["a", "b", "c", "a"]]));
    assert_eq!(dfs["call_graph"]["a"], serde_json::json!(["b"]));

    let tarjan = run_json(&["cycles", path_str(temp.path()), "--tarjan"]);
    assert_eq!(tarjan["cycles"], serde_json::json!([["a", "b", "c"]]));
}

#[test]
fn search_matches_semantic_chunks() {
    let temp = setup_project();
    let body = run_json(&["search", path_str(temp.path()), "authentication"]);
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["symbol_name"], "validate_user_token");
}

#[test]
fn chunks_filtered_by_kind() {
    let temp = setup_project();
    let file = temp.path().join("auth.py");

    let semantic = run_json(&["chunks", path_str(&file), "--kind", "semantic"]);
    assert_eq!(semantic["kind"], "semantic");
    let chunks = semantic["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0]["metadata"]["semantic_type"], "authentication");

    let structural = run_json(&["chunks", path_str(&file), "--kind", "structural"]);
    assert_eq!(
        structural["chunks"][0]["symbol_name"],
        "compute_total"
    );
    assert!(structural["summary"]
        .as_str()
        .unwrap()
        .starts_with("Chunks: 1"));
}

#[test]
fn config_file_is_applied() {
    let temp = setup_project();
    let config = temp.path().join("codescope.toml");
    fs::write(&config, "[scan]\nexclude_patterns = [\"cycle\"]\n").unwrap();

    let body = run_json(&[
        "analyze",
        path_str(temp.path()),
        "--config",
        path_str(&config),
    ]);
    assert_eq!(body["summary"]["files"], 2);
    assert_eq!(body["stores"]["calls"]["cycles_count"], 0);
}

#[test]
fn invalid_config_fails() {
    let temp = setup_project();
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[chunker]\nmedium_line_threshold = 99\ncomplex_line_threshold = 1\n").unwrap();

    codescope()
        .args(["analyze", path_str(temp.path()), "--config", path_str(&config)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn missing_path_fails() {
    codescope()
        .args(["analyze", "/definitely/not/a/project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project path"));
}
