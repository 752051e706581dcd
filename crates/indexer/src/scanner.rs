use crate::config::ScanOptions;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// Scanner for finding Python sources in a project
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Scan the root for `*.py` files, sorted by path
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(self.options.respect_gitignore)
            .git_global(false)
            .git_exclude(self.options.respect_gitignore)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| !Self::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() || !Self::is_python_file(entry.path()) {
                        continue;
                    }

                    let path = entry.path();
                    if let (Some(limit), Ok(meta)) = (self.options.max_file_size, entry.metadata()) {
                        if meta.len() > limit {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {limit})",
                                path.display(),
                                meta.len()
                            );
                            continue;
                        }
                    }

                    if let Some(reason) = self.exclusion(path) {
                        log::debug!("Skipping {} ({reason})", path.display());
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        log::info!("Found {} Python files under {}", files.len(), self.root.display());
        files
    }

    fn exclusion(&self, path: &Path) -> Option<&'static str> {
        let relative = self.relative(path);
        if self
            .options
            .exclude_patterns
            .iter()
            .any(|pattern| relative.contains(pattern.as_str()))
        {
            return Some("excluded");
        }
        if !self.options.include_tests && is_test_path(&relative) {
            return Some("test file");
        }
        if !self.options.include_docs && is_doc_path(&relative) {
            return Some("documentation");
        }
        None
    }

    /// Root-relative path with `/` separators
    fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn is_python_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("py"))
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        if let Ok(relative) = path.strip_prefix(root) {
            for component in relative.components() {
                if let Component::Normal(name) = component {
                    let lowered = name.to_string_lossy().to_lowercase();
                    if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

fn is_test_path(relative: &str) -> bool {
    ["test_", "_test.py", "tests/"]
        .iter()
        .any(|pattern| relative.contains(pattern))
}

fn is_doc_path(relative: &str) -> bool {
    ["docs/", "documentation/", "README"]
        .iter()
        .any(|pattern| relative.contains(pattern))
}

const IGNORED_SCOPES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".nox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "site-packages",
    "node_modules",
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    fn project() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for dir in ["app", "tests", "docs", "__pycache__", "legacy"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("app/main.py"), "def main():\n    pass\n").unwrap();
        fs::write(root.join("app/notes.txt"), "not python").unwrap();
        fs::write(root.join("app/test_main.py"), "def test_main():\n    pass\n").unwrap();
        fs::write(root.join("tests/helpers.py"), "x = 1\n").unwrap();
        fs::write(root.join("docs/conf.py"), "project = 'x'\n").unwrap();
        fs::write(root.join("__pycache__/main.py"), "").unwrap();
        fs::write(root.join("legacy/old.py"), "y = 2\n").unwrap();
        temp
    }

    #[test]
    fn finds_python_files_in_order() {
        let temp = project();
        let files = FileScanner::new(temp.path(), ScanOptions::default()).scan();
        assert_eq!(
            names(temp.path(), &files),
            vec![
                "app/main.py",
                "app/test_main.py",
                "docs/conf.py",
                "legacy/old.py",
                "tests/helpers.py"
            ]
        );
    }

    #[test]
    fn honours_scan_options() {
        let temp = project();
        let options = ScanOptions {
            include_tests: false,
            include_docs: false,
            exclude_patterns: vec!["legacy".to_string()],
            ..Default::default()
        };
        let files = FileScanner::new(temp.path(), options).scan();
        assert_eq!(names(temp.path(), &files), vec!["app/main.py"]);
    }

    #[test]
    fn skips_files_over_size_limit() {
        let temp = project();
        fs::write(temp.path().join("app/big.py"), "x = 1\n".repeat(100)).unwrap();
        let options = ScanOptions {
            max_file_size: Some(64),
            ..Default::default()
        };
        let files = FileScanner::new(temp.path(), options).scan();
        assert!(files.iter().all(|p| !p.ends_with("big.py")));
        assert!(files.iter().any(|p| p.ends_with("main.py")));
    }
}
