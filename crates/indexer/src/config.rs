use crate::error::{IndexerError, Result};
use codescope_chunker::ChunkerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What a per-file parse produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Symbols, calls and the merged chunk set
    #[default]
    Hybrid,
    /// Symbols and calls only
    Ast,
    /// Symbols, calls and only the pattern-matched chunks
    Semantic,
}

impl AnalysisMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Ast => "ast",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "ast" => Ok(Self::Ast),
            "semantic" => Ok(Self::Semantic),
            _ => Err(IndexerError::UnknownVariant {
                kind: "analysis mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Which `*.py` files a project scan visits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Keep files whose path contains `test_`, `_test.py` or `tests/`
    pub include_tests: bool,

    /// Keep files whose path contains `docs/`, `documentation/` or `README`
    pub include_docs: bool,

    /// Skip files larger than this many bytes
    pub max_file_size: Option<u64>,

    /// Skip files whose root-relative path contains any of these substrings
    pub exclude_patterns: Vec<String>,

    /// Honour `.gitignore` files when the root is a git checkout
    pub respect_gitignore: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_tests: true,
            include_docs: true,
            max_file_size: None,
            exclude_patterns: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Top-level analyzer configuration, loadable from TOML
///
/// ```toml
/// mode = "hybrid"
///
/// [scan]
/// include_tests = false
/// exclude_patterns = ["migrations/"]
///
/// [chunker]
/// medium_line_threshold = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub mode: AnalysisMode,
    pub scan: ScanOptions,
    pub chunker: ChunkerConfig,
}

impl AnalyzerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.max_file_size == Some(0) {
            return Err(IndexerError::InvalidConfig(
                "max_file_size must be greater than zero".to_string(),
            ));
        }
        if self.scan.exclude_patterns.iter().any(String::is_empty) {
            return Err(IndexerError::InvalidConfig(
                "exclude patterns must not be empty".to_string(),
            ));
        }
        self.chunker.validate()?;
        Ok(())
    }
}
