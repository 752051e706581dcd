use crate::error::{ChunkerError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration for code chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Which passes run and how their output is combined
    pub mode: ChunkingMode,

    /// Ordered semantic categories. When several match, the last one wins.
    pub patterns: Vec<PatternCategory>,

    /// Substrings that mark a decision point on a trimmed line
    pub complexity_keywords: Vec<String>,

    /// Chunks longer than this many lines are `medium`
    pub medium_line_threshold: usize,

    /// Chunks longer than this many lines are `complex`
    pub complex_line_threshold: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            mode: ChunkingMode::Hybrid,
            patterns: default_patterns(),
            complexity_keywords: ["if ", "elif ", "for ", "while ", "except ", "and ", "or "]
                .into_iter()
                .map(String::from)
                .collect(),
            medium_line_threshold: 20,
            complex_line_threshold: 50,
        }
    }
}

impl ChunkerConfig {
    /// Create config that only emits structural chunks
    pub fn structural_only() -> Self {
        Self {
            mode: ChunkingMode::Structural,
            ..Default::default()
        }
    }

    /// Create config that only emits pattern-matched chunks
    pub fn semantic_only() -> Self {
        Self {
            mode: ChunkingMode::Semantic,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.medium_line_threshold > self.complex_line_threshold {
            return Err(ChunkerError::invalid_config(format!(
                "medium_line_threshold ({}) cannot exceed complex_line_threshold ({})",
                self.medium_line_threshold, self.complex_line_threshold
            )));
        }

        if self.complexity_keywords.iter().any(String::is_empty) {
            return Err(ChunkerError::invalid_config(
                "complexity keywords must not be empty",
            ));
        }

        for category in &self.patterns {
            if category.name.is_empty() {
                return Err(ChunkerError::invalid_config(
                    "pattern category name must not be empty",
                ));
            }
            for pattern in &category.patterns {
                Regex::new(pattern).map_err(|e| ChunkerError::invalid_pattern(pattern, e))?;
            }
        }

        Ok(())
    }
}

/// Which chunking passes run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingMode {
    /// Both passes, merged without duplicates
    #[default]
    Hybrid,
    /// One chunk per class and function
    Structural,
    /// Only definitions matching the pattern library
    Semantic,
}

/// A named list of regular expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCategory {
    pub name: String,
    pub patterns: Vec<String>,
}

impl PatternCategory {
    pub fn new(name: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Built-in pattern library
#[must_use]
pub fn default_patterns() -> Vec<PatternCategory> {
    vec![
        PatternCategory::new(
            "business_logic",
            &[
                r"calculate.*revenue",
                r"process.*payment",
                r"validate.*user",
                r"generate.*report",
                r"handle.*request",
                r"transform.*data",
                r"compute.*score",
                r"analyze.*performance",
            ],
        ),
        PatternCategory::new(
            "data_processing",
            &[
                r"parse.*json",
                r"convert.*format",
                r"filter.*data",
                r"sort.*list",
                r"aggregate.*results",
                r"normalize.*values",
            ],
        ),
        PatternCategory::new(
            "authentication",
            &[
                r"authenticate.*user",
                r"verify.*token",
                r"validate.*token",
                r"check.*permission",
                r"validate.*credentials",
                r"authorize.*access",
            ],
        ),
        PatternCategory::new(
            "database",
            &[
                r"query.*database",
                r"save.*record",
                r"update.*table",
                r"delete.*entry",
                r"fetch.*data",
            ],
        ),
        PatternCategory::new(
            "api",
            &[
                r"handle.*api",
                r"process.*request",
                r"format.*response",
                r"validate.*input",
                r"serialize.*data",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.patterns.len(), 5);
        assert_eq!(config.patterns[0].name, "business_logic");
        assert_eq!(config.patterns[4].name, "api");
    }

    #[test]
    fn test_preset_configs_valid() {
        assert!(ChunkerConfig::structural_only().validate().is_ok());
        assert!(ChunkerConfig::semantic_only().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ChunkerConfig {
            medium_line_threshold: 60,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.medium_line_threshold = 20;
        config.patterns.push(PatternCategory::new("broken", &["(unclosed"]));
        assert!(matches!(
            config.validate(),
            Err(ChunkerError::InvalidPattern { .. })
        ));

        config.patterns.pop();
        config.complexity_keywords.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ChunkerConfig::semantic_only();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"semantic\""));
        let back: ChunkerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ChunkerConfig = serde_json::from_str(r#"{"mode": "structural"}"#).unwrap();
        assert_eq!(config.mode, ChunkingMode::Structural);
        assert_eq!(config.medium_line_threshold, 20);
        assert!(!config.patterns.is_empty());
    }
}
