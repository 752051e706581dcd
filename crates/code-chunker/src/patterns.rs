use crate::config::{default_patterns, ChunkerConfig, PatternCategory};
use crate::error::{ChunkerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static DEFAULT_LIBRARY: Lazy<Option<PatternLibrary>> =
    Lazy::new(|| PatternLibrary::compile(&default_patterns()).ok());

/// Compiled semantic pattern library
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    categories: Vec<CompiledCategory>,
}

#[derive(Debug, Clone)]
struct CompiledCategory {
    name: String,
    patterns: Vec<(String, Regex)>,
}

impl PatternLibrary {
    /// Compile categories in order
    pub fn compile(categories: &[PatternCategory]) -> Result<Self> {
        let categories = categories
            .iter()
            .map(|category| {
                let patterns = category
                    .patterns
                    .iter()
                    .map(|pattern| {
                        Regex::new(pattern)
                            .map(|regex| (pattern.clone(), regex))
                            .map_err(|e| ChunkerError::invalid_pattern(pattern, e))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledCategory {
                    name: category.name.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { categories })
    }

    /// Library for a config, reusing the shared built-in compilation when the
    /// config keeps the default patterns
    pub fn for_config(config: &ChunkerConfig) -> Result<Self> {
        if config.patterns == default_patterns() {
            if let Some(library) = DEFAULT_LIBRARY.as_ref() {
                return Ok(library.clone());
            }
        }
        Self::compile(&config.patterns)
    }

    /// Category names in evaluation order
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Match a definition's name and doc comment against every category.
    ///
    /// Both inputs are lowercased. The first matching pattern of each category
    /// becomes a key phrase, and the reported type is the last category that
    /// matched.
    #[must_use]
    pub fn classify(&self, name: &str, doc_comment: Option<&str>) -> SemanticMatch {
        let name = name.to_lowercase();
        let doc = doc_comment.unwrap_or_default().to_lowercase();

        let mut result = SemanticMatch::default();
        for category in &self.categories {
            let hit = category
                .patterns
                .iter()
                .find(|(_, regex)| regex.is_match(&name) || regex.is_match(&doc));
            if let Some((pattern, _)) = hit {
                result.semantic_type = Some(category.name.clone());
                result.key_phrases.push(pattern.clone());
            }
        }
        result
    }
}

/// Outcome of [`PatternLibrary::classify`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticMatch {
    /// Last matching category
    pub semantic_type: Option<String>,
    /// First matching pattern of every matching category, in category order
    pub key_phrases: Vec<String>,
}

impl SemanticMatch {
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.semantic_type.is_some()
    }
}

/// Business domain guessed from a definition name
#[must_use]
pub fn business_domain(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    if name.contains("revenue") || name.contains("payment") {
        Some("finance")
    } else if name.contains("user") || name.contains("auth") {
        Some("user_management")
    } else if name.contains("data") || name.contains("process") {
        Some("data_processing")
    } else {
        None
    }
}

/// Size tier of a chunk by line count
#[must_use]
pub fn complexity_level(lines: usize, config: &ChunkerConfig) -> &'static str {
    if lines > config.complex_line_threshold {
        "complex"
    } else if lines > config.medium_line_threshold {
        "medium"
    } else {
        "simple"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn library() -> PatternLibrary {
        PatternLibrary::for_config(&ChunkerConfig::default()).unwrap()
    }

    #[test]
    fn last_matching_category_wins() {
        let result = library().classify("validate_user_token", None);
        assert_eq!(result.semantic_type.as_deref(), Some("authentication"));
        assert_eq!(
            result.key_phrases,
            vec!["validate.*user".to_string(), "validate.*token".to_string()]
        );
    }

    #[test]
    fn doc_comment_is_searched() {
        let result = library().classify("run", Some("Fetch the DATA from the store"));
        assert_eq!(result.semantic_type.as_deref(), Some("database"));
    }

    #[test]
    fn unmatched_names_have_no_type() {
        let result = library().classify("compute_total", None);
        assert!(!result.is_match());
        assert!(result.key_phrases.is_empty());
    }

    #[test]
    fn category_order_is_preserved() {
        let names: Vec<_> = library().category_names().map(String::from).collect();
        assert_eq!(
            names,
            vec![
                "business_logic",
                "data_processing",
                "authentication",
                "database",
                "api"
            ]
        );
    }

    #[test]
    fn business_domains() {
        assert_eq!(business_domain("process_payment"), Some("finance"));
        assert_eq!(business_domain("load_User"), Some("user_management"));
        assert_eq!(business_domain("process_request"), Some("data_processing"));
        assert_eq!(business_domain("render"), None);
    }

    #[test]
    fn complexity_tiers() {
        let config = ChunkerConfig::default();
        assert_eq!(complexity_level(20, &config), "simple");
        assert_eq!(complexity_level(21, &config), "medium");
        assert_eq!(complexity_level(50, &config), "medium");
        assert_eq!(complexity_level(51, &config), "complex");
    }
}
