/// Counts decision points in chunk content.
///
/// A trimmed line containing any keyword counts once, no matter how many
/// keywords it holds.
#[derive(Debug, Clone)]
pub struct ComplexityScorer {
    keywords: Vec<String>,
}

impl ComplexityScorer {
    #[must_use]
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    #[must_use]
    pub fn score(&self, content: &str) -> u32 {
        let lines = content
            .split('\n')
            .map(str::trim)
            .filter(|line| self.keywords.iter().any(|kw| line.contains(kw.as_str())))
            .count();
        u32::try_from(lines).unwrap_or(u32::MAX)
    }
}

impl Default for ComplexityScorer {
    fn default() -> Self {
        Self::new(crate::ChunkerConfig::default().complexity_keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_line_once() {
        let scorer = ComplexityScorer::default();
        let code = "\
def f(x):
    if x and y:
        return 1
    for i in x:
        pass
    while True:
        break
";
        assert_eq!(scorer.score(code), 3);
    }

    #[test]
    fn keywords_need_trailing_space() {
        let scorer = ComplexityScorer::default();
        assert_eq!(scorer.score("ifx = 1\nforeach()"), 0);
        // substring matches inside words still count
        assert_eq!(scorer.score("color = 'red'"), 1);
    }
}
