//! Chapter heading patterns

use regex::{Regex, RegexBuilder};
use tracing::info;
use crate::error::{Error, Result};

/// Built-in heading patterns, tried in order
pub const DEFAULT_PATTERNS: [&str; 6] = [
    r"^第[一二三四五六七八九十\d]+章",
    r"^Chapter\s+\d+",
    r"^\d+\.\s+\S+",
    r"^第\d+节",
    r"^第[一二三四五六七八九十\d]+部分",
    r"^Section\s+\d+",
];

/// Ordered set of case-insensitive heading patterns
///
/// Every pattern is matched at the start of a (trimmed) line.
#[derive(Debug, Clone)]
pub struct ChapterPatterns {
    patterns: Vec<Regex>,
}

fn compile(source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })
}

impl ChapterPatterns {
    /// The built-in patterns only
    pub fn new() -> Self {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .filter_map(|p| compile(p).ok())
            .collect();
        Self { patterns }
    }

    /// No patterns at all; nothing will match until one is added
    pub fn empty() -> Self {
        Self { patterns: Vec::new() }
    }

    /// Append a user pattern after the existing ones
    ///
    /// The pattern is anchored at the start of the line, so `附录` behaves
    /// like `^附录`.
    pub fn add_custom(&mut self, pattern: &str) -> Result<()> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }

        // Validate the pattern as written so errors point at the user's text
        compile(pattern)?;
        let anchored = compile(&format!("^(?:{pattern})"))?;

        info!(pattern, "added custom chapter pattern");
        self.patterns.push(anchored);
        Ok(())
    }

    /// Whether any pattern matches the start of `line`
    pub fn matches(&self, line: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(line))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern sources, in match order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

impl Default for ChapterPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Split newline-separated pattern input (as sent by the upload form)
pub fn parse_pattern_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_compile() {
        assert_eq!(ChapterPatterns::new().len(), DEFAULT_PATTERNS.len());
    }

    #[test]
    fn test_default_patterns_match_headings() {
        let patterns = ChapterPatterns::new();

        assert!(patterns.matches("第一章 总论"));
        assert!(patterns.matches("第12章"));
        assert!(patterns.matches("Chapter 3 The Return"));
        assert!(patterns.matches("CHAPTER 10"));
        assert!(patterns.matches("chapter   7"));
        assert!(patterns.matches("1. Introduction"));
        assert!(patterns.matches("第3节 方法"));
        assert!(patterns.matches("第二部分"));
        assert!(patterns.matches("Section 2"));
    }

    #[test]
    fn test_default_patterns_reject_body_text() {
        let patterns = ChapterPatterns::new();

        assert!(!patterns.matches("In this chapter we discuss"));
        assert!(!patterns.matches("Chapter one"));
        assert!(!patterns.matches("1."));
        assert!(!patterns.matches("3.14 is pi"));
        assert!(!patterns.matches("第三节"));
        assert!(!patterns.matches("  Chapter 1"));
    }

    #[test]
    fn test_custom_pattern_is_anchored() {
        let mut patterns = ChapterPatterns::empty();
        patterns.add_custom("附录").unwrap();

        assert!(patterns.matches("附录A 参考资料"));
        assert!(!patterns.matches("见附录"));
    }

    #[test]
    fn test_custom_pattern_alternation_stays_anchored() {
        let mut patterns = ChapterPatterns::empty();
        patterns.add_custom("Part|Book").unwrap();

        assert!(patterns.matches("Book II"));
        assert!(!patterns.matches("The Book"));
    }

    #[test]
    fn test_custom_pattern_trimmed_and_case_insensitive() {
        let mut patterns = ChapterPatterns::empty();
        patterns.add_custom("  appendix\\s+[a-z]  ").unwrap();

        assert!(patterns.matches("APPENDIX B"));
    }

    #[test]
    fn test_empty_custom_pattern_rejected() {
        let mut patterns = ChapterPatterns::new();
        assert!(matches!(patterns.add_custom("   "), Err(Error::EmptyPattern)));
        assert_eq!(patterns.len(), DEFAULT_PATTERNS.len());
    }

    #[test]
    fn test_invalid_custom_pattern_rejected() {
        let mut patterns = ChapterPatterns::new();
        let err = patterns.add_custom("Chapter (\\d+").unwrap_err();

        match err {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "Chapter (\\d+"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(patterns.len(), DEFAULT_PATTERNS.len());
    }

    #[test]
    fn test_custom_patterns_append_after_defaults() {
        let mut patterns = ChapterPatterns::new();
        patterns.add_custom("Prologue").unwrap();

        let sources: Vec<&str> = patterns.sources().collect();
        assert_eq!(sources[0], DEFAULT_PATTERNS[0]);
        assert_eq!(sources.last(), Some(&"^(?:Prologue)"));
    }

    #[test]
    fn test_parse_pattern_list() {
        let parsed = parse_pattern_list("^附录.*\r\n\n   \n  Part\\s+\\d+  \n");
        assert_eq!(parsed, vec!["^附录.*".to_string(), "Part\\s+\\d+".to_string()]);
        assert!(parse_pattern_list("").is_empty());
    }
}
