//! List and blockquote continuation
//!
//! Looks at the text right before the cursor after the user pressed Enter
//! and decides what, if anything, should be typed for them.

use log::debug;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::string_utils::char_index_to_byte_index;

/// Ordered list marker on a fresh line, e.g. `\n2. `
fn ordered_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\n([0-9]+)\. $").expect("ordered marker pattern is valid")
    })
}

/// Outcome of [`auto_complete_markdown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub should_complete: bool,
    /// Text to insert at the cursor; empty means "insert nothing"
    pub completion: Option<String>,
    /// Character offset of the cursor after inserting `completion`
    pub new_cursor: Option<usize>,
}

impl Completion {
    fn none() -> Self {
        Self::default()
    }

    fn insert(text: String, cursor: usize) -> Self {
        let new_cursor = cursor + text.chars().count();
        Self {
            should_complete: true,
            completion: Some(text),
            new_cursor: Some(new_cursor),
        }
    }
}

/// Decide the continuation for the marker right before `cursor`.
///
/// - `- `, `* ` or `+ ` on a new line with the cursor at a line end: an
///   explicit empty completion, which suppresses further continuation.
/// - `N. ` on a new line: the next number, `N+1. `.
/// - `> ` on a new line: another `> `.
///
/// `cursor` is a character offset and is clamped to the content.
pub fn auto_complete_markdown(content: &str, cursor: usize) -> Completion {
    let split = char_index_to_byte_index(content, cursor);
    let cursor = cursor.min(content.chars().count());
    let (before, after) = content.split_at(split);

    let at_line_end = after.is_empty() || after.starts_with('\n');
    if at_line_end && ["\n- ", "\n* ", "\n+ "].iter().any(|m| before.ends_with(m)) {
        return Completion::insert(String::new(), cursor);
    }

    if let Some(caps) = ordered_marker_regex().captures(before) {
        match caps[1].parse::<u64>() {
            Ok(number) => {
                return Completion::insert(format!("{}. ", number.saturating_add(1)), cursor);
            }
            Err(e) => debug!("List number {} not continued: {}", &caps[1], e),
        }
    }

    if before.ends_with("\n> ") {
        return Completion::insert("> ".to_string(), cursor);
    }

    Completion::none()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_list_increments() {
        let content = "1. one\n2. ";
        let result = auto_complete_markdown(content, content.chars().count());
        assert!(result.should_complete);
        assert_eq!(result.completion.as_deref(), Some("3. "));
        assert_eq!(result.new_cursor, Some(13));
    }

    #[test]
    fn test_ordered_list_grows_digits() {
        let content = "text\n9. ";
        let result = auto_complete_markdown(content, 8);
        assert_eq!(result.completion.as_deref(), Some("10. "));
        assert_eq!(result.new_cursor, Some(12));
    }

    #[test]
    fn test_unordered_marker_suppresses() {
        for marker in ["- ", "* ", "+ "] {
            let content = format!("item\n{}", marker);
            let cursor = content.chars().count();
            let result = auto_complete_markdown(&content, cursor);
            assert!(result.should_complete);
            assert_eq!(result.completion.as_deref(), Some(""));
            assert_eq!(result.new_cursor, Some(cursor));
        }
    }

    #[test]
    fn test_unordered_marker_before_newline() {
        let result = auto_complete_markdown("a\n- \nb", 4);
        assert_eq!(result.completion.as_deref(), Some(""));
        assert_eq!(result.new_cursor, Some(4));
    }

    #[test]
    fn test_unordered_marker_mid_line_is_ignored() {
        let result = auto_complete_markdown("a\n- text", 4);
        assert_eq!(result, Completion::none());
    }

    #[test]
    fn test_blockquote_continues() {
        let result = auto_complete_markdown("quote\n> ", 8);
        assert_eq!(result.completion.as_deref(), Some("> "));
        assert_eq!(result.new_cursor, Some(10));
    }

    #[test]
    fn test_marker_on_first_line_is_ignored() {
        // Markers only count after a newline
        assert_eq!(auto_complete_markdown("- ", 2), Completion::none());
        assert_eq!(auto_complete_markdown("1. ", 3), Completion::none());
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(auto_complete_markdown("hello", 5), Completion::none());
        assert_eq!(auto_complete_markdown("", 0), Completion::none());
    }

    #[test]
    fn test_cursor_is_character_offset() {
        let content = "中文\n1. ";
        let result = auto_complete_markdown(content, 6);
        assert_eq!(result.completion.as_deref(), Some("2. "));
        assert_eq!(result.new_cursor, Some(9));
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        let result = auto_complete_markdown("x\n> ", 100);
        assert_eq!(result.new_cursor, Some(6));
    }
}
