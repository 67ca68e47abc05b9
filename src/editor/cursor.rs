//! Cursor and line navigation for the editor
//!
//! Offsets are character indices; lines and columns shown to the user are
//! 1-based, as in the status bar and the jump-to-line dialog.

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Count the number of lines in the given text.
///
/// Returns at least 1 for empty text (representing a single empty line).
pub fn count_lines(text: &str) -> usize {
    text.chars().filter(|&c| c == '\n').count() + 1
}

/// 1-based (line, column) of the character offset `offset`.
///
/// Offsets past the end report the position after the last character.
pub fn cursor_position(content: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for ch in content.chars().take(offset) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

/// Character offset of the first character on the 1-based `line`.
///
/// Line 0 is treated as line 1, and lines past the end resolve to the start
/// of the last line.
pub fn line_start_offset(content: &str, line: usize) -> usize {
    let target = line.max(1);
    let mut current = 1;
    let mut line_start = 0;

    for (i, ch) in content.chars().enumerate() {
        if current == target {
            return line_start;
        }
        if ch == '\n' {
            current += 1;
            line_start = i + 1;
        }
    }

    line_start
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("Hello, World!"), 1);
        assert_eq!(count_lines("Line 1\nLine 2\nLine 3"), 3);
        assert_eq!(count_lines("Line 1\n"), 2);
        assert_eq!(count_lines("\n\n\n"), 4);
    }

    #[test]
    fn test_cursor_position_empty() {
        assert_eq!(cursor_position("", 0), (1, 1));
    }

    #[test]
    fn test_cursor_position_multiline() {
        let text = "Hello\nWorld\n!";
        assert_eq!(cursor_position(text, 0), (1, 1)); // 'H'
        assert_eq!(cursor_position(text, 5), (1, 6)); // '\n'
        assert_eq!(cursor_position(text, 6), (2, 1)); // 'W'
        assert_eq!(cursor_position(text, 12), (3, 1)); // '!'
        assert_eq!(cursor_position(text, 99), (3, 2));
    }

    #[test]
    fn test_cursor_position_counts_characters() {
        assert_eq!(cursor_position("中文\nå", 4), (2, 2));
    }

    #[test]
    fn test_line_start_offset() {
        let text = "Hello\nWorld\n!";
        assert_eq!(line_start_offset(text, 1), 0);
        assert_eq!(line_start_offset(text, 2), 6);
        assert_eq!(line_start_offset(text, 3), 12);
    }

    #[test]
    fn test_line_start_offset_clamps() {
        let text = "Hi\nBye";
        assert_eq!(line_start_offset(text, 0), 0);
        assert_eq!(line_start_offset(text, 10), 3);
        assert_eq!(line_start_offset("", 5), 0);
        assert_eq!(line_start_offset("a\n", 2), 2);
    }

    #[test]
    fn test_roundtrip() {
        let text = "Line 1\nLine 2\nLine 3";
        for line in 1..=3 {
            let offset = line_start_offset(text, line);
            assert_eq!(cursor_position(text, offset), (line, 1));
        }
    }
}
