//! Task list checkboxes
//!
//! A list item whose paragraph starts with `[ ] ` or `[x] ` becomes a task:
//! the marker is removed from the text and a disabled checkbox is prepended.

use super::token::{Token, TokenKind};

const CHECKED_BOX: &str = r#"<input type="checkbox" checked disabled> "#;
const UNCHECKED_BOX: &str = r#"<input type="checkbox" disabled> "#;

/// Length in bytes of `[ ] ` / `[x] `.
const MARKER_LEN: usize = 4;

/// Checked state of a task marker at the start of `content`.
pub fn task_marker(content: &str) -> Option<bool> {
    let bytes = content.as_bytes();
    if bytes.len() < MARKER_LEN || bytes[0] != b'[' || bytes[2] != b']' || bytes[3] != b' ' {
        return None;
    }
    match bytes[1] {
        b' ' => Some(false),
        b'x' => Some(true),
        _ => None,
    }
}

/// Turn every list-item paragraph that starts with a task marker into a task.
pub fn apply_task_lists(tokens: &mut [Token]) {
    for i in 2..tokens.len() {
        if tokens[i].kind != TokenKind::Inline
            || !tokens[i - 1].is_open(TokenKind::Paragraph)
            || !tokens[i - 2].is_open(TokenKind::ListItem)
        {
            continue;
        }
        if let Some(checked) = task_marker(&tokens[i].content) {
            convert_to_task(&mut tokens[i], checked);
        }
    }
}

fn convert_to_task(inline: &mut Token, checked: bool) {
    inline.content = inline.content[MARKER_LEN..].to_string();

    if let Some(first) = inline.children.first_mut() {
        if first.kind == TokenKind::Text && task_marker(&first.content).is_some() {
            first.content = first.content[MARKER_LEN..].to_string();
            if first.content.is_empty() {
                inline.children.remove(0);
            }
        }
    }

    let checkbox = if checked { CHECKED_BOX } else { UNCHECKED_BOX };
    inline.children.insert(
        0,
        Token::inline_leaf(TokenKind::HtmlInline, "", checkbox),
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
