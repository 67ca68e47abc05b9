//! Markdown syntax insertion for the toolbar and keyboard shortcuts
//!
//! All offsets are character indices into the content, not byte indices.
//!
//! # Usage
//! ```ignore
//! use markwise::editor::{insert_markdown_syntax, FormatCommand, Selection};
//!
//! let result = insert_markdown_syntax(
//!     "Hello world",
//!     Selection::new(0, 5), // "Hello"
//!     &FormatCommand::Bold.syntax(),
//! );
//! assert_eq!(result.new_content, "**Hello** world");
//! ```

use serde::Serialize;

use crate::string_utils::char_index_to_byte_index;

// ─────────────────────────────────────────────────────────────────────────────
// Selection and Syntax
// ─────────────────────────────────────────────────────────────────────────────

/// A character range in the editor; `start == end` is a plain cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Collapsed selection at `offset`.
    pub fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Ordered and clamped to `len` characters.
    fn normalized(self, len: usize) -> Self {
        let start = self.start.min(self.end).min(len);
        let end = self.start.max(self.end).min(len);
        Self { start, end }
    }
}

/// Text to put around a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyntaxDescriptor<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    /// Inserted between prefix and suffix when nothing is selected
    pub placeholder: &'a str,
}

impl<'a> SyntaxDescriptor<'a> {
    pub fn new(prefix: &'a str, suffix: &'a str, placeholder: &'a str) -> Self {
        Self {
            prefix,
            suffix,
            placeholder,
        }
    }

    /// Line-prefix syntax such as `# ` or `> ` with no suffix.
    pub fn line_prefix(prefix: &'a str, placeholder: &'a str) -> Self {
        Self::new(prefix, "", placeholder)
    }
}

/// Result of an insertion: new content and the range to re-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertResult {
    pub new_content: String,
    /// Covers the wrapped or inserted text, without prefix and suffix
    pub new_selection: Selection,
}

// ─────────────────────────────────────────────────────────────────────────────
// Insertion
// ─────────────────────────────────────────────────────────────────────────────

/// Wrap the selection in `syntax`, or insert `prefix + placeholder + suffix`
/// at the cursor when the selection is empty.
///
/// Reversed selections are ordered and out-of-range offsets are clamped to
/// the end of the content.
pub fn insert_markdown_syntax(
    content: &str,
    selection: Selection,
    syntax: &SyntaxDescriptor<'_>,
) -> InsertResult {
    let selection = selection.normalized(content.chars().count());
    let start_byte = char_index_to_byte_index(content, selection.start);
    let end_byte = char_index_to_byte_index(content, selection.end);

    let selected = &content[start_byte..end_byte];
    let body = if selected.is_empty() {
        syntax.placeholder
    } else {
        selected
    };

    let mut new_content = String::with_capacity(
        content.len() + syntax.prefix.len() + syntax.suffix.len() + syntax.placeholder.len(),
    );
    new_content.push_str(&content[..start_byte]);
    new_content.push_str(syntax.prefix);
    new_content.push_str(body);
    new_content.push_str(syntax.suffix);
    new_content.push_str(&content[end_byte..]);

    let body_start = selection.start + syntax.prefix.chars().count();
    InsertResult {
        new_content,
        new_selection: Selection::new(body_start, body_start + body.chars().count()),
    }
}

/// Replace the selection with `tab_size` spaces and place the cursor after them.
pub fn insert_indent(content: &str, selection: Selection, tab_size: usize) -> InsertResult {
    let spaces = " ".repeat(tab_size);
    let selection = selection.normalized(content.chars().count());
    let start_byte = char_index_to_byte_index(content, selection.start);
    let end_byte = char_index_to_byte_index(content, selection.end);
    let new_content = format!("{}{}{}", &content[..start_byte], spaces, &content[end_byte..]);
    InsertResult {
        new_content,
        new_selection: Selection::cursor(selection.start + tab_size),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Toolbar Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Formatting actions offered by the editor toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    /// Bold text (**text**)
    Bold,
    /// Italic text (*text*)
    Italic,
    /// Inline code (`code`)
    InlineCode,
    /// Link ([text](url))
    Link,
    /// Heading level 1 or 2
    Heading(u8),
    /// Bullet list
    BulletList,
    /// Numbered list
    NumberedList,
    /// Blockquote
    Blockquote,
    /// Three-column table skeleton
    Table,
    /// Image (![alt](url))
    Image,
}

impl FormatCommand {
    /// Every command, in toolbar order.
    pub const ALL: [FormatCommand; 11] = [
        Self::Bold,
        Self::Italic,
        Self::InlineCode,
        Self::Link,
        Self::Heading(1),
        Self::Heading(2),
        Self::BulletList,
        Self::NumberedList,
        Self::Blockquote,
        Self::Table,
        Self::Image,
    ];

    /// The syntax this command inserts.
    pub fn syntax(&self) -> SyntaxDescriptor<'static> {
        match self {
            Self::Bold => SyntaxDescriptor::new("**", "**", "bold text"),
            Self::Italic => SyntaxDescriptor::new("*", "*", "italic text"),
            Self::InlineCode => SyntaxDescriptor::new("`", "`", "code"),
            Self::Link => SyntaxDescriptor::new("[", "](url)", "link text"),
            Self::Heading(1) => SyntaxDescriptor::line_prefix("# ", "Heading 1"),
            Self::Heading(_) => SyntaxDescriptor::line_prefix("## ", "Heading 2"),
            Self::BulletList => SyntaxDescriptor::line_prefix("- ", "list item"),
            Self::NumberedList => SyntaxDescriptor::line_prefix("1. ", "list item"),
            Self::Blockquote => SyntaxDescriptor::line_prefix("> ", "quote"),
            Self::Table => SyntaxDescriptor::new(
                "| Column 1 | Column 2 | Column 3 |\n| --- | --- | --- |\n| ",
                " |  |  |",
                "content",
            ),
            Self::Image => SyntaxDescriptor::new("![", "](url)", "image description"),
        }
    }

    /// Get the keyboard shortcut label for this command, if it has one.
    pub fn shortcut_label(&self) -> Option<&'static str> {
        match self {
            Self::Bold => Some("Ctrl+B"),
            Self::Italic => Some("Ctrl+I"),
            Self::InlineCode => Some("Ctrl+`"),
            Self::Link => Some("Ctrl+K"),
            _ => None,
        }
    }

    /// Command bound to Ctrl/Cmd + `key`. Shifted keys are not shortcuts.
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key {
            'b' => Some(Self::Bold),
            'i' => Some(Self::Italic),
            '`' => Some(Self::InlineCode),
            'k' => Some(Self::Link),
            _ => None,
        }
    }

    /// Get the tooltip text for this command.
    pub fn tooltip(&self) -> String {
        let name = match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::InlineCode => "Inline Code",
            Self::Link => "Link",
            Self::Heading(1) => "Heading 1",
            Self::Heading(_) => "Heading 2",
            Self::BulletList => "Bullet List",
            Self::NumberedList => "Numbered List",
            Self::Blockquote => "Quote",
            Self::Table => "Table",
            Self::Image => "Image",
        };
        match self.shortcut_label() {
            Some(shortcut) => format!("{} ({})", name, shortcut),
            None => name.to_string(),
        }
    }

    /// Apply this command to `content`.
    pub fn apply(&self, content: &str, selection: Selection) -> InsertResult {
        insert_markdown_syntax(content, selection, &self.syntax())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
