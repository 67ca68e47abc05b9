//! Table of contents and document outline
//!
//! [`extract_toc`] walks its own freshly parsed token stream with its own
//! [`HeadingCounter`], so the numbers it reports match the rendered preview
//! without sharing anything with the renderer. The outline panel then pairs
//! TOC entries with source lines positionally ([`assign_lines`]).

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::numbering::HeadingCounter;
use super::parser::parse_tokens;
use super::render::RenderOptions;
use super::token::{Nesting, TokenKind};

// ─────────────────────────────────────────────────────────────────────────────
// TOC Items
// ─────────────────────────────────────────────────────────────────────────────

/// One heading of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    /// Heading level (1-6 for H1-H6)
    pub level: u8,
    /// Heading text as written, prefixed with its number when numbering is on
    pub title: String,
    /// Slug of the title
    pub anchor: String,
}

/// Extract the table of contents from Markdown source.
pub fn extract_toc(content: &str, options: &RenderOptions) -> Vec<TocItem> {
    let tokens = parse_tokens(content);
    let mut counter = HeadingCounter::new();
    let mut items = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if token.nesting != Nesting::Open {
            continue;
        }
        let Some(level) = token.heading_level() else {
            continue;
        };
        let Some(inline) = tokens
            .get(index + 1)
            .filter(|next| next.kind == TokenKind::Inline)
        else {
            continue;
        };

        let title = if options.auto_number_headings {
            format!("{} {}", counter.next(level), inline.content)
        } else {
            inline.content.clone()
        };
        let anchor = slugify(&title);
        items.push(TocItem {
            level,
            title,
            anchor,
        });
    }

    items
}

/// Anchor slug: lowercase, drop everything except word characters, CJK
/// ideographs, whitespace and hyphens, then join whitespace runs with `-`.
pub fn slugify(title: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    let disallowed = DISALLOWED.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_\x{4e00}-\x{9fa5}\s-]").expect("slug pattern is valid")
    });
    let whitespace =
        WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

    let lowered = title.to_lowercase();
    let stripped = disallowed.replace_all(&lowered, "");
    whitespace.replace_all(&stripped, "-").into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Mapping
// ─────────────────────────────────────────────────────────────────────────────

fn heading_line_regex() -> &'static Regex {
    static HEADING_LINE: OnceLock<Regex> = OnceLock::new();
    HEADING_LINE
        .get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading pattern is valid"))
}

/// Whether a raw source line looks like an ATX heading.
fn is_heading_line(line: &str) -> bool {
    heading_line_regex().is_match(line.trim_end_matches('\r'))
}

/// A TOC entry paired with the source line it was matched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub level: u8,
    pub title: String,
    pub anchor: String,
    /// Line number in the source document (1-indexed)
    pub line: usize,
}

/// Pair TOC entries with source lines.
///
/// Every line that looks like an ATX heading consumes the next unused entry,
/// in order. Heading-like lines inside code fences, and headings the line
/// pattern does not see (setext), shift the pairing; the result is then
/// mismatched rather than corrected.
pub fn assign_lines(content: &str, toc: &[TocItem]) -> Vec<OutlineItem> {
    let mut items = Vec::with_capacity(toc.len());
    let mut entries = toc.iter();

    for (index, line) in content.split('\n').enumerate() {
        if !is_heading_line(line) {
            continue;
        }
        let Some(entry) = entries.next() else {
            break;
        };
        items.push(OutlineItem {
            level: entry.level,
            title: entry.title.clone(),
            anchor: entry.anchor.clone(),
            line: index + 1,
        });
    }

    items
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentOutline
// ─────────────────────────────────────────────────────────────────────────────

/// A complete document outline containing all headings with their lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentOutline {
    /// All heading items in document order
    pub items: Vec<OutlineItem>,
}

impl DocumentOutline {
    /// Build the outline for `content`.
    pub fn from_content(content: &str, options: &RenderOptions) -> Self {
        let toc = extract_toc(content, options);
        Self {
            items: assign_lines(content, &toc),
        }
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of headings at each level.
    pub fn level_counts(&self) -> [usize; 6] {
        let mut counts = [0usize; 6];
        for item in &self.items {
            if (1..=6).contains(&item.level) {
                counts[usize::from(item.level - 1)] += 1;
            }
        }
        counts
    }

    /// Get a summary string like "3 H1, 5 H2, 2 H3"
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .level_counts()
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, count)| format!("{} H{}", count, i + 1))
            .collect();
        if parts.is_empty() {
            "No headings".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Find the index of the heading whose section contains `line`.
    ///
    /// Returns None if the line is before any heading.
    pub fn find_current_section(&self, line: usize) -> Option<usize> {
        self.items
            .iter()
            .take_while(|item| item.line <= line)
            .count()
            .checked_sub(1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preview Navigation
// ─────────────────────────────────────────────────────────────────────────────

/// Where the preview should scroll for a source line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewTarget {
    /// Index of the rendered heading element (in document order)
    Heading(usize),
    /// Fraction of the preview height, 0.0 to 1.0
    Ratio(f64),
}

/// Index of the rendered heading for a 1-indexed source `line`, if that line
/// is a heading line.
///
/// Heading-like lines before the target are counted, so this shares the
/// positional assumptions of [`assign_lines`].
pub fn preview_heading_index(content: &str, line: usize) -> Option<usize> {
    let lines: Vec<&str> = content.split('\n').collect();
    let target = lines.get(line.checked_sub(1)?)?;
    if !is_heading_line(target) {
        return None;
    }
    Some(
        lines[..line - 1]
            .iter()
            .filter(|candidate| is_heading_line(candidate))
            .count(),
    )
}

/// Preview scroll target for a source line: the heading element when the
/// line is a heading, otherwise a proportional position.
pub fn preview_jump_target(content: &str, line: usize) -> PreviewTarget {
    if let Some(index) = preview_heading_index(content, line) {
        return PreviewTarget::Heading(index);
    }
    let total = content.split('\n').count().max(1);
    let ratio = line.saturating_sub(1) as f64 / total as f64;
    PreviewTarget::Ratio(ratio.clamp(0.0, 1.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::render::render_markdown;

    const NUMBERED: RenderOptions = RenderOptions {
        auto_number_headings: true,
    };
    const PLAIN: RenderOptions = RenderOptions {
        auto_number_headings: false,
    };

    // ─────────────────────────────────────────────────────────────────────────
    // Extraction
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_extract_toc_numbered() {
        let toc = extract_toc("# Intro\n## Setup\n## Usage\n### CLI\n# End", &NUMBERED);
        let titles: Vec<&str> = toc.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["1 Intro", "1.1 Setup", "1.2 Usage", "1.2.1 CLI", "2 End"]
        );
        assert_eq!(toc[3].level, 3);
        assert_eq!(toc[1].anchor, "11-setup");
    }

    #[test]
    fn test_extract_toc_plain() {
        let toc = extract_toc("# Intro\n## Setup", &PLAIN);
        assert_eq!(toc[0].title, "Intro");
        assert_eq!(toc[0].anchor, "intro");
        assert_eq!(toc[1].title, "Setup");
    }

    #[test]
    fn test_extract_toc_keeps_inline_markup() {
        let toc = extract_toc("# Hello **World**", &PLAIN);
        assert_eq!(toc[0].title, "Hello **World**");
        assert_eq!(toc[0].anchor, "hello-world");
    }

    #[test]
    fn test_extract_toc_ignores_code_fences() {
        let toc = extract_toc("```\n# not a heading\n```\n# Real", &PLAIN);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].title, "Real");
    }

    #[test]
    fn test_block_math_before_underline_is_not_a_heading() {
        let toc = extract_toc("$$\nx\n$$\n---\n# A\n$$\ny\n$$\n===\n## B", &NUMBERED);
        let titles: Vec<&str> = toc.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["1 A", "1.1 B"]);
    }

    #[test]
    fn test_toc_matches_rendered_headings() {
        let source = "# A\n### B\n## C\n# D\n## E";
        let html = render_markdown(source, &NUMBERED);
        for item in extract_toc(source, &NUMBERED) {
            let tag = format!("<h{}>{}</h{}>", item.level, item.title, item.level);
            assert!(html.contains(&tag), "missing {} in {}", tag, html);
        }
    }

    #[test]
    fn test_toc_serializes() {
        let toc = extract_toc("# A", &NUMBERED);
        let json = serde_json::to_string(&toc).unwrap();
        assert_eq!(json, r#"[{"level":1,"title":"1 A","anchor":"1-a"}]"#);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Slugs
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("1.2 What's New?"), "12-whats-new");
        assert_eq!(slugify("multiple   spaces"), "multiple-spaces");
        assert_eq!(slugify("keep-hyphen_and_underscore"), "keep-hyphen_and_underscore");
    }

    #[test]
    fn test_slugify_keeps_cjk() {
        assert_eq!(slugify("1 中文 标题"), "1-中文-标题");
    }

    #[test]
    fn test_slugify_drops_other_scripts() {
        assert_eq!(slugify("Café Ørsted"), "caf-rsted");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Line Mapping
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_assign_lines() {
        let source = "# One\ntext\n\n## Two\nmore\n# Three";
        let outline = assign_lines(source, &extract_toc(source, &NUMBERED));
        let lines: Vec<usize> = outline.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 4, 6]);
        assert_eq!(outline[1].title, "1.1 Two");
    }

    #[test]
    fn test_assign_lines_desync_inside_fence() {
        // The fenced line is paired with the first real heading
        let source = "```\n# fake\n```\n# Real";
        let outline = assign_lines(source, &extract_toc(source, &PLAIN));
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].title, "Real");
        assert_eq!(outline[0].line, 2);
    }

    #[test]
    fn test_document_outline_sections() {
        let outline = DocumentOutline::from_content("intro\n# A\nx\n## B\ny", &NUMBERED);
        assert_eq!(outline.find_current_section(1), None);
        assert_eq!(outline.find_current_section(2), Some(0));
        assert_eq!(outline.find_current_section(3), Some(0));
        assert_eq!(outline.find_current_section(5), Some(1));
    }

    #[test]
    fn test_document_outline_summary() {
        let outline = DocumentOutline::from_content("# A\n## B\n## C", &NUMBERED);
        assert_eq!(outline.level_counts(), [1, 2, 0, 0, 0, 0]);
        assert_eq!(outline.summary(), "1 H1, 2 H2");
        assert_eq!(DocumentOutline::default().summary(), "No headings");
        assert!(DocumentOutline::default().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preview Navigation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_preview_heading_index() {
        let source = "# A\ntext\n## B\n### C";
        assert_eq!(preview_heading_index(source, 1), Some(0));
        assert_eq!(preview_heading_index(source, 2), None);
        assert_eq!(preview_heading_index(source, 3), Some(1));
        assert_eq!(preview_heading_index(source, 4), Some(2));
        assert_eq!(preview_heading_index(source, 0), None);
        assert_eq!(preview_heading_index(source, 99), None);
    }

    #[test]
    fn test_preview_jump_target() {
        let source = "# A\nline\nline\nline";
        assert_eq!(preview_jump_target(source, 1), PreviewTarget::Heading(0));
        assert_eq!(preview_jump_target(source, 3), PreviewTarget::Ratio(0.5));
    }
}
