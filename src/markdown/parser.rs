//! Markdown parser implementation using comrak
//!
//! This module wraps comrak's parsing functions and converts comrak's AST
//! into the flat token stream the renderer and TOC extractor work on. Math
//! placeholders inserted by [`super::math::extract_math`] are resolved here.

use comrak::{
    nodes::{AstNode, ListType, NodeValue, TableAlignment},
    parse_document, Arena, Options,
};

use super::math::{extract_math, InlinePiece, MathTable};
use super::tasklist::apply_task_lists;
use super::token::{heading_tag, plain_text, Token, TokenKind};
use crate::string_utils::safe_slice_from;

// ─────────────────────────────────────────────────────────────────────────────
// Parser Options
// ─────────────────────────────────────────────────────────────────────────────

/// comrak options for the editor's Markdown dialect.
///
/// Raw HTML is always allowed; it is emitted by our own renderer, so
/// comrak's `unsafe_` render flag does not apply.
fn comrak_options() -> Options {
    let mut options = Options::default();

    // Extension options
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    // Task lists are handled by our own pass
    options.extension.tasklist = false;

    // Typographic replacements (quotes, dashes, ellipses)
    options.parse.smart = true;

    options
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Parse Markdown into a flat token stream.
///
/// Math and task-list extensions are applied; heading numbering is not,
/// since that depends on render options.
///
/// # Example
/// ```ignore
/// let tokens = parse_tokens("# Title\n\nText with $x$");
/// assert_eq!(tokens[0].heading_level(), Some(1));
/// ```
pub fn parse_tokens(content: &str) -> Vec<Token> {
    let (source, math) = extract_math(content);

    let arena = Arena::new();
    let root = parse_document(&arena, &source, &comrak_options());

    let mut converter = Converter {
        lines: source.split('\n').collect(),
        math: &math,
        tokens: Vec::new(),
    };
    converter.convert_block(root, false);

    let mut tokens = converter.tokens;
    apply_task_lists(&mut tokens);
    tokens
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion
// ─────────────────────────────────────────────────────────────────────────────

struct Converter<'s> {
    /// Placeholder-substituted source, split into lines
    lines: Vec<&'s str>,
    math: &'s MathTable,
    tokens: Vec<Token>,
}

impl<'s> Converter<'s> {
    /// Convert a block-level comrak node. `tight` marks paragraphs inside
    /// tight lists, which render without `<p>` tags.
    fn convert_block<'a>(&mut self, node: &'a AstNode<'a>, tight: bool) {
        let ast = node.data.borrow();
        let start = ast.sourcepos.start;
        let end = ast.sourcepos.end;

        match &ast.value {
            NodeValue::Document => self.convert_children(node, false),
            NodeValue::BlockQuote => {
                self.tokens
                    .push(Token::block_open(TokenKind::Blockquote, "blockquote"));
                self.convert_children(node, false);
                self.tokens
                    .push(Token::block_close(TokenKind::Blockquote, "blockquote"));
            }
            NodeValue::List(list) => {
                let (kind, tag) = match list.list_type {
                    ListType::Bullet => (TokenKind::BulletList, "ul"),
                    ListType::Ordered => (TokenKind::OrderedList, "ol"),
                };
                let mut open = Token::block_open(kind, tag);
                if matches!(list.list_type, ListType::Ordered) && list.start != 1 {
                    open = open.with_attr("start", list.start.to_string());
                }
                self.tokens.push(open);
                self.convert_children(node, list.tight);
                self.tokens.push(Token::block_close(kind, tag));
            }
            NodeValue::Item(_) => {
                self.tokens.push(Token::block_open(TokenKind::ListItem, "li"));
                self.convert_children(node, tight);
                self.tokens
                    .push(Token::block_close(TokenKind::ListItem, "li"));
            }
            NodeValue::Paragraph => {
                let content = self.paragraph_source(start.line, start.column, end.line);
                let children = self.convert_inlines(node);
                self.push_paragraph(content, children, tight);
            }
            NodeValue::Heading(heading) => {
                let tag = heading_tag(heading.level);
                let content = if heading.setext {
                    self.setext_heading_source(start.line, start.column, end.line)
                } else {
                    self.atx_heading_source(start.line, start.column)
                };
                let children = self.convert_inlines(node);
                self.tokens.push(Token::block_open(TokenKind::Heading, tag));
                self.tokens.push(Token::inline(content, children));
                self.tokens.push(Token::block_close(TokenKind::Heading, tag));
            }
            NodeValue::CodeBlock(code) => {
                let literal = self.math.expand(&code.literal);
                if code.fenced {
                    let mut token = Token::block_leaf(TokenKind::Fence, "code", literal);
                    token.info = self.math.expand(&code.info);
                    self.tokens.push(token);
                } else {
                    self.tokens
                        .push(Token::block_leaf(TokenKind::CodeBlock, "code", literal));
                }
            }
            NodeValue::HtmlBlock(html) => match self.math.block_at(&html.literal) {
                Some(span) => self.tokens.push(Token::block_leaf(
                    TokenKind::MathBlock,
                    "div",
                    span.expression.clone(),
                )),
                None => self.tokens.push(Token::block_leaf(
                    TokenKind::HtmlBlock,
                    "",
                    self.math.expand(&html.literal),
                )),
            },
            NodeValue::ThematicBreak => {
                self.tokens
                    .push(Token::block_leaf(TokenKind::Rule, "hr", String::new()));
            }
            NodeValue::Table(table) => {
                let alignments = table.alignments.clone();
                self.convert_table(node, &alignments);
            }
            // Front matter, footnotes and other disabled extensions
            _ => self.convert_children(node, tight),
        }
    }

    fn convert_children<'a>(&mut self, node: &'a AstNode<'a>, tight: bool) {
        for child in node.children() {
            self.convert_block(child, tight);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Paragraphs
    // ─────────────────────────────────────────────────────────────────────────

    fn push_paragraph(&mut self, content: String, children: Vec<Token>, tight: bool) {
        let mut open = Token::block_open(TokenKind::Paragraph, "p");
        let mut close = Token::block_close(TokenKind::Paragraph, "p");
        open.hidden = tight;
        close.hidden = tight;
        self.tokens.push(open);
        self.tokens.push(Token::inline(content, children));
        self.tokens.push(close);
    }

    /// Source text of a paragraph, with container markers of continuation
    /// lines removed.
    fn paragraph_source(&self, first: usize, column: usize, last: usize) -> String {
        let mut lines = Vec::new();
        for number in first..=last {
            let Some(line) = self.lines.get(number.wrapping_sub(1)) else {
                break;
            };
            let text = if number == first {
                safe_slice_from(line, column.saturating_sub(1))
            } else {
                line.trim_start_matches(is_container_marker)
            };
            lines.push(text.trim_end_matches('\r'));
        }
        self.math.expand(lines.join("\n").trim())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Headings
    // ─────────────────────────────────────────────────────────────────────────

    /// `## Title ##` -> `Title`
    fn atx_heading_source(&self, line: usize, column: usize) -> String {
        let Some(text) = self.lines.get(line.wrapping_sub(1)) else {
            return String::new();
        };
        let text = safe_slice_from(text, column.saturating_sub(1)).trim();
        let text = text.trim_start_matches('#');
        let text = text.trim();

        // Optional closing sequence must be preceded by whitespace
        let without_hashes = text.trim_end_matches('#');
        let text = if without_hashes.is_empty() {
            without_hashes
        } else if without_hashes.ends_with(|c: char| c == ' ' || c == '\t') {
            without_hashes.trim_end()
        } else {
            text
        };
        self.math.expand(text)
    }

    /// Lines of a setext heading, without the underline.
    fn setext_heading_source(&self, first: usize, column: usize, last: usize) -> String {
        let mut lines = Vec::new();
        for number in first..=last {
            let Some(line) = self.lines.get(number.wrapping_sub(1)) else {
                break;
            };
            if number > first && number == last && is_setext_underline(line) {
                break;
            }
            let text = if number == first {
                safe_slice_from(line, column.saturating_sub(1))
            } else {
                line.trim_start_matches(is_container_marker)
            };
            lines.push(text.trim());
        }
        self.math.expand(&lines.join("\n"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tables
    // ─────────────────────────────────────────────────────────────────────────

    fn convert_table<'a>(&mut self, node: &'a AstNode<'a>, alignments: &[TableAlignment]) {
        self.tokens.push(Token::block_open(TokenKind::Table, "table"));

        let mut body_open = false;
        for row in node.children() {
            let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            if header {
                self.tokens
                    .push(Token::block_open(TokenKind::TableHead, "thead"));
                self.convert_row(row, true, alignments);
                self.tokens
                    .push(Token::block_close(TokenKind::TableHead, "thead"));
            } else {
                if !body_open {
                    self.tokens
                        .push(Token::block_open(TokenKind::TableBody, "tbody"));
                    body_open = true;
                }
                self.convert_row(row, false, alignments);
            }
        }

        if body_open {
            self.tokens
                .push(Token::block_close(TokenKind::TableBody, "tbody"));
        }
        self.tokens.push(Token::block_close(TokenKind::Table, "table"));
    }

    fn convert_row<'a>(&mut self, row: &'a AstNode<'a>, header: bool, alignments: &[TableAlignment]) {
        let (kind, tag) = if header {
            (TokenKind::TableHeaderCell, "th")
        } else {
            (TokenKind::TableCell, "td")
        };

        self.tokens.push(Token::block_open(TokenKind::TableRow, "tr"));
        for (column, cell) in row.children().enumerate() {
            let mut open = Token::block_open(kind, tag);
            if let Some(align) = alignments.get(column).and_then(|a| alignment_name(*a)) {
                open = open.with_attr("style", format!("text-align:{}", align));
            }
            let children = self.convert_inlines(cell);
            let content = plain_text(&children);
            self.tokens.push(open);
            self.tokens.push(Token::inline(content, children));
            self.tokens.push(Token::block_close(kind, tag));
        }
        self.tokens.push(Token::block_close(TokenKind::TableRow, "tr"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inlines
    // ─────────────────────────────────────────────────────────────────────────

    /// Inline children with math placeholders resolved.
    fn convert_inlines<'a>(&self, node: &'a AstNode<'a>) -> Vec<Token> {
        let children = self.convert_raw_inlines(node);
        self.resolve_inline_math(children)
    }

    /// Inline children with adjacent text merged and placeholders still in place.
    fn convert_raw_inlines<'a>(&self, node: &'a AstNode<'a>) -> Vec<Token> {
        let mut output = Vec::new();
        for child in node.children() {
            self.convert_inline(child, &mut output);
        }
        merge_text(output)
    }

    fn convert_inline<'a>(&self, node: &'a AstNode<'a>, output: &mut Vec<Token>) {
        let ast = node.data.borrow();
        match &ast.value {
            NodeValue::Text(text) => output.push(Token::text(text.clone())),
            NodeValue::SoftBreak => {
                output.push(Token::inline_leaf(TokenKind::Softbreak, "br", ""))
            }
            NodeValue::LineBreak => {
                output.push(Token::inline_leaf(TokenKind::Hardbreak, "br", ""))
            }
            NodeValue::Code(code) => output.push(Token::inline_leaf(
                TokenKind::CodeInline,
                "code",
                self.math.expand(&code.literal),
            )),
            NodeValue::HtmlInline(html) => output.push(Token::inline_leaf(
                TokenKind::HtmlInline,
                "",
                self.math.expand(html),
            )),
            NodeValue::Emph => self.wrap_inline(node, TokenKind::Emphasis, "em", output),
            NodeValue::Strong => self.wrap_inline(node, TokenKind::Strong, "strong", output),
            NodeValue::Strikethrough => {
                self.wrap_inline(node, TokenKind::Strikethrough, "s", output)
            }
            NodeValue::Link(link) => {
                let mut open = Token::inline_open(TokenKind::Link, "a")
                    .with_attr("href", self.math.expand(&link.url));
                if !link.title.is_empty() {
                    open = open.with_attr("title", self.math.expand(&link.title));
                }
                let mut children = Vec::new();
                for child in node.children() {
                    self.convert_inline(child, &mut children);
                }
                // Autolink text is the URL itself, so it carries no math
                if self.is_autolink_text(&children, &link.url) {
                    for child in children.iter_mut().filter(|t| t.kind == TokenKind::Text) {
                        child.content = self.math.expand(&child.content);
                    }
                }
                output.push(open);
                output.append(&mut children);
                output.push(Token::inline_close(TokenKind::Link, "a"));
            }
            NodeValue::Image(link) => {
                let mut image = Token::inline_leaf(TokenKind::Image, "img", "")
                    .with_attr("src", self.math.expand(&link.url));
                if !link.title.is_empty() {
                    image = image.with_attr("title", self.math.expand(&link.title));
                }
                image.children = self.convert_inlines(node);
                output.push(image);
            }
            _ => {
                for child in node.children() {
                    self.convert_inline(child, output);
                }
            }
        }
    }

    fn is_autolink_text(&self, children: &[Token], url: &str) -> bool {
        if self.math.is_empty() || children.iter().any(|t| t.kind != TokenKind::Text) {
            return false;
        }
        let text = self.math.expand(&plain_text(children));
        let url = self.math.expand(url);
        !text.is_empty()
            && (url == text
                || url.ends_with(&format!("//{}", text))
                || url == format!("mailto:{}", text))
    }

    fn wrap_inline<'a>(
        &self,
        node: &'a AstNode<'a>,
        kind: TokenKind,
        tag: &'static str,
        output: &mut Vec<Token>,
    ) {
        output.push(Token::inline_open(kind, tag));
        for child in node.children() {
            self.convert_inline(child, output);
        }
        output.push(Token::inline_close(kind, tag));
    }

    /// Replace inline math placeholders in text tokens with math tokens.
    fn resolve_inline_math(&self, children: Vec<Token>) -> Vec<Token> {
        if self.math.is_empty() {
            return children;
        }
        let mut output = Vec::with_capacity(children.len());
        for child in children {
            if child.kind != TokenKind::Text {
                output.push(child);
                continue;
            }
            for piece in self.math.split_inline(&child.content) {
                match piece {
                    InlinePiece::Text(text) => output.push(Token::text(text)),
                    InlinePiece::Math(span) => output.push(Token::inline_leaf(
                        TokenKind::MathInline,
                        "span",
                        span.expression.clone(),
                    )),
                }
            }
        }
        output
    }
}

/// Merge runs of adjacent text tokens (comrak splits text at special characters).
fn merge_text(children: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(children.len());
    for child in children {
        match merged.last_mut() {
            Some(last) if last.kind == TokenKind::Text && child.kind == TokenKind::Text => {
                last.content.push_str(&child.content);
            }
            _ => merged.push(child),
        }
    }
    merged
}

fn is_container_marker(c: char) -> bool {
    c == ' ' || c == '\t' || c == '>'
}

fn is_setext_underline(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && (trimmed.bytes().all(|b| b == b'=') || trimmed.bytes().all(|b| b == b'-'))
}

fn alignment_name(alignment: TableAlignment) -> Option<&'static str> {
    match alignment {
        TableAlignment::None => None,
        TableAlignment::Left => Some("left"),
        TableAlignment::Center => Some("center"),
        TableAlignment::Right => Some("right"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
