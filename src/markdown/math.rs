//! Math extension: `$inline$` and `$$block$$` expressions
//!
//! comrak has no math grammar, so math is recognised in a line-oriented pass
//! over the source before parsing. Every recognised expression is replaced by
//! a private-use placeholder, and the parser turns the placeholders back into
//! math tokens afterwards. Inline placeholders are ordinary text to comrak.
//! Block placeholders are wrapped in an HTML comment so that comrak closes
//! them as a block of their own: a following `---` is a rule, not a setext
//! underline. A placeholder that lands somewhere math is not allowed (code,
//! raw HTML, link destinations) is restored to its original source text, so
//! anything the math rules do not claim is parsed exactly as if the pass
//! never ran.
//!
//! The [`MathRenderer`] trait is the seam for turning an expression into
//! markup; [`MathMlRenderer`] is the default and produces MathML.

use crate::error::{Error, Result};
use latex2mathml::{latex_to_mathml, DisplayStyle};

// ─────────────────────────────────────────────────────────────────────────────
// Placeholder Characters
// ─────────────────────────────────────────────────────────────────────────────

const INLINE_OPEN: char = '\u{E000}';
const INLINE_CLOSE: char = '\u{E001}';
const BLOCK_OPEN: char = '\u{E002}';
const BLOCK_CLOSE: char = '\u{E003}';

const BLOCK_MARKER: &str = "$$";

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

// ─────────────────────────────────────────────────────────────────────────────
// Math Spans
// ─────────────────────────────────────────────────────────────────────────────

/// Inline (`$x$`) or display (`$$x$$`) math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathDisplay {
    Inline,
    Block,
}

/// One recognised math expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    /// Expression text between the delimiters, verbatim
    pub expression: String,
    /// The source text the placeholder replaced
    pub raw: String,
    pub display: MathDisplay,
}

/// A piece of text with inline placeholders resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlinePiece<'a> {
    Text(String),
    Math(&'a MathSpan),
}

/// All math spans found in a document, indexed by placeholder number.
#[derive(Debug, Clone, Default)]
pub struct MathTable {
    spans: Vec<MathSpan>,
}

impl MathTable {
    fn push(&mut self, span: MathSpan) -> usize {
        self.spans.push(span);
        self.spans.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&MathSpan> {
        self.spans.get(index)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Replace every placeholder in `text` with the source it stands for.
    pub fn expand(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        let mut output = String::with_capacity(text.len());
        for segment in self.segments(text) {
            match segment {
                Segment::Text(plain) => output.push_str(plain),
                Segment::Placeholder(span) => output.push_str(&span.raw),
            }
        }
        output
    }

    /// Split `text` at inline math placeholders.
    ///
    /// Block placeholders are expanded back to source, since display math
    /// cannot live inside running text.
    pub fn split_inline(&self, text: &str) -> Vec<InlinePiece<'_>> {
        let mut pieces = Vec::new();
        let mut pending = String::new();
        for segment in self.segments(text) {
            match segment {
                Segment::Text(plain) => pending.push_str(plain),
                Segment::Placeholder(span) if span.display == MathDisplay::Inline => {
                    if !pending.is_empty() {
                        pieces.push(InlinePiece::Text(std::mem::take(&mut pending)));
                    }
                    pieces.push(InlinePiece::Math(span));
                }
                Segment::Placeholder(span) => pending.push_str(&span.raw),
            }
        }
        if !pending.is_empty() {
            pieces.push(InlinePiece::Text(pending));
        }
        pieces
    }

    /// If `text` (ignoring surrounding whitespace) is exactly one block
    /// placeholder, return its span.
    pub fn block_at(&self, text: &str) -> Option<&MathSpan> {
        let trimmed = text.trim();
        let (span, consumed) = self.placeholder_at(trimmed)?;
        (span.display == MathDisplay::Block && consumed == trimmed.len()).then_some(span)
    }

    fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t, '_>> {
        let mut segments = Vec::new();
        let mut plain_start = 0;
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            if let Some((span, consumed)) = self.placeholder_at(rest) {
                if plain_start < pos {
                    segments.push(Segment::Text(&text[plain_start..pos]));
                }
                segments.push(Segment::Placeholder(span));
                pos += consumed;
                plain_start = pos;
            } else {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        if plain_start < text.len() {
            segments.push(Segment::Text(&text[plain_start..]));
        }
        segments
    }

    /// Parse a placeholder at the start of `text`, returning the span and the
    /// number of bytes it occupies.
    fn placeholder_at(&self, text: &str) -> Option<(&MathSpan, usize)> {
        if let Some(inner) = text.strip_prefix(COMMENT_OPEN) {
            let (index, len) = numbered(inner, BLOCK_OPEN, BLOCK_CLOSE)?;
            if !inner[len..].starts_with(COMMENT_CLOSE) {
                return None;
            }
            let span = self
                .spans
                .get(index)
                .filter(|span| span.display == MathDisplay::Block)?;
            return Some((span, COMMENT_OPEN.len() + len + COMMENT_CLOSE.len()));
        }
        let (index, len) = numbered(text, INLINE_OPEN, INLINE_CLOSE)?;
        let span = self
            .spans
            .get(index)
            .filter(|span| span.display == MathDisplay::Inline)?;
        Some((span, len))
    }
}

/// `open`, decimal digits, `close` at the start of `text`: the number and
/// the byte length.
fn numbered(text: &str, open: char, close: char) -> Option<(usize, usize)> {
    let digits = text.strip_prefix(open)?;
    let digits_len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 || !digits[digits_len..].starts_with(close) {
        return None;
    }
    let index = digits[..digits_len].parse().ok()?;
    Some((index, open.len_utf8() + digits_len + close.len_utf8()))
}

enum Segment<'t, 'm> {
    Text(&'t str),
    Placeholder(&'m MathSpan),
}

fn placeholder(index: usize, display: MathDisplay) -> String {
    match display {
        MathDisplay::Inline => format!("{}{}{}", INLINE_OPEN, index, INLINE_CLOSE),
        MathDisplay::Block => format!(
            "{}{}{}{}{}",
            COMMENT_OPEN, BLOCK_OPEN, index, BLOCK_CLOSE, COMMENT_CLOSE
        ),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction Pass
// ─────────────────────────────────────────────────────────────────────────────

/// Replace math constructs in `source` with placeholders.
///
/// Block math is only recognised where a new block may start, so a `$$` line
/// never interrupts a paragraph, and never inside indented code. Returns the
/// rewritten source and the table needed to resolve it. Sources that already
/// contain placeholder characters are returned untouched.
pub fn extract_math(source: &str) -> (String, MathTable) {
    let mut table = MathTable::default();
    let reserved = [INLINE_OPEN, INLINE_CLOSE, BLOCK_OPEN, BLOCK_CLOSE];
    if !source.contains('$') || source.contains(&reserved[..]) {
        return (source.to_string(), table);
    }

    let lines: Vec<&str> = source.split('\n').collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut fence: Option<Fence> = None;
    let mut in_paragraph = false;
    let mut previous_depth = 0;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let prefix = ContainerPrefix::scan(line, true);
        let body = &line[prefix.len..];
        let block_start =
            !in_paragraph || prefix.required_indent > 0 || prefix.depth > previous_depth;
        previous_depth = prefix.depth;

        if let Some(open) = &fence {
            if open.is_closed_by(body) {
                fence = None;
            }
            output.push(line.to_string());
            index += 1;
            continue;
        }

        if let Some(opened) = Fence::open(body) {
            fence = Some(opened);
            in_paragraph = false;
            output.push(line.to_string());
            index += 1;
            continue;
        }

        let block = if block_start && !prefix.is_indented_code() {
            scan_block(&lines, index, &prefix)
        } else {
            None
        };
        if let Some(block) = block {
            let raw = std::iter::once(body)
                .chain(lines[index + 1..=block.end].iter().copied())
                .collect::<Vec<_>>()
                .join("\n");
            let slot = table.push(MathSpan {
                expression: block.expression,
                raw,
                display: MathDisplay::Block,
            });
            output.push(format!(
                "{}{}",
                &line[..prefix.len],
                placeholder(slot, MathDisplay::Block)
            ));
            in_paragraph = false;
            index = block.end + 1;
            continue;
        }

        in_paragraph = continues_paragraph(body, &prefix, in_paragraph);
        output.push(replace_inline(line, &mut table));
        index += 1;
    }

    (output.join("\n"), table)
}

/// Whether a paragraph is open after `body`, a line that is not fenced code
/// or block math.
fn continues_paragraph(body: &str, prefix: &ContainerPrefix, in_paragraph: bool) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return false;
    }
    if !in_paragraph && prefix.is_indented_code() {
        return false;
    }
    if is_atx_heading(trimmed) || is_thematic_break(trimmed) {
        return false;
    }
    // A setext underline closes the paragraph above it
    let underline = trimmed.bytes().all(|b| b == b'=') || trimmed.bytes().all(|b| b == b'-');
    !(in_paragraph && underline)
}

fn is_atx_heading(trimmed: &str) -> bool {
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes)
        && matches!(trimmed.as_bytes().get(hashes), None | Some(b' ' | b'\t'))
}

fn is_thematic_break(trimmed: &str) -> bool {
    let Some(marker) = trimmed.bytes().next() else {
        return false;
    };
    if !matches!(marker, b'-' | b'*' | b'_') {
        return false;
    }
    let mut count = 0;
    for byte in trimmed.bytes() {
        match byte {
            b' ' | b'\t' => {}
            b if b == marker => count += 1,
            _ => return false,
        }
    }
    count >= 3
}

// ─────────────────────────────────────────────────────────────────────────────
// Container Prefixes
// ─────────────────────────────────────────────────────────────────────────────

/// Leading container syntax of a line: indentation, blockquote markers and
/// (on an opening line) one list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContainerPrefix {
    /// Byte length of the whole prefix
    len: usize,
    /// Number of `>` markers
    depth: usize,
    /// Columns between the last `>` marker and the content
    indent: usize,
    /// Content column a continuation line must reach (list items only)
    required_indent: usize,
}

impl ContainerPrefix {
    fn scan(line: &str, allow_list_marker: bool) -> Self {
        let bytes = line.as_bytes();
        let mut pos = 0;
        let mut depth = 0;
        let mut inner_start = 0;

        loop {
            let mut scan = pos;
            while scan < bytes.len() && matches!(bytes[scan], b' ' | b'\t') {
                scan += 1;
            }
            if scan < bytes.len() && bytes[scan] == b'>' {
                depth += 1;
                scan += 1;
                if scan < bytes.len() && bytes[scan] == b' ' {
                    scan += 1;
                }
                pos = scan;
                inner_start = scan;
            } else {
                break;
            }
        }

        while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
            pos += 1;
        }
        let indent = pos - inner_start;

        let mut required_indent = 0;
        if allow_list_marker {
            if let Some(marker_len) = list_marker_len(&bytes[pos..]) {
                let mut end = pos + marker_len;
                while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
                    end += 1;
                }
                required_indent = end - inner_start;
                pos = end;
            }
        }

        Self {
            len: pos,
            depth,
            indent,
            required_indent,
        }
    }

    /// Four or more columns of indentation without a list marker.
    fn is_indented_code(&self) -> bool {
        self.indent >= 4 && self.required_indent == 0
    }
}

/// Length of a list marker (`-`, `*`, `+`, `1.` or `1)`) followed by
/// whitespace at the start of `bytes`.
fn list_marker_len(bytes: &[u8]) -> Option<usize> {
    let marker_len = match bytes.first()? {
        b'-' | b'*' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };
    matches!(bytes.get(marker_len), Some(b' ' | b'\t')).then_some(marker_len)
}

// ─────────────────────────────────────────────────────────────────────────────
// Fenced Code Tracking
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    fn open(body: &str) -> Option<Self> {
        let marker = *body.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = body.bytes().take_while(|&b| b == marker).count();
        if len < 3 {
            return None;
        }
        // Backtick fences cannot carry backticks in their info string
        if marker == b'`' && body[len..].contains('`') {
            return None;
        }
        Some(Self { marker, len })
    }

    fn is_closed_by(&self, body: &str) -> bool {
        let trimmed = body.trim_end();
        let run = trimmed.bytes().take_while(|&b| b == self.marker).count();
        run >= self.len && run == trimmed.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Math
// ─────────────────────────────────────────────────────────────────────────────

struct BlockMatch {
    /// Index of the closing line
    end: usize,
    expression: String,
}

fn scan_block(lines: &[&str], start: usize, prefix: &ContainerPrefix) -> Option<BlockMatch> {
    let body = &lines[start][prefix.len..];
    let rest = body.strip_prefix(BLOCK_MARKER)?.trim();

    if let Some(expression) = rest.strip_suffix(BLOCK_MARKER) {
        return Some(BlockMatch {
            end: start,
            expression: expression.trim().to_string(),
        });
    }

    let mut content = Vec::new();
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        let current = ContainerPrefix::scan(line, false);
        let body = &line[current.len..];
        if current.depth != prefix.depth {
            return None;
        }
        if !body.trim().is_empty() && current.indent < prefix.required_indent {
            return None;
        }
        if body.trim_end().ends_with(BLOCK_MARKER) {
            return Some(BlockMatch {
                end: start + 1 + offset,
                expression: content.join("\n").trim().to_string(),
            });
        }
        content.push(body.trim_end_matches('\r'));
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Math
// ─────────────────────────────────────────────────────────────────────────────

fn replace_inline(line: &str, table: &mut MathTable) -> String {
    if !line.contains('$') {
        return line.to_string();
    }

    let bytes = line.as_bytes();
    let mut output = String::with_capacity(line.len());
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'`' => {
                let run = bytes[pos..].iter().take_while(|&&b| b == b'`').count();
                pos = closing_backticks(bytes, pos + run, run).unwrap_or(pos + run);
            }
            b'$' => {
                // `$$` never opens inline math
                if bytes.get(pos + 1) == Some(&b'$') {
                    pos += 1;
                    continue;
                }
                let Some(close) = closing_dollar(bytes, pos + 1) else {
                    pos += 1;
                    continue;
                };
                let expression = &line[pos + 1..close];
                if expression.trim().is_empty() {
                    pos += 1;
                    continue;
                }
                output.push_str(&line[copied..pos]);
                let slot = table.push(MathSpan {
                    expression: expression.to_string(),
                    raw: line[pos..=close].to_string(),
                    display: MathDisplay::Inline,
                });
                output.push_str(&placeholder(slot, MathDisplay::Inline));
                pos = close + 1;
                copied = pos;
            }
            _ => pos += 1,
        }
    }

    output.push_str(&line[copied..]);
    output
}

/// Position of the first unescaped `$` at or after `from`.
fn closing_dollar(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos < bytes.len() {
        match bytes[pos] {
            b'$' => return Some(pos),
            b'\\' => pos += 2,
            _ => pos += 1,
        }
    }
    None
}

/// End of the first backtick run of exactly `run` characters at or after `from`.
fn closing_backticks(bytes: &[u8], from: usize, run: usize) -> Option<usize> {
    let mut pos = from;
    while pos < bytes.len() {
        if bytes[pos] == b'`' {
            let len = bytes[pos..].iter().take_while(|&&b| b == b'`').count();
            if len == run {
                return Some(pos + len);
            }
            pos += len;
        } else {
            pos += 1;
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Math Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Converts a math expression into HTML-embeddable markup.
pub trait MathRenderer: Send + Sync {
    fn render(&self, expression: &str, display: MathDisplay) -> Result<String>;
}

/// LaTeX to MathML conversion via `latex2mathml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMlRenderer;

impl MathRenderer for MathMlRenderer {
    fn render(&self, expression: &str, display: MathDisplay) -> Result<String> {
        let style = match display {
            MathDisplay::Inline => DisplayStyle::Inline,
            MathDisplay::Block => DisplayStyle::Block,
        };
        latex_to_mathml(expression, style).map_err(|err| Error::Math {
            expression: expression.to_string(),
            message: format!("{:?}", err),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
