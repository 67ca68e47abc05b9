//! Flat token stream produced by the parser
//!
//! Tokens form an ordered sequence with implicit nesting via open/close
//! pairs, the same shape markdown-it uses. Block-level tokens live in the
//! top-level stream; each `Inline` token carries its inline children.

// ─────────────────────────────────────────────────────────────────────────────
// Token Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// What a token represents.
///
/// Container kinds appear twice in a stream, once with [`Nesting::Open`] and
/// once with [`Nesting::Close`]. Leaf kinds are always [`Nesting::SelfClosing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Block containers
    Paragraph,
    Heading,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,

    // Block leaves
    Fence,
    CodeBlock,
    HtmlBlock,
    Rule,
    MathBlock,
    Inline,

    // Inline containers
    Strong,
    Emphasis,
    Strikethrough,
    Link,

    // Inline leaves
    Text,
    Softbreak,
    Hardbreak,
    CodeInline,
    HtmlInline,
    Image,
    MathInline,
}

/// Whether a token opens, closes, or stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Close,
    SelfClosing,
}

// ─────────────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────────────

/// A single node of the token stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// HTML tag this token renders to (`"h2"`, `"p"`, `"code"`, ...)
    pub tag: &'static str,
    pub nesting: Nesting,
    /// Extra HTML attributes, in output order
    pub attrs: Vec<(String, String)>,
    /// Raw text for leaf and inline tokens
    pub content: String,
    /// Info string of fenced code blocks
    pub info: String,
    /// Inline children (for `Inline` and `Image` tokens)
    pub children: Vec<Token>,
    /// True for block-level tokens
    pub block: bool,
    /// Hidden tokens are skipped by the renderer (tight list paragraphs)
    pub hidden: bool,
}

impl Token {
    fn new(kind: TokenKind, tag: &'static str, nesting: Nesting, block: bool) -> Self {
        Self {
            kind,
            tag,
            nesting,
            attrs: Vec::new(),
            content: String::new(),
            info: String::new(),
            children: Vec::new(),
            block,
            hidden: false,
        }
    }

    /// Opening token of a block container.
    pub fn block_open(kind: TokenKind, tag: &'static str) -> Self {
        Self::new(kind, tag, Nesting::Open, true)
    }

    /// Closing token of a block container.
    pub fn block_close(kind: TokenKind, tag: &'static str) -> Self {
        Self::new(kind, tag, Nesting::Close, true)
    }

    /// Self-contained block token with raw content.
    pub fn block_leaf(kind: TokenKind, tag: &'static str, content: impl Into<String>) -> Self {
        let mut token = Self::new(kind, tag, Nesting::SelfClosing, true);
        token.content = content.into();
        token
    }

    /// Inline container holding `children`; `content` is the raw source text.
    pub fn inline(content: impl Into<String>, children: Vec<Token>) -> Self {
        let mut token = Self::new(TokenKind::Inline, "", Nesting::SelfClosing, true);
        token.content = content.into();
        token.children = children;
        token
    }

    pub fn inline_open(kind: TokenKind, tag: &'static str) -> Self {
        Self::new(kind, tag, Nesting::Open, false)
    }

    pub fn inline_close(kind: TokenKind, tag: &'static str) -> Self {
        Self::new(kind, tag, Nesting::Close, false)
    }

    pub fn inline_leaf(kind: TokenKind, tag: &'static str, content: impl Into<String>) -> Self {
        let mut token = Self::new(kind, tag, Nesting::SelfClosing, false);
        token.content = content.into();
        token
    }

    /// Plain text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        Self::inline_leaf(TokenKind::Text, "", content)
    }

    /// Builder-style attribute append.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// True if this token opens a container of the given kind.
    pub fn is_open(&self, kind: TokenKind) -> bool {
        self.kind == kind && self.nesting == Nesting::Open
    }

    /// Heading depth 1-6 derived from the tag, `None` for non-heading tokens.
    pub fn heading_level(&self) -> Option<u8> {
        if self.kind != TokenKind::Heading {
            return None;
        }
        match self.tag.as_bytes() {
            [b'h', digit @ b'1'..=b'6'] => Some(digit - b'0'),
            _ => None,
        }
    }
}

/// HTML tag for a heading level, clamped to h1-h6.
pub fn heading_tag(level: u8) -> &'static str {
    match level {
        0 | 1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

/// Concatenated plain text of an inline child sequence.
///
/// Markup tokens are skipped, breaks become a single space-like newline and
/// image alternative text is included.
pub fn plain_text(children: &[Token]) -> String {
    let mut output = String::new();
    collect_plain_text(children, &mut output);
    output
}

fn collect_plain_text(children: &[Token], output: &mut String) {
    for child in children {
        match child.kind {
            TokenKind::Text | TokenKind::CodeInline | TokenKind::MathInline => {
                output.push_str(&child.content)
            }
            TokenKind::Softbreak | TokenKind::Hardbreak => output.push('\n'),
            TokenKind::Image => collect_plain_text(&child.children, output),
            _ => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_from_tag() {
        for level in 1..=6u8 {
            let token = Token::block_open(TokenKind::Heading, heading_tag(level));
            assert_eq!(token.heading_level(), Some(level));
        }
    }

    #[test]
    fn test_heading_level_none_for_other_kinds() {
        let token = Token::block_open(TokenKind::Paragraph, "p");
        assert_eq!(token.heading_level(), None);
    }

    #[test]
    fn test_heading_tag_clamps() {
        assert_eq!(heading_tag(0), "h1");
        assert_eq!(heading_tag(9), "h6");
    }

    #[test]
    fn test_attr_lookup() {
        let token = Token::inline_open(TokenKind::Link, "a")
            .with_attr("href", "https://example.com")
            .with_attr("title", "Example");
        assert_eq!(token.attr("href"), Some("https://example.com"));
        assert_eq!(token.attr("title"), Some("Example"));
        assert_eq!(token.attr("rel"), None);
    }

    #[test]
    fn test_is_open() {
        let open = Token::block_open(TokenKind::ListItem, "li");
        let close = Token::block_close(TokenKind::ListItem, "li");
        assert!(open.is_open(TokenKind::ListItem));
        assert!(!close.is_open(TokenKind::ListItem));
        assert!(!open.is_open(TokenKind::Paragraph));
    }

    #[test]
    fn test_plain_text_skips_markup() {
        let children = vec![
            Token::text("Hello "),
            Token::inline_open(TokenKind::Strong, "strong"),
            Token::text("bold"),
            Token::inline_close(TokenKind::Strong, "strong"),
            Token::inline_leaf(TokenKind::Softbreak, "br", ""),
            Token::inline_leaf(TokenKind::CodeInline, "code", "x"),
        ];
        assert_eq!(plain_text(&children), "Hello bold\nx");
    }
}
