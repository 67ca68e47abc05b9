//! HTML renderer for the token stream
//!
//! Generic tokens follow markdown-it's output conventions (tag layout and
//! newline placement), so the preview markup stays stable for stylesheets
//! written against it. Fenced code, tables and math have custom rules.

use log::debug;
use std::sync::OnceLock;

use super::math::{MathDisplay, MathMlRenderer, MathRenderer};
use super::numbering::number_headings;
use super::parser::parse_tokens;
use super::syntax::{get_highlighter, SyntaxHighlighter};
use super::token::{plain_text, Nesting, Token, TokenKind};

// ─────────────────────────────────────────────────────────────────────────────
// Render Options
// ─────────────────────────────────────────────────────────────────────────────

/// Options that affect rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix headings with hierarchical numbers ("1.2 Title")
    pub auto_number_headings: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            auto_number_headings: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown to HTML renderer.
///
/// Configured once and immutable afterwards; every call to [`Self::render`]
/// parses from scratch and shares no state with other calls.
pub struct MarkdownRenderer {
    highlighter: Option<&'static SyntaxHighlighter>,
    math: Box<dyn MathRenderer>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Renderer with syntax highlighting and MathML output.
    pub fn new() -> Self {
        Self {
            highlighter: Some(get_highlighter()),
            math: Box::new(MathMlRenderer),
        }
    }

    /// Render fenced code as escaped plain text.
    pub fn without_highlighting(mut self) -> Self {
        self.highlighter = None;
        self
    }

    /// Use a different math collaborator.
    pub fn with_math_renderer(mut self, math: Box<dyn MathRenderer>) -> Self {
        self.math = math;
        self
    }

    /// Render Markdown source to HTML.
    pub fn render(&self, content: &str, options: &RenderOptions) -> String {
        let mut tokens = parse_tokens(content);
        if options.auto_number_headings {
            number_headings(&mut tokens);
        }
        self.render_tokens(&tokens)
    }

    /// Render an already-parsed block token stream.
    pub fn render_tokens(&self, tokens: &[Token]) -> String {
        let mut output = String::new();
        for (index, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Inline => self.render_inline(&token.children, &mut output),
                TokenKind::Fence => self.render_fence(token, &mut output),
                TokenKind::CodeBlock => {
                    output.push_str("<pre><code>");
                    output.push_str(&escape_html(&token.content));
                    output.push_str("</code></pre>\n");
                }
                TokenKind::HtmlBlock => output.push_str(&token.content),
                TokenKind::MathBlock => self.render_math(token, MathDisplay::Block, &mut output),
                TokenKind::Table if token.nesting == Nesting::Open => {
                    output.push_str("<div class=\"table-container\"><table class=\"markdown-table\">\n")
                }
                TokenKind::Table => output.push_str("</table></div>\n"),
                _ => render_token(tokens, index, &mut output),
            }
        }
        output
    }

    fn render_inline(&self, children: &[Token], output: &mut String) {
        for (index, child) in children.iter().enumerate() {
            match child.kind {
                TokenKind::Text => output.push_str(&escape_html(&child.content)),
                TokenKind::Softbreak => output.push('\n'),
                TokenKind::Hardbreak => output.push_str("<br>\n"),
                TokenKind::CodeInline => {
                    output.push_str("<code>");
                    output.push_str(&escape_html(&child.content));
                    output.push_str("</code>");
                }
                TokenKind::HtmlInline => output.push_str(&child.content),
                TokenKind::MathInline => self.render_math(child, MathDisplay::Inline, output),
                TokenKind::Image => {
                    output.push_str("<img src=\"");
                    output.push_str(&escape_html(child.attr("src").unwrap_or_default()));
                    output.push_str("\" alt=\"");
                    output.push_str(&escape_html(&plain_text(&child.children)));
                    output.push('"');
                    if let Some(title) = child.attr("title") {
                        output.push_str(" title=\"");
                        output.push_str(&escape_html(title));
                        output.push('"');
                    }
                    output.push('>');
                }
                _ => render_token(children, index, output),
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Custom Rules
    // ─────────────────────────────────────────────────────────────────────────

    fn render_fence(&self, token: &Token, output: &mut String) {
        let language = token.info.split_whitespace().next().unwrap_or_default();

        output.push_str("<div class=\"code-block\">");
        if !language.is_empty() {
            output.push_str("<div class=\"code-block-header\"><span class=\"code-block-lang\">");
            output.push_str(&escape_html(language));
            output.push_str("</span></div>");
        }
        output.push_str("<pre class=\"hljs\"><code>");
        output.push_str(&self.highlight(&token.content, language));
        output.push_str("</code></pre></div>\n");
    }

    /// Highlighted markup for `code`, or the escaped source if the language is
    /// unknown or highlighting fails.
    fn highlight(&self, code: &str, language: &str) -> String {
        let Some(highlighter) = self.highlighter.filter(|_| !language.is_empty()) else {
            return escape_html(code);
        };
        match highlighter.highlight_html(code, language) {
            Ok(Some(html)) => html,
            Ok(None) => escape_html(code),
            Err(err) => {
                debug!("{}", err);
                escape_html(code)
            }
        }
    }

    fn render_math(&self, token: &Token, display: MathDisplay, output: &mut String) {
        let rendered = self.math.render(&token.content, display);
        match (rendered, display) {
            (Ok(markup), MathDisplay::Inline) => {
                output.push_str("<span class=\"math-inline\">");
                output.push_str(&markup);
                output.push_str("</span>");
            }
            (Ok(markup), MathDisplay::Block) => {
                output.push_str("<div class=\"math-display\">");
                output.push_str(&markup);
                output.push_str("</div>\n");
            }
            (Err(err), MathDisplay::Inline) => {
                debug!("{}", err);
                output.push_str("<span class=\"math-error\">");
                output.push_str(&escape_html(&token.content));
                output.push_str("</span>");
            }
            (Err(err), MathDisplay::Block) => {
                debug!("{}", err);
                output.push_str("<div class=\"math-error math-display\">");
                output.push_str(&escape_html(&token.content));
                output.push_str("</div>\n");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generic Token Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render an open, close or self-closing tag with markdown-it's newline rules.
fn render_token(tokens: &[Token], index: usize, output: &mut String) {
    let token = &tokens[index];
    if token.hidden {
        return;
    }

    // Block tags after a hidden token start on a new line
    if token.block && token.nesting != Nesting::Close && index > 0 && tokens[index - 1].hidden {
        output.push('\n');
    }

    output.push_str(if token.nesting == Nesting::Close { "</" } else { "<" });
    output.push_str(token.tag);
    if token.nesting != Nesting::Close {
        for (name, value) in &token.attrs {
            output.push(' ');
            output.push_str(name);
            output.push_str("=\"");
            output.push_str(&escape_html(value));
            output.push('"');
        }
    }

    let mut need_line_feed = token.block;
    if token.block && token.nesting == Nesting::Open {
        if let Some(next) = tokens.get(index + 1) {
            if next.kind == TokenKind::Inline || next.hidden {
                need_line_feed = false;
            } else if next.nesting == Nesting::Close && next.tag == token.tag {
                need_line_feed = false;
            }
        }
    }

    output.push_str(if need_line_feed { ">\n" } else { ">" });
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ─────────────────────────────────────────────────────────────────────────────
// Default Renderer
// ─────────────────────────────────────────────────────────────────────────────

static RENDERER: OnceLock<MarkdownRenderer> = OnceLock::new();

/// Render Markdown to HTML with the shared default renderer.
///
/// The output is trusted as-is by the caller; raw HTML in the source is
/// passed through and URLs are not sanitized.
pub fn render_markdown(content: &str, options: &RenderOptions) -> String {
    RENDERER
        .get_or_init(MarkdownRenderer::new)
        .render(content, options)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};

    const NUMBERED: RenderOptions = RenderOptions {
        auto_number_headings: true,
    };
    const PLAIN: RenderOptions = RenderOptions {
        auto_number_headings: false,
    };

    struct FailingMath;

    impl MathRenderer for FailingMath {
        fn render(&self, expression: &str, _display: MathDisplay) -> Result<String> {
            Err(Error::Math {
                expression: expression.to_string(),
                message: "unsupported".to_string(),
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Basic Output
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_paragraph() {
        assert_eq!(render_markdown("Hello", &PLAIN), "<p>Hello</p>\n");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            render_markdown("a &amp; b \\< c", &PLAIN),
            "<p>a &amp; b &lt; c</p>\n"
        );
    }

    #[test]
    fn test_emphasis_and_links() {
        let html = render_markdown("**bold** *em* [x](http://a.b \"t\")", &PLAIN);
        assert_eq!(
            html,
            "<p><strong>bold</strong> <em>em</em> <a href=\"http://a.b\" title=\"t\">x</a></p>\n"
        );
    }

    #[test]
    fn test_tight_list_layout() {
        assert_eq!(
            render_markdown("- a\n- b", &PLAIN),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_loose_list_layout() {
        assert_eq!(
            render_markdown("- a\n\n- b", &PLAIN),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_start_attribute() {
        assert!(render_markdown("5. five", &PLAIN).starts_with("<ol start=\"5\">\n"));
    }

    #[test]
    fn test_blockquote_and_rule() {
        assert_eq!(
            render_markdown("> quote\n\n---", &PLAIN),
            "<blockquote>\n<p>quote</p>\n</blockquote>\n<hr>\n"
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            render_markdown("![an *alt*](pic.png)", &PLAIN),
            "<p><img src=\"pic.png\" alt=\"an alt\"></p>\n"
        );
    }

    #[test]
    fn test_raw_html_passthrough() {
        let html = render_markdown("<div class=\"x\">raw</div>\n\ntext <b>bold</b>", &PLAIN);
        assert!(html.contains("<div class=\"x\">raw</div>"));
        assert!(html.contains("<p>text <b>bold</b></p>"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Headings
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_numbered_headings() {
        let html = render_markdown("# A\n## B\n## C\n### D\n# E", &NUMBERED);
        assert_eq!(
            html,
            "<h1>1 A</h1>\n<h2>1.1 B</h2>\n<h2>1.2 C</h2>\n<h3>1.2.1 D</h3>\n<h1>2 E</h1>\n"
        );
    }

    #[test]
    fn test_numbering_disabled() {
        assert_eq!(
            render_markdown("# A\n## B", &PLAIN),
            "<h1>A</h1>\n<h2>B</h2>\n"
        );
    }

    #[test]
    fn test_numbered_heading_with_leading_markup() {
        assert_eq!(
            render_markdown("# **Bold**", &NUMBERED),
            "<h1>1 <strong>Bold</strong></h1>\n"
        );
    }

    #[test]
    fn test_default_options_number_headings() {
        assert_eq!(
            render_markdown("# A", &RenderOptions::default()),
            "<h1>1 A</h1>\n"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Code Blocks
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_fence_with_known_language() {
        let html = render_markdown("```rust\nfn main() {}\n```", &PLAIN);
        assert!(html.starts_with(
            "<div class=\"code-block\"><div class=\"code-block-header\"><span class=\"code-block-lang\">rust</span></div><pre class=\"hljs\"><code>"
        ));
        assert!(html.contains("<span class="));
        assert!(html.ends_with("</code></pre></div>\n"));
    }

    #[test]
    fn test_fence_with_unknown_language_is_escaped() {
        let html = render_markdown("```nosuchlang\n<b>&</b>\n```", &PLAIN);
        assert!(html.contains("<span class=\"code-block-lang\">nosuchlang</span>"));
        assert!(html.contains("<code>&lt;b&gt;&amp;&lt;/b&gt;\n</code>"));
    }

    #[test]
    fn test_fence_without_language_has_no_header() {
        let html = render_markdown("```\nplain\n```", &PLAIN);
        assert_eq!(
            html,
            "<div class=\"code-block\"><pre class=\"hljs\"><code>plain\n</code></pre></div>\n"
        );
    }

    #[test]
    fn test_fence_without_highlighter() {
        let renderer = MarkdownRenderer::new().without_highlighting();
        let html = renderer.render("```rust\nlet a = 1 < 2;\n```", &PLAIN);
        assert!(html.contains("<code>let a = 1 &lt; 2;\n</code>"));
        assert!(!html.contains("hl-"));
    }

    #[test]
    fn test_indented_code_block() {
        assert_eq!(
            render_markdown("    x < y", &PLAIN),
            "<pre><code>x &lt; y\n</code></pre>\n"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tables
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_table_wrapper() {
        let html = render_markdown("| a | b |\n|---|:-:|\n| 1 | 2 |", &PLAIN);
        assert_eq!(
            html,
            "<div class=\"table-container\"><table class=\"markdown-table\">\n\
             <thead>\n<tr>\n<th>a</th>\n<th style=\"text-align:center\">b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td>1</td>\n<td style=\"text-align:center\">2</td>\n</tr>\n</tbody>\n\
             </table></div>\n"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Extensions
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_task_list_checkboxes() {
        let html = render_markdown("- [x] done\n- [ ] todo", &PLAIN);
        assert!(html.contains("<li><input type=\"checkbox\" checked disabled> done</li>"));
        assert!(html.contains("<li><input type=\"checkbox\" disabled> todo</li>"));
    }

    #[test]
    fn test_inline_math() {
        let html = render_markdown("Let $x+1$ be", &PLAIN);
        assert!(html.starts_with("<p>Let <span class=\"math-inline\"><math"));
        assert!(html.ends_with("</span> be</p>\n"));
    }

    #[test]
    fn test_block_math() {
        let html = render_markdown("$$\na^2+b^2=c^2\n$$", &PLAIN);
        assert!(html.starts_with("<div class=\"math-display\"><math"));
        assert!(html.ends_with("</div>\n"));
    }

    #[test]
    fn test_block_math_before_underline() {
        let html = render_markdown("$$\nx\n$$\n---", &NUMBERED);
        assert!(html.starts_with("<div class=\"math-display\"><math"));
        assert!(html.ends_with("</div>\n<hr>\n"));

        let html = render_markdown("$$\nx\n$$\n===", &NUMBERED);
        assert!(html.starts_with("<div class=\"math-display\"><math"));
        assert!(html.ends_with("</div>\n<p>===</p>\n"));
        assert!(!html.contains("<h1>"));
    }

    #[test]
    fn test_double_dollar_inside_paragraph_is_literal() {
        assert_eq!(
            render_markdown("before\n$$\nx\n$$\nafter", &PLAIN),
            "<p>before\n$$\nx\n$$\nafter</p>\n"
        );
    }

    #[test]
    fn test_indented_code_with_double_dollar() {
        assert_eq!(
            render_markdown("    $$\n    x\n    $$", &PLAIN),
            "<pre><code>$$\nx\n$$\n</code></pre>\n"
        );
    }

    #[test]
    fn test_autolink_with_dollars_is_not_math() {
        let html = render_markdown("<http://a.com/$x$>", &PLAIN);
        assert_eq!(
            html,
            "<p><a href=\"http://a.com/$x$\">http://a.com/$x$</a></p>\n"
        );
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        assert_eq!(render_markdown("costs $5", &PLAIN), "<p>costs $5</p>\n");
    }

    #[test]
    fn test_math_failure_falls_back_to_escaped_source() {
        let renderer = MarkdownRenderer::new().with_math_renderer(Box::new(FailingMath));
        let inline = renderer.render("$a<b$", &PLAIN);
        assert_eq!(inline, "<p><span class=\"math-error\">a&lt;b</span></p>\n");

        let block = renderer.render("$$\na<b\n$$", &PLAIN);
        assert_eq!(block, "<div class=\"math-error math-display\">a&lt;b</div>\n");
    }

    #[test]
    fn test_output_is_deterministic() {
        let source = "# T\n\n$x$ and `code`\n\n```rust\nfn f() {}\n```\n\n- [x] a";
        assert_eq!(
            render_markdown(source, &NUMBERED),
            render_markdown(source, &NUMBERED)
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
