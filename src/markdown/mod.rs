//! Markdown parsing and rendering module
//!
//! This module turns Markdown source into preview HTML and a table of
//! contents, using the comrak library (CommonMark + GFM) as the baseline
//! grammar.
//!
//! # Features
//! - Flat markdown-it style token stream built from comrak's AST
//! - Inline (`$x$`) and display (`$$x$$`) math
//! - Task list checkboxes
//! - Hierarchical heading numbers shared by preview and outline
//! - Syntax highlighting for fenced code blocks using syntect
//! - Table of contents with anchors and source line mapping
//!
//! # Example
//! ```ignore
//! use markwise::markdown::{extract_toc, render_markdown, RenderOptions};
//!
//! let options = RenderOptions::default();
//! let html = render_markdown("# Hello\n\nEuler: $e^{i\\pi} + 1 = 0$", &options);
//! let toc = extract_toc("# Hello", &options);
//! assert_eq!(toc[0].title, "1 Hello");
//! ```

pub mod math;
pub mod numbering;
mod parser;
pub mod render;
pub mod syntax;
pub mod tasklist;
pub mod toc;
pub mod token;

pub use math::{MathDisplay, MathMlRenderer, MathRenderer};
pub use numbering::HeadingCounter;
pub use parser::parse_tokens;
pub use render::{render_markdown, MarkdownRenderer, RenderOptions};
pub use syntax::{get_highlighter, SyntaxHighlighter};
pub use toc::{
    assign_lines, extract_toc, preview_heading_index, preview_jump_target, slugify,
    DocumentOutline, OutlineItem, PreviewTarget, TocItem,
};
pub use token::{Nesting, Token, TokenKind};
