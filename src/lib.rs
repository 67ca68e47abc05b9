//! markwise - Markdown rendering core for a live-preview editor
//!
//! Turns Markdown into preview HTML with heading numbers, math, task lists
//! and highlighted code, extracts a table of contents that agrees with the
//! rendered numbering, and provides the pure helpers an editor needs around
//! it: document statistics, syntax insertion, list continuation, cursor
//! navigation and search.
//!
//! # Example
//! ```ignore
//! use markwise::{extract_toc, get_document_stats, render_markdown, RenderOptions};
//!
//! let source = "# Intro\n\n- [x] done\n\n$$E = mc^2$$";
//! let options = RenderOptions::default();
//! let html = render_markdown(source, &options);
//! let toc = extract_toc(source, &options);
//! let stats = get_document_stats(source);
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod string_utils;

pub use editor::{
    auto_complete_markdown, get_document_stats, insert_markdown_syntax, Completion,
    DocumentStats, FormatCommand, InsertResult, Selection, SyntaxDescriptor,
};
pub use error::{Error, Result};
pub use markdown::{
    extract_toc, render_markdown, DocumentOutline, MarkdownRenderer, RenderOptions, TocItem,
};
