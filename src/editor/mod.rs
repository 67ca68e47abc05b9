//! Editor helpers for markwise
//!
//! Pure functions behind the editing surface: document statistics, syntax
//! insertion, list continuation, cursor navigation and content search.

mod autocomplete;
mod cursor;
mod formatting;
mod search;
mod stats;

pub use autocomplete::{auto_complete_markdown, Completion};
pub use cursor::{count_lines, cursor_position, line_start_offset};
pub use formatting::{
    insert_indent, insert_markdown_syntax, FormatCommand, InsertResult, Selection,
    SyntaxDescriptor,
};
pub use search::{search_content, search_documents, DocumentMatches, SearchMatch};
pub use stats::{get_document_stats, strip_markdown, DocumentStats, WORDS_PER_MINUTE};
