//! Content search across documents
//!
//! Case-insensitive substring search, line by line. Every occurrence is
//! reported, overlapping ones included, so `aa` finds two matches in `aaa`.

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single occurrence of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// 1-based line number
    pub line: usize,
    /// The full text of the matching line
    pub content: String,
    /// Character column where the match starts (0-based)
    pub match_start: usize,
    /// Character column just past the match
    pub match_end: usize,
}

/// All matches within one named document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMatches {
    pub name: String,
    pub matches: Vec<SearchMatch>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Find every case-insensitive occurrence of `query` in `content`.
///
/// A blank query (empty or whitespace only) finds nothing.
pub fn search_content(content: &str, query: &str) -> Vec<SearchMatch> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let needle: Vec<String> = query.chars().map(fold_case).collect();
    let mut matches = Vec::new();

    for (index, line) in content.split('\n').enumerate() {
        let haystack: Vec<String> = line.chars().map(fold_case).collect();
        if haystack.len() < needle.len() {
            continue;
        }
        for start in 0..=haystack.len() - needle.len() {
            if haystack[start..start + needle.len()] == needle[..] {
                matches.push(SearchMatch {
                    line: index + 1,
                    content: line.to_string(),
                    match_start: start,
                    match_end: start + needle.len(),
                });
            }
        }
    }

    matches
}

/// Search several `(name, content)` documents, keeping only those with hits.
pub fn search_documents<'a, I>(documents: I, query: &str) -> Vec<DocumentMatches>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    documents
        .into_iter()
        .filter_map(|(name, content)| {
            let matches = search_content(content, query);
            if matches.is_empty() {
                None
            } else {
                Some(DocumentMatches {
                    name: name.to_string(),
                    matches,
                })
            }
        })
        .collect()
}

/// Lowercase one character; some characters lowercase to more than one.
fn fold_case(ch: char) -> String {
    ch.to_lowercase().collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let matches = search_content("Hello hello", "HELLO");
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].match_start, matches[0].match_end), (0, 5));
        assert_eq!((matches[1].match_start, matches[1].match_end), (6, 11));
        assert_eq!(matches[0].content, "Hello hello");
    }

    #[test]
    fn test_overlapping_matches() {
        let starts: Vec<usize> = search_content("aaa", "aa")
            .iter()
            .map(|m| m.match_start)
            .collect();
        assert_eq!(starts, vec![0, 1]);
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let matches = search_content("one\ntwo\nthree two", "two");
        let lines: Vec<usize> = matches.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(matches[1].match_start, 6);
    }

    #[test]
    fn test_columns_are_characters() {
        let matches = search_content("på Øl", "øl");
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].match_start, matches[0].match_end), (3, 5));
    }

    #[test]
    fn test_blank_query() {
        assert!(search_content("anything", "").is_empty());
        assert!(search_content("a   b", "   ").is_empty());
    }

    #[test]
    fn test_query_longer_than_line() {
        assert!(search_content("ab\nabc", "abcd").is_empty());
    }

    #[test]
    fn test_search_documents_skips_misses() {
        let docs = [("a.md", "# Rust\nrust is fun"), ("b.md", "nothing here")];
        let results = search_documents(docs, "rust");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "a.md");
        assert_eq!(results[0].matches.len(), 2);
    }
}
