//! Hierarchical heading numbers ("1", "1.1", "1.2.1", ...)
//!
//! The renderer and the TOC extractor each run their own [`HeadingCounter`]
//! over their own token stream, so both derive identical numbers for the
//! same document without sharing state.

use super::token::{Nesting, Token, TokenKind};

// ─────────────────────────────────────────────────────────────────────────────
// Heading Counter
// ─────────────────────────────────────────────────────────────────────────────

/// One counter per heading level 1-6.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingCounter {
    counters: [u32; 6],
}

impl HeadingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter for a heading at `level` and return its number.
    ///
    /// Deeper levels are reset; levels that were never reached are left out
    /// of the number, so a lone level-3 heading is numbered "1".
    pub fn next(&mut self, level: u8) -> String {
        let index = usize::from(level.clamp(1, 6)) - 1;
        for slot in &mut self.counters[index + 1..] {
            *slot = 0;
        }
        self.counters[index] = self.counters[index].saturating_add(1);

        self.counters[..=index]
            .iter()
            .filter(|&&count| count > 0)
            .map(|count| count.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Numbering Pass
// ─────────────────────────────────────────────────────────────────────────────

/// Prefix every heading's inline content with its number.
pub fn number_headings(tokens: &mut [Token]) {
    let mut counter = HeadingCounter::new();
    for i in 0..tokens.len() {
        if tokens[i].nesting != Nesting::Open {
            continue;
        }
        let Some(level) = tokens[i].heading_level() else {
            continue;
        };
        let number = counter.next(level);
        if let Some(inline) = tokens
            .get_mut(i + 1)
            .filter(|token| token.kind == TokenKind::Inline)
        {
            prefix_inline(inline, &number);
        }
    }
}

fn prefix_inline(inline: &mut Token, number: &str) {
    inline.content = format!("{} {}", number, inline.content);
    match inline.children.first_mut() {
        Some(first) if first.kind == TokenKind::Text => {
            first.content = format!("{} {}", number, first.content);
        }
        _ => inline
            .children
            .insert(0, Token::text(format!("{} ", number))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::token::heading_tag;

    fn heading(level: u8, text: &str) -> Vec<Token> {
        vec![
            Token::block_open(TokenKind::Heading, heading_tag(level)),
            Token::inline(text, vec![Token::text(text)]),
            Token::block_close(TokenKind::Heading, heading_tag(level)),
        ]
    }

    #[test]
    fn test_counter_sequence() {
        let mut counter = HeadingCounter::new();
        let numbers: Vec<String> = [1, 2, 2, 3, 1].iter().map(|&l| counter.next(l)).collect();
        assert_eq!(numbers, vec!["1", "1.1", "1.2", "1.2.1", "2"]);
    }

    #[test]
    fn test_counter_skipped_levels_are_omitted() {
        let mut counter = HeadingCounter::new();
        assert_eq!(counter.next(3), "1");
        assert_eq!(counter.next(3), "2");
        assert_eq!(counter.next(1), "1");
        assert_eq!(counter.next(3), "1.1");
    }

    #[test]
    fn test_counter_resets_deeper_levels() {
        let mut counter = HeadingCounter::new();
        counter.next(1);
        counter.next(2);
        counter.next(3);
        assert_eq!(counter.next(2), "1.2");
        assert_eq!(counter.next(3), "1.2.1");
    }

    #[test]
    fn test_number_headings_updates_content_and_text_child() {
        let mut tokens = heading(1, "Intro");
        tokens.extend(heading(2, "Details"));
        number_headings(&mut tokens);
        assert_eq!(tokens[1].content, "1 Intro");
        assert_eq!(tokens[1].children[0].content, "1 Intro");
        assert_eq!(tokens[4].content, "1.1 Details");
        assert_eq!(tokens[4].children[0].content, "1.1 Details");
    }

    #[test]
    fn test_number_inserted_before_non_text_child() {
        let mut tokens = heading(1, "**Bold**");
        tokens[1].children = vec![
            Token::inline_open(TokenKind::Strong, "strong"),
            Token::text("Bold"),
            Token::inline_close(TokenKind::Strong, "strong"),
        ];
        number_headings(&mut tokens);
        assert_eq!(tokens[1].content, "1 **Bold**");
        assert_eq!(tokens[1].children[0].kind, TokenKind::Text);
        assert_eq!(tokens[1].children[0].content, "1 ");
        assert_eq!(tokens[1].children.len(), 4);
    }
}
