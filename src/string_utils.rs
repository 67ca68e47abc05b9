//! UTF-8 safe string helpers
//!
//! Editor offsets are character indices while Rust slices by byte. These
//! helpers map character offsets to bytes and keep byte positions taken from
//! parser source columns on character boundaries, so slicing never panics
//! on text like `på`, `中文` or `🎉`.

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundaries
// ─────────────────────────────────────────────────────────────────────────────

/// Smallest character boundary `>= index`, or the length when past the end.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut i = index;
    while i < bytes.len() && !is_utf8_char_start(bytes[i]) {
        i += 1;
    }
    i
}

/// Continuation bytes look like `10xxxxxx`; everything else starts a character.
#[inline]
fn is_utf8_char_start(byte: u8) -> bool {
    (byte & 0b1100_0000) != 0b1000_0000
}

/// Slice from `start` to the end, rounding `start` up to a boundary.
#[inline]
pub fn safe_slice_from(s: &str, start: usize) -> &str {
    &s[ceil_char_boundary(s, start)..]
}

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Byte offset of the character at `char_index`.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
