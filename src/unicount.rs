//! Conversions between codepoint offsets and byte offsets in utf-8 strings. All lengths in this
//! crate are counted in unicode codepoints (chars).

pub fn chars_to_bytes(s: &str, char_pos: usize) -> usize {
    str_indices::chars::to_byte_idx(s, char_pos)
}

pub fn split_at_char(s: &str, char_pos: usize) -> (&str, &str) {
    s.split_at(chars_to_bytes(s, char_pos))
}

pub fn count_chars(s: &str) -> usize {
    str_indices::chars::count(s)
}

/// Slice a string by codepoint offsets.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    debug_assert!(start <= end);
    let start_byte = chars_to_bytes(s, start);
    let end_byte = start_byte + chars_to_bytes(&s[start_byte..], end - start);
    &s[start_byte..end_byte]
}

/// The number of leading chars shared by both strings.
pub fn common_prefix_chars(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// The number of trailing chars shared by both strings.
pub fn common_suffix_chars(a: &str, b: &str) -> usize {
    a.chars().rev().zip(b.chars().rev()).take_while(|(x, y)| x == y).count()
}
