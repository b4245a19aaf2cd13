//! Deducing an operation from a before and after string.
//!
//! This isn't a real minimal diff (there's no LCS here). It strips common prefixes, and when the
//! strings disagree it looks a short distance ahead in both strings for a place where they line
//! up again. That's enough to find the edits a person makes while typing, and it runs in
//! bounded time for local edits.

use crate::builder::OperationBuilder;
use crate::unicount::{common_prefix_chars, common_suffix_chars, count_chars, split_at_char};
use crate::Operation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning for [`deduce_with`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiffConfig {
    /// The number of matching chars in a row needed to consider both strings back in sync.
    pub sequent_min: usize,
    /// How far ahead (in chars) to look in each string for a resync point.
    pub distance_max: usize,
    /// When nothing matches nearby, the whole remaining text is scanned for a resync point, trying
    /// only every `stride`th position in the old text.
    pub stride: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { sequent_min: 5, distance_max: 10, stride: 10 }
    }
}

fn prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn suffix_len(a: &[char], b: &[char]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

fn matches_at(a: &[char], b: &[char], i: usize, j: usize, n: usize) -> bool {
    i + n <= a.len() && j + n <= b.len() && a[i..i + n] == b[j..j + n]
}

/// Find offsets (di, dj) where `a[di..]` and `b[dj..]` start with at least `sequent_min` equal
/// chars. Nearby positions are preferred.
fn find_resync(a: &[char], b: &[char], cfg: &DiffConfig) -> Option<(usize, usize)> {
    let n = cfg.sequent_min.max(1);
    let max = cfg.distance_max;

    for d in 1..=max * 2 {
        for di in d.saturating_sub(max)..=d.min(max) {
            let dj = d - di;
            if matches_at(a, b, di, dj, n) { return Some((di, dj)); }
        }
    }

    // Fall back to scanning everything.
    let stride = cfg.stride.max(1);
    for di in (0..a.len()).step_by(stride) {
        if di + n > a.len() { break; }
        for dj in 0..=b.len().saturating_sub(n) {
            if (di, dj) != (0, 0) && matches_at(a, b, di, dj, n) { return Some((di, dj)); }
        }
    }

    None
}

fn collect(s: &[char]) -> String {
    s.iter().collect()
}

/// Append the ops turning `from` into `to` onto the builder.
pub(crate) fn push_diff(out: &mut OperationBuilder, from: &str, to: &str, cfg: &DiffConfig) {
    let a: Vec<char> = from.chars().collect();
    let b: Vec<char> = to.chars().collect();

    let start = prefix_len(&a, &b);
    let suffix = suffix_len(&a[start..], &b[start..]);
    let (a_end, b_end) = (a.len() - suffix, b.len() - suffix);

    out.retain(start);
    let (mut i, mut j) = (start, start);
    loop {
        let common = prefix_len(&a[i..a_end], &b[j..b_end]);
        out.retain(common);
        i += common;
        j += common;

        if i == a_end || j == b_end { break; }

        match find_resync(&a[i..a_end], &b[j..b_end], cfg) {
            Some((di, dj)) => {
                out.replace(&collect(&a[i..i + di]), &collect(&b[j..j + dj]));
                i += di;
                j += dj;
            }
            None => break,
        }
    }

    out.replace(&collect(&a[i..a_end]), &collect(&b[j..b_end]));
    out.retain(suffix);
}

/// Deduce the operation turning `from` into `to`, using the default [`DiffConfig`].
pub fn deduce(from: &str, to: &str) -> Operation {
    deduce_with(from, to, &DiffConfig::default())
}

pub fn deduce_with(from: &str, to: &str, cfg: &DiffConfig) -> Operation {
    tracing::trace!(target: "editlog::diff", from_len = from.len(), to_len = to.len(), "deduce");
    let mut out = OperationBuilder::new();
    push_diff(&mut out, from, to, cfg);
    out.build_sized(count_chars(from))
}

/// The quick version of [`deduce`]. This only strips the common prefix and suffix, and replaces
/// everything in between.
pub fn deduce_fast(from: &str, to: &str) -> Operation {
    let start = common_prefix_chars(from, to);
    let (_, from_rest) = split_at_char(from, start);
    let (_, to_rest) = split_at_char(to, start);
    let suffix = common_suffix_chars(from_rest, to_rest);
    let (from_mid, _) = split_at_char(from_rest, count_chars(from_rest) - suffix);
    let (to_mid, _) = split_at_char(to_rest, count_chars(to_rest) - suffix);

    let mut out = OperationBuilder::new();
    out.retain(start);
    out.replace(from_mid, to_mid);
    out.retain(suffix);
    out.build_sized(count_chars(from))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::op::Op;
    use crate::op::Op::*;

    fn check_round_trip(from: &str, to: &str) -> Operation {
        let op = deduce(from, to);
        assert_eq!(op.apply_to_string(from).unwrap(), to);
        let fast = deduce_fast(from, to);
        assert_eq!(fast.apply_to_string(from).unwrap(), to);
        op
    }

    #[test]
    fn simple_replace() {
        let op = check_round_trip("abcdef", "abXYef");
        assert!(op.ops().eq([Retain(2), Op::replace("cd", "XY"), Retain(2)].iter()));
        assert_eq!(Operation::deduce_operation("abcdef", "abXYef"), op);
    }

    #[test]
    fn same_string_is_identity() {
        for s in ["", "a", "hello there", "δδδ😀"] {
            let op = check_round_trip(s, s);
            assert!(op.is_identity());
            assert_eq!(op.len_before(), count_chars(s));
        }
    }

    #[test]
    fn finds_two_separate_edits() {
        let op = check_round_trip("the quick brown fox jumps", "the quack brown fox leaps");
        assert!(op.ops().eq([
            Retain(6), Op::replace("i", "a"), Retain(13), Op::replace("jum", "lea"), Retain(2)
        ].iter()));

        let fast = deduce_fast("the quick brown fox jumps", "the quack brown fox leaps");
        assert_eq!(fast.size(), 3);
    }

    #[test]
    fn insert_and_delete() {
        let op = check_round_trip("hello world", "hello big world");
        assert!(op.ops().eq([Retain(6), Op::insert("big "), Retain(5)].iter()));

        let op = check_round_trip("one two three four", "one four");
        assert_eq!(op.affected_ranges().count(), 1);
    }

    #[test]
    fn resync_via_fallback_scan() {
        let from = "0123456789abcdefghijklmnopqrstuvwxyz_MATCHING_TAIL_!";
        let to = "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX_MATCHING_TAIL_?";
        let op = check_round_trip(from, to);
        assert!(op.size() >= 3);
    }

    #[test]
    fn unicode() {
        check_round_trip("δ😀abc😀δ", "δ😀aXc😀δ");
        check_round_trip("😀😀😀", "");
        check_round_trip("", "😀😀😀");
    }

    #[test]
    fn custom_config() {
        let cfg = DiffConfig { sequent_min: 1, distance_max: 2, stride: 1 };
        let op = deduce_with("abcXdef", "abcYdef", &cfg);
        assert!(op.ops().eq([Retain(3), Op::replace("X", "Y"), Retain(3)].iter()));
    }
}
