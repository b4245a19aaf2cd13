//! Moving points (carets, selection ends, markers) through an operation.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

use crate::error::OpError;
use crate::op::Op;
use crate::Operation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of an offset something binds to. `Left` binds to the character before the offset,
/// `Right` to the character after it.
///
/// This is also used to break ties in [`Operation::transform`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sticky { Left, Right }

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BorderKind { Start, End }

/// What sort of point this is. Range borders always have a stickiness.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointKind {
    Plain(Option<Sticky>),
    Border(BorderKind, Sticky),
}

/// A point which can be moved through operations. Border points with the same `key` are the
/// start and end of one range. `data` is carried along untouched.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IntervalPoint<K, D> {
    pub offset: usize,
    pub kind: PointKind,
    pub key: K,
    pub data: D,
}

impl<K, D> IntervalPoint<K, D> {
    pub fn plain(offset: usize, sticky: Option<Sticky>, key: K, data: D) -> Self {
        Self { offset, kind: PointKind::Plain(sticky), key, data }
    }

    pub fn start(offset: usize, sticky: Sticky, key: K, data: D) -> Self {
        Self { offset, kind: PointKind::Border(BorderKind::Start, sticky), key, data }
    }

    pub fn end(offset: usize, sticky: Sticky, key: K, data: D) -> Self {
        Self { offset, kind: PointKind::Border(BorderKind::End, sticky), key, data }
    }

    pub fn sticky(&self) -> Option<Sticky> {
        match self.kind {
            PointKind::Plain(sticky) => sticky,
            PointKind::Border(_, sticky) => Some(sticky),
        }
    }

    pub fn border(&self) -> Option<BorderKind> {
        match self.kind {
            PointKind::Plain(_) => None,
            PointKind::Border(kind, _) => Some(kind),
        }
    }

    /// Greedy range borders grow the range to take in text inserted right at the border.
    pub fn is_greedy(&self) -> bool {
        matches!(self.kind,
            PointKind::Border(BorderKind::Start, Sticky::Left) | PointKind::Border(BorderKind::End, Sticky::Right))
    }
}

/// A caret, optionally with a selection.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Caret {
    pub offset: usize,
    pub selection: Option<Range<usize>>,
}

/// Move a list of points through `op`, returning them (in the same order) with updated offsets.
///
/// - A point outside the edited regions keeps its position relative to the surrounding text.
/// - A point at the start of or strictly inside a replaced region goes to the start (`Left`) or
///   end (`Right`) of the inserted text.
/// - A point at a pure insert goes before (`Left`) or after (`Right`) the inserted text.
///
/// Adjacent replaces count as one replace, so operations which normalize to the same thing move
/// points the same way. A point at the start of an edit lands where [`Operation::transform`] would
/// put text inserted there with the same direction.
///
/// Points with no stickiness use `neutral`. If the start of a range ends up after its end, both
/// borders are moved to the same offset - the smaller one if `neutral` is `Left`, otherwise the
/// larger one.
///
/// Panics if a point lies past the end of the document.
pub fn shift_points<K: Eq + Hash, D>(op: &Operation, points: Vec<IntervalPoint<K, D>>, neutral: Sticky) -> Vec<IntervalPoint<K, D>> {
    try_shift_points(op, points, neutral).unwrap_or_else(|e| panic!("Cannot shift points: {e}"))
}

pub fn try_shift_points<K: Eq + Hash, D>(op: &Operation, mut points: Vec<IntervalPoint<K, D>>, neutral: Sticky) -> Result<Vec<IntervalPoint<K, D>>, OpError> {
    tracing::trace!(target: "editlog::points", points = points.len(), op_size = op.size(), ?neutral, "shift_points");
    if op.is_empty() { return Ok(points); }

    let sticky = |p: &IntervalPoint<K, D>| p.sticky().unwrap_or(neutral);

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by_key(|&i| points[i].offset);
    let mut shifted: Vec<Option<usize>> = vec![None; points.len()];

    // Everything in order[..next] has been resolved.
    let mut next = 0;
    let (mut src, mut dst) = (0, 0);
    for run in runs(op) {
        while next < order.len() && shifted[order[next]].is_some() { next += 1; }
        let (len_before, len_after) = run.lens();
        let pending = order[next..].iter().copied()
            .take_while(|&i| points[i].offset < src + len_before.max(1));

        match run {
            Run::Retain(len) => {
                for i in pending.filter(|&i| points[i].offset < src + len) {
                    if shifted[i].is_none() {
                        shifted[i] = Some(dst + points[i].offset - src);
                    }
                }
            }
            Run::Replace { del_len, ins_len } => {
                for i in pending {
                    let p = &points[i];
                    if shifted[i].is_some() { continue; }
                    shifted[i] = if del_len > 0 {
                        // At the start or strictly inside the replaced text.
                        Some(if sticky(p) == Sticky::Left { dst } else { dst + ins_len })
                    } else if sticky(p) == Sticky::Left {
                        Some(dst)
                    } else {
                        // Stays pending. It lands after the insert.
                        None
                    };
                }
            }
        }

        src += len_before;
        dst += len_after;
    }

    for i in order {
        if shifted[i].is_some() { continue; }
        if points[i].offset != src {
            tracing::debug!(target: "editlog::points", offset = points[i].offset, len = src, "point out of range");
            return Err(OpError::OutOfRange { offset: points[i].offset, len: src });
        }
        shifted[i] = Some(dst);
    }

    for (p, new_offset) in points.iter_mut().zip(shifted) {
        // Every point is resolved by this stage.
        if let Some(offset) = new_offset { p.offset = offset; }
    }

    fix_inverted_ranges(&mut points, neutral);
    Ok(points)
}

/// A stretch of an operation. Adjacent replaces act as one, whatever order their deletes and
/// inserts are listed in.
#[derive(Debug, Clone, Copy)]
enum Run {
    Retain(usize),
    Replace { del_len: usize, ins_len: usize },
}

impl Run {
    fn lens(&self) -> (usize, usize) {
        match *self {
            Run::Retain(len) => (len, len),
            Run::Replace { del_len, ins_len } => (del_len, ins_len),
        }
    }
}

fn runs(op: &Operation) -> impl Iterator<Item = Run> + '_ {
    let mut ops = op.ops().filter(|o| !o.is_noop()).peekable();
    std::iter::from_fn(move || {
        let first = ops.next()?;
        Some(match first {
            Op::Retain(len) => Run::Retain(*len),
            Op::Replace { .. } => {
                let (mut del_len, mut ins_len) = (first.len_before(), first.len_after());
                while let Some(o) = ops.next_if(|o| !o.is_retain()) {
                    del_len += o.len_before();
                    ins_len += o.len_after();
                }
                Run::Replace { del_len, ins_len }
            }
        })
    })
}

fn fix_inverted_ranges<K: Eq + Hash, D>(points: &mut [IntervalPoint<K, D>], neutral: Sticky) {
    // Borders are matched up by key, in list order. An end may be listed before its start.
    let pairs: Vec<(usize, usize)> = {
        let mut borders: HashMap<&K, (Vec<usize>, Vec<usize>)> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            match p.border() {
                Some(BorderKind::Start) => borders.entry(&p.key).or_default().0.push(i),
                Some(BorderKind::End) => borders.entry(&p.key).or_default().1.push(i),
                None => {}
            }
        }
        borders.into_values()
            .flat_map(|(starts, ends)| starts.into_iter().zip(ends))
            .collect()
    };

    for (s, e) in pairs {
        let (start, end) = (points[s].offset, points[e].offset);
        if start > end {
            let collapsed = if neutral == Sticky::Left { end } else { start };
            points[s].offset = collapsed;
            points[e].offset = collapsed;
        }
    }
}

impl Operation {
    /// Find where `offset` ends up after this operation is applied.
    pub fn transform_offset(&self, offset: usize, sticky: Sticky) -> usize {
        let points = shift_points(self, vec![IntervalPoint::plain(offset, Some(sticky), (), ())], sticky);
        points[0].offset
    }

    /// Transform a range. The range doesn't grow to include text inserted at either end.
    ///
    /// If `empty_hint` is set and the range is empty, it's moved like a caret with that
    /// stickiness.
    pub fn transform_range(&self, range: Range<usize>, empty_hint: Option<Sticky>) -> Range<usize> {
        if let (true, Some(sticky)) = (range.is_empty(), empty_hint) {
            let offset = self.transform_offset(range.start, sticky);
            return offset..offset;
        }

        let points = shift_points(self, vec![
            IntervalPoint::start(range.start, Sticky::Right, (), ()),
            IntervalPoint::end(range.end, Sticky::Left, (), ()),
        ], Sticky::Left);
        points[0].offset..points[1].offset
    }

    /// Transform a caret and its selection. A selection which collapses to nothing is dropped.
    pub fn transform_caret(&self, caret: &Caret, sticky: Sticky) -> Caret {
        let offset = self.transform_offset(caret.offset, sticky);
        let selection = caret.selection.clone()
            .map(|range| self.transform_range(range, None))
            .filter(|range| !range.is_empty());
        Caret { offset, selection }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::Sticky::*;

    fn shift_plain(op: &Operation, offsets: &[usize], sticky: Option<Sticky>, neutral: Sticky) -> Vec<usize> {
        let points = offsets.iter().enumerate()
            .map(|(i, &o)| IntervalPoint::plain(o, sticky, i, ()))
            .collect();
        shift_points(op, points, neutral).into_iter().map(|p| p.offset).collect()
    }

    #[test]
    fn points_outside_edits_keep_position() {
        let op = Operation::replace_at(3, "de", "XYZ", 8, false);
        assert_eq!(shift_plain(&op, &[0, 1, 2, 5, 6, 7, 8], None, Left), vec![0, 1, 2, 6, 7, 8, 9]);
    }

    #[test]
    fn points_inside_replace() {
        let op = Operation::replace_at(3, "def", "XY", 8, false);
        assert_eq!(shift_plain(&op, &[3, 4, 5], Some(Left), Left), vec![3, 3, 3]);
        assert_eq!(shift_plain(&op, &[3, 4, 5], Some(Right), Left), vec![5, 5, 5]);
        assert_eq!(shift_plain(&op, &[4], None, Right), vec![5]);
    }

    #[test]
    fn points_at_insert() {
        let op = Operation::insert_at(2, "XYZ", 4);
        assert_eq!(shift_plain(&op, &[2], Some(Left), Right), vec![2]);
        assert_eq!(shift_plain(&op, &[2], Some(Right), Left), vec![5]);
        assert_eq!(shift_plain(&op, &[2], None, Right), vec![5]);

        // Mixed stickiness at the same offset.
        let points = vec![
            IntervalPoint::plain(2, Some(Right), 0, "r"),
            IntervalPoint::plain(2, Some(Left), 1, "l"),
        ];
        let shifted = shift_points(&op, points, Left);
        assert_eq!(shifted[0].offset, 5);
        assert_eq!(shifted[0].data, "r");
        assert_eq!(shifted[1].offset, 2);
    }

    #[test]
    fn insert_at_end_of_document() {
        let op = Operation::insert_at(4, "!", 4);
        assert_eq!(shift_plain(&op, &[4], Some(Left), Left), vec![4]);
        assert_eq!(shift_plain(&op, &[4], Some(Right), Left), vec![5]);
    }

    #[test]
    fn unsorted_input_keeps_order() {
        let op = Operation::delete_at(0, "ab", 5);
        assert_eq!(shift_plain(&op, &[5, 0, 3, 1], Some(Right), Left), vec![3, 0, 1, 0]);
    }

    #[test]
    fn empty_op_leaves_points() {
        assert_eq!(shift_plain(&Operation::empty(), &[100, 3], None, Left), vec![100, 3]);
    }

    #[test]
    fn out_of_range() {
        let op = Operation::identity(3);
        let points = vec![IntervalPoint::plain(4, None, (), ())];
        assert_eq!(try_shift_points(&op, points, Left), Err(OpError::OutOfRange { offset: 4, len: 3 }));
    }

    #[test]
    fn greedy_borders() {
        let op = Operation::from_ops(vec![Op::insert("A"), Op::Retain(3), Op::insert("B")]);
        let points = vec![IntervalPoint::start(0, Left, 'r', ()), IntervalPoint::end(3, Right, 'r', ())];
        assert!(points.iter().all(|p| p.is_greedy()));
        let shifted = shift_points(&op, points, Left);
        assert_eq!((shifted[0].offset, shifted[1].offset), (0, 5));

        let points = vec![IntervalPoint::start(0, Right, 'r', ()), IntervalPoint::end(3, Left, 'r', ())];
        assert!(points.iter().all(|p| !p.is_greedy()));
        let shifted = shift_points(&op, points, Left);
        assert_eq!((shifted[0].offset, shifted[1].offset), (1, 4));
    }

    #[test]
    fn inverted_range_collapses() {
        let op = Operation::replace_at(2, "cdef", "XYZ", 8, false);
        let points = || vec![IntervalPoint::start(3, Right, 1, ()), IntervalPoint::end(4, Left, 1, ())];

        let left = shift_points(&op, points(), Left);
        assert_eq!((left[0].offset, left[1].offset), (2, 2));
        let right = shift_points(&op, points(), Right);
        assert_eq!((right[0].offset, right[1].offset), (5, 5));
    }

    #[test]
    fn range_wrappers() {
        let op = Operation::insert_at(2, "XY", 6);
        assert_eq!(op.transform_range(2..4, None), 4..6);
        assert_eq!(op.transform_range(0..2, None), 0..2);
        assert_eq!(op.transform_range(1..3, None), 1..5);
        assert_eq!(op.transform_range(2..2, Some(Right)), 4..4);
        assert_eq!(op.transform_range(2..2, Some(Left)), 2..2);
        assert_eq!(op.transform_range(2..2, None), 2..2);

        assert_eq!(op.transform_offset(2, Left), 2);
        assert_eq!(op.transform_offset(2, Right), 4);
        assert_eq!(op.transform_offset(6, Left), 8);
    }

    #[test]
    fn caret_wrapper() {
        let op = Operation::delete_at(1, "bcd", 6);
        let caret = Caret { offset: 5, selection: Some(1..4) };
        assert_eq!(op.transform_caret(&caret, Left), Caret { offset: 2, selection: None });

        let caret = Caret { offset: 0, selection: Some(0..5) };
        assert_eq!(op.transform_caret(&caret, Right), Caret { offset: 0, selection: Some(0..2) });
    }

    #[test]
    fn replace_start_matches_split_layout() {
        let merged = Operation::from_ops(vec![Op::Retain(2), Op::replace("c", "XY"), Op::Retain(1)]);
        let layouts = [
            vec![Op::Retain(2), Op::insert("XY"), Op::delete("c"), Op::Retain(1)],
            vec![Op::Retain(2), Op::delete("c"), Op::insert("XY"), Op::Retain(1)],
            vec![Op::Retain(1), Op::Retain(1), Op::insert("X"), Op::Retain(0), Op::replace("c", "Y"), Op::Retain(1)],
        ];
        for ops in layouts {
            let split = Operation::from_ops(ops);
            assert_eq!(split.normalize_soft(), merged);
            for sticky in [Left, Right] {
                for offset in 0..=4 {
                    assert_eq!(merged.transform_offset(offset, sticky), split.transform_offset(offset, sticky));
                }
            }
        }
        assert_eq!(merged.transform_offset(2, Left), 2);
        assert_eq!(merged.transform_offset(2, Right), 4);
    }

    #[test]
    fn caret_follows_concurrent_insert() {
        let other = Operation::replace_at(2, "c", "XY", 4, false);
        for sticky in [Left, Right] {
            let typed = Operation::insert_at(2, "Q", 4).transform(&other, sticky);
            let typed_at = typed.affected_ranges().next().unwrap().start;
            assert_eq!(other.transform_offset(2, sticky), typed_at);
        }
    }

    #[test]
    fn end_listed_before_start() {
        let op = Operation::replace_at(2, "cdef", "XYZ", 8, false);
        let points = vec![IntervalPoint::end(4, Left, 'k', ()), IntervalPoint::start(3, Right, 'k', ())];
        let shifted = shift_points(&op, points, Left);
        assert_eq!((shifted[0].offset, shifted[1].offset), (2, 2));

        // Separate ranges with their own keys are paired independently.
        let points = vec![
            IntervalPoint::end(4, Left, 'a', ()),
            IntervalPoint::start(0, Right, 'b', ()),
            IntervalPoint::start(3, Right, 'a', ()),
            IntervalPoint::end(8, Left, 'b', ()),
        ];
        let shifted = shift_points(&op, points, Right);
        let offsets: Vec<_> = shifted.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![5, 0, 5, 7]);
    }
}
