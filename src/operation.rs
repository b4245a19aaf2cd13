use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Range;

use jumprope::JumpRope;
use op_tree::{Cursor, OpTree};

use crate::builder::OperationBuilder;
use crate::diff;
use crate::error::OpError;
use crate::op::{Op, OpMetrics};
use crate::unicount::{count_chars, split_at_char};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An operation is an immutable list of [`Op`]s describing one complete edit to a document of a
/// known length. Operations are cheap to clone, and operations derived from one another share
/// storage.
///
/// The operation with no ops at all (see [`Operation::empty`]) is special. It is the "no-op", and
/// can be combined with operations of any length. This is distinct from
/// [`Operation::identity`], which only applies to documents of one exact length.
///
/// Two operations are equal if they contain exactly the same list of ops. So `[R2, R3]` and
/// `[R5]` are different operations, even though they do the same thing. Use
/// [`normalize_soft`](Operation::normalize_soft) before comparing if that matters.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(from = "Vec<Op>", into = "Vec<Op>"))]
pub struct Operation {
    ops: OpTree<Op>,
}

/// Positions a cursor can be moved to with [`OpCursor::seek`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Seek {
    Start,
    End,
    /// The op containing this offset in the document before the operation is applied.
    LenBefore(usize),
    /// The op containing this offset in the document after the operation is applied.
    LenAfter(usize),
}

/// A cursor over the ops in an operation. The cursor is also an iterator over the ops after it.
#[derive(Debug, Clone)]
pub struct OpCursor<'a>(Cursor<'a, Op>);

impl<'a> OpCursor<'a> {
    pub fn seek(&mut self, to: Seek) {
        match to {
            Seek::Start => self.0.seek_start(),
            Seek::End => self.0.seek_end(),
            Seek::LenBefore(offset) => self.0.seek_by(|m| m.len_before, offset),
            Seek::LenAfter(offset) => self.0.seek_by(|m| m.len_after, offset),
        }
    }

    /// The combined metrics of all ops before the cursor.
    pub fn prefix(&self) -> OpMetrics {
        self.0.prefix()
    }

    pub fn has_next(&self) -> bool {
        self.0.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.0.has_prev()
    }

    pub fn peek(&self) -> Option<&'a Op> {
        self.0.peek()
    }

    pub fn prev(&mut self) -> Option<&'a Op> {
        self.0.prev()
    }

    pub(crate) fn into_inner(self) -> Cursor<'a, Op> {
        self.0
    }
}

impl<'a> Iterator for OpCursor<'a> {
    type Item = &'a Op;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl Operation {
    /// The universal no-op. It contains no ops and can be composed with anything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An operation which leaves a document of exactly `len` chars unchanged.
    pub fn identity(len: usize) -> Self {
        Self::from_ops(vec![Op::Retain(len)])
    }

    /// Wrap a list of ops. The ops are stored exactly as passed in.
    pub fn from_ops(ops: Vec<Op>) -> Self {
        Operation { ops: OpTree::from_vec(ops) }
    }

    pub fn insert_at(offset: usize, text: &str, total_len: usize) -> Self {
        assert!(offset <= total_len, "Cannot insert at {offset} in a document of length {total_len}");
        let mut b = OperationBuilder::new();
        b.retain(offset);
        b.insert(text);
        b.retain(total_len - offset);
        b.build_sized(total_len)
    }

    pub fn delete_at(offset: usize, text: &str, total_len: usize) -> Self {
        let len = count_chars(text);
        assert!(offset + len <= total_len, "Cannot delete {offset}..{} in a document of length {total_len}", offset + len);
        let mut b = OperationBuilder::new();
        b.retain(offset);
        b.delete(text);
        b.retain(total_len - offset - len);
        b.build_sized(total_len)
    }

    /// Replace `old_text` at `offset` with `new_text`. When `deduce` is set, the replacement is
    /// diffed so text shared by both sides becomes retains instead.
    pub fn replace_at(offset: usize, old_text: &str, new_text: &str, total_len: usize, deduce: bool) -> Self {
        let len = count_chars(old_text);
        assert!(offset + len <= total_len, "Cannot replace {offset}..{} in a document of length {total_len}", offset + len);
        let mut b = OperationBuilder::new();
        b.retain(offset);
        if deduce {
            diff::push_diff(&mut b, old_text, new_text, &Default::default());
        } else {
            b.replace(old_text, new_text);
        }
        b.retain(total_len - offset - len);
        b.build_sized(total_len)
    }

    /// Build an operation which turns `from` into `to`.
    pub fn deduce_operation(from: &str, to: &str) -> Self {
        diff::deduce(from, to)
    }

    /// The number of ops.
    pub fn size(&self) -> usize {
        self.ops.summary().count
    }

    /// The length of the documents this operation can be applied to.
    pub fn len_before(&self) -> usize {
        self.ops.summary().len_before
    }

    /// The length of the document after this operation has been applied.
    pub fn len_after(&self) -> usize {
        self.ops.summary().len_after
    }

    pub fn metrics(&self) -> OpMetrics {
        self.ops.summary()
    }

    /// Is this the universal no-op?
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True if applying this operation never changes a document.
    pub fn is_identity(&self) -> bool {
        self.ops().all(|op| match op {
            Op::Retain(_) => true,
            Op::Replace { delete, insert } => delete == insert,
        })
    }

    /// Iterate through the ops. This can be called any number of times.
    pub fn ops(&self) -> OpCursor<'_> {
        self.cursor()
    }

    /// A cursor at the start of the operation.
    pub fn cursor(&self) -> OpCursor<'_> {
        OpCursor(self.ops.cursor_at_start())
    }

    /// Lazily list the ranges of the original document touched by `Replace` ops.
    pub fn affected_ranges(&self) -> AffectedRanges<'_> {
        AffectedRanges { ops: self.ops(), pos: 0 }
    }

    /// The inverse operation, which undoes this one.
    pub fn invert(&self) -> Self {
        Self::from_ops(self.ops().map(Op::inverted).collect())
    }

    /// Make an operation which applies `self` to the first `self.len_before()` chars of a document
    /// and `other` to the rest. Storage is shared with both inputs.
    pub fn concat(&self, other: &Self) -> Self {
        Operation { ops: self.ops.concat(&other.ops) }
    }

    /// Apply this operation to a string, checking that the deleted text matches.
    pub fn apply_to_string(&self, text: &str) -> Result<String, OpError> {
        if self.is_empty() { return Ok(text.to_string()); }

        let len = count_chars(text);
        if len != self.len_before() {
            return Err(OpError::LengthMismatch { expected: self.len_before(), actual: len });
        }

        let mut result = String::with_capacity(text.len());
        let mut rest = text;
        let mut pos = 0;
        for op in self.ops() {
            match op {
                Op::Retain(n) => {
                    let (keep, tail) = split_at_char(rest, *n);
                    result.push_str(keep);
                    rest = tail;
                    pos += *n;
                }
                Op::Replace { delete, insert } => {
                    let del_len = count_chars(delete);
                    let (removed, tail) = split_at_char(rest, del_len);
                    if removed != delete.as_str() {
                        return Err(OpError::TextMismatch {
                            offset: pos,
                            expected: delete.to_string(),
                            actual: removed.to_string(),
                        });
                    }
                    result.push_str(insert);
                    rest = tail;
                    pos += del_len;
                }
            }
        }
        Ok(result)
    }

    /// Apply this operation to a rope. Only the document length is checked; deleted content is
    /// trusted.
    pub fn apply_to_rope(&self, rope: &mut JumpRope) -> Result<(), OpError> {
        if self.is_empty() { return Ok(()); }

        if rope.len_chars() != self.len_before() {
            return Err(OpError::LengthMismatch { expected: self.len_before(), actual: rope.len_chars() });
        }

        let mut pos = 0;
        for op in self.ops() {
            match op {
                Op::Retain(n) => pos += *n,
                Op::Replace { delete, insert } => {
                    let del_len = count_chars(delete);
                    if del_len > 0 { rope.remove(pos..pos + del_len); }
                    if !insert.is_empty() { rope.insert(pos, insert); }
                    pos += count_chars(insert);
                }
            }
        }
        Ok(())
    }
}

/// Iterator returned by [`Operation::affected_ranges`].
#[derive(Debug, Clone)]
pub struct AffectedRanges<'a> {
    ops: OpCursor<'a>,
    pos: usize,
}

impl<'a> Iterator for AffectedRanges<'a> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        for op in self.ops.by_ref() {
            let start = self.pos;
            self.pos += op.len_before();
            if let Op::Replace { .. } = op {
                return Some(start..self.pos);
            }
        }
        None
    }
}

impl From<Vec<Op>> for Operation {
    fn from(ops: Vec<Op>) -> Self {
        Self::from_ops(ops)
    }
}

impl From<Operation> for Vec<Op> {
    fn from(op: Operation) -> Self {
        op.ops().cloned().collect()
    }
}

impl FromIterator<Op> for Operation {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self::from_ops(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Operation {
    type Item = &'a Op;
    type IntoIter = OpCursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops()
    }
}

impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.ops().eq(other.ops())
    }
}

impl Eq for Operation {}

impl Hash for Operation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.size());
        for op in self.ops() {
            op.hash(state);
        }
    }
}

impl Debug for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ops()).finish()
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}
