use std::fmt::{Debug, Display, Formatter};
use std::ops::{AddAssign, SubAssign};

use smartstring::alias::String as SmartString;
use op_tree::Summarize;

use crate::span::MergableSpan;
use crate::unicount::count_chars;
use Op::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single edit instruction. An operation is a list of these, walking over the document from
/// start to end.
///
/// Lengths are counted in chars (unicode codepoints).
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "crate::serde_helpers::OpWire", into = "crate::serde_helpers::OpWire"))]
pub enum Op {
    /// Keep the next `len` characters of the document.
    Retain(usize),
    /// Replace the following text in the document with new text. Either side may be empty, so
    /// this also describes plain inserts and deletes.
    Replace { delete: SmartString, insert: SmartString },
}

impl Op {
    pub fn replace(delete: &str, insert: &str) -> Self {
        Replace { delete: delete.into(), insert: insert.into() }
    }

    pub fn insert(text: &str) -> Self {
        Self::replace("", text)
    }

    pub fn delete(text: &str) -> Self {
        Self::replace(text, "")
    }

    /// The length of the text this op consumes from the document.
    pub fn len_before(&self) -> usize {
        match self {
            Retain(len) => *len,
            Replace { delete, .. } => count_chars(delete),
        }
    }

    /// The length of the text this op leaves in the resulting document.
    pub fn len_after(&self) -> usize {
        match self {
            Retain(len) => *len,
            Replace { insert, .. } => count_chars(insert),
        }
    }

    pub fn is_retain(&self) -> bool {
        matches!(self, Retain(_))
    }

    /// Empty ops don't do anything. They're removed by normalization.
    pub fn is_noop(&self) -> bool {
        match self {
            Retain(len) => *len == 0,
            Replace { delete, insert } => delete.is_empty() && insert.is_empty(),
        }
    }

    /// Swap the deleted and inserted text.
    pub fn inverted(&self) -> Self {
        match self {
            Retain(len) => Retain(*len),
            Replace { delete, insert } => Replace { delete: insert.clone(), insert: delete.clone() },
        }
    }
}

impl MergableSpan for Op {
    fn can_append(&self, other: &Self) -> bool {
        matches!((self, other), (Retain(_), Retain(_)) | (Replace { .. }, Replace { .. }))
    }

    fn append(&mut self, other: Self) {
        match (self, other) {
            (Retain(len), Retain(len2)) => *len += len2,
            (Replace { delete, insert }, Replace { delete: d2, insert: i2 }) => {
                delete.push_str(&d2);
                insert.push_str(&i2);
            }
            (_, _) => unreachable!()
        }
    }
}

impl Debug for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Retain(len) => write!(f, "R{len}"),
            Replace { delete, insert } => write!(f, "-{:?}+{:?}", delete.as_str(), insert.as_str()),
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

/// The metrics tracked for runs of ops in an operation.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct OpMetrics {
    /// Sum of `len_before` over the ops.
    pub len_before: usize,
    /// Sum of `len_after` over the ops.
    pub len_after: usize,
    /// Number of ops.
    pub count: usize,
}

impl AddAssign for OpMetrics {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.len_before += rhs.len_before;
        self.len_after += rhs.len_after;
        self.count += rhs.count;
    }
}

impl SubAssign for OpMetrics {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.len_before -= rhs.len_before;
        self.len_after -= rhs.len_after;
        self.count -= rhs.count;
    }
}

impl Summarize for Op {
    type Summary = OpMetrics;

    fn summarize(&self) -> OpMetrics {
        OpMetrics { len_before: self.len_before(), len_after: self.len_after(), count: 1 }
    }
}
