use std::ops::Range;

use crate::builder::OperationBuilder;
use crate::diff::{push_diff, DiffConfig};
use crate::op::Op;
use crate::operation::Seek;
use crate::Operation;

impl Operation {
    /// Merge adjacent retains and adjacent replaces, and remove empty ops. The result does the
    /// same thing as `self`.
    pub fn normalize_soft(&self) -> Operation {
        if self.is_empty() { return Operation::empty(); }
        let mut result = OperationBuilder::new();
        result.extend(self.ops().cloned());
        result.build_sized(self.len_before())
    }

    /// Like [`normalize_soft`](Self::normalize_soft), but also re-diff each run of replaces so
    /// text which is both deleted and inserted turns into retains.
    pub fn normalize_hard(&self) -> Operation {
        if self.is_empty() { return Operation::empty(); }
        let mut result = OperationBuilder::new();
        let mut delete = String::new();
        let mut insert = String::new();

        let cfg = DiffConfig::default();
        for op in self.ops() {
            match op {
                Op::Retain(len) => {
                    if !delete.is_empty() || !insert.is_empty() {
                        push_diff(&mut result, &delete, &insert, &cfg);
                        delete.clear();
                        insert.clear();
                    }
                    result.retain(*len);
                }
                Op::Replace { delete: d, insert: i } => {
                    delete.push_str(d);
                    insert.push_str(i);
                }
            }
        }
        push_diff(&mut result, &delete, &insert, &cfg);
        result.build_sized(self.len_before())
    }

    /// Restrict this operation to each of the given (non-overlapping) ranges of the original
    /// document. Each returned operation applies to the whole original document, but only
    /// contains the replaces which touch its range.
    ///
    /// A replace which overlaps several ranges is copied whole into each of them, so the results
    /// can't be composed back into the original operation. A pure insert at offset `p` belongs to
    /// a range if `start <= p < end`, or if `p == end` and `end` is the end of the document.
    pub fn split_edits_by_ranges(&self, ranges: &[Range<usize>]) -> Vec<Operation> {
        let len = self.len_before();
        ranges.iter().map(|range| {
            assert!(range.start <= range.end && range.end <= len,
                "Range {range:?} is out of bounds for a document of length {len}");

            let mut result = OperationBuilder::new();
            let mut cursor = self.cursor();
            if range.start > 0 {
                cursor.seek(Seek::LenBefore(range.start - 1));
            }

            let mut pos = cursor.prefix().len_before;
            let mut emitted = 0;
            for op in cursor {
                if pos > range.end { break; }
                let op_len = op.len_before();
                let include = match op {
                    Op::Retain(_) => false,
                    Op::Replace { .. } if op_len > 0 => pos < range.end && pos + op_len > range.start,
                    Op::Replace { .. } => {
                        (range.start <= pos && pos < range.end) || (pos == range.end && pos == len)
                    }
                };
                if include {
                    result.retain(pos - emitted);
                    result.push(op.clone());
                    emitted = pos + op_len;
                }
                pos += op_len;
            }

            result.retain(len - emitted);
            result.build_sized(len)
        }).collect()
    }
}
