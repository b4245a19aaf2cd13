use crate::builder::OperationBuilder;
use crate::chunk::{Chunk, ChunkIter, Context};
use crate::error::OpError;
use crate::op::Op;
use crate::unicount::{char_slice, count_chars, split_at_char};
use crate::Operation;

fn take_or_mismatch<'a>(iter: &mut ChunkIter<'a>, max: usize, expected: usize, actual: usize) -> Result<Chunk<'a>, OpError> {
    iter.take(max).ok_or(OpError::LengthMismatch { expected, actual })
}

impl Operation {
    /// Compose two operations together into a single operation. The result has the same effect
    /// as applying `self` then `other`.
    ///
    /// Panics if `other` can't be applied to the output of `self`. See [`try_compose`](Self::try_compose).
    pub fn compose(&self, other: &Operation) -> Operation {
        self.try_compose(other).unwrap_or_else(|e| panic!("Cannot compose {self} with {other}: {e}"))
    }

    pub fn try_compose(&self, other: &Operation) -> Result<Operation, OpError> {
        tracing::trace!(target: "editlog::compose", a_size = self.size(), b_size = other.size(), "compose");

        if self.is_empty() { return Ok(other.clone()); }
        if other.is_empty() { return Ok(self.clone()); }

        let (expected, actual) = (self.len_after(), other.len_before());
        if expected != actual {
            tracing::debug!(target: "editlog::compose", expected, actual, "compose length mismatch");
            return Err(OpError::LengthMismatch { expected, actual });
        }

        let mut result = OperationBuilder::new();
        let mut iter = ChunkIter::new(self, Context::Post);
        // Position in the document between the two operations.
        let mut pos = 0;

        for op in other.ops() {
            match op {
                Op::Retain(len) => {
                    let mut len = *len;
                    while len > 0 {
                        let chunk = take_or_mismatch(&mut iter, len, expected, actual)?;
                        len -= chunk.len(Context::Post);
                        result.push_chunk(chunk);
                    }
                    pos += op.len_before();
                }

                Op::Replace { delete, insert } => {
                    let mut del = delete.as_str();
                    let mut len = count_chars(del);
                    while len > 0 {
                        let chunk = take_or_mismatch(&mut iter, len, expected, actual)?;
                        let chunk_len = chunk.len(Context::Post);
                        let (ours, rest) = split_at_char(del, chunk_len);
                        match chunk {
                            // Deleting text which was in the original document.
                            Chunk::Retain(_) => result.delete(ours),
                            Chunk::Delete(s) => result.delete(s),
                            Chunk::Insert(s) => {
                                // Cancel the insert out. The text deleted must match what was inserted.
                                if s != ours {
                                    tracing::debug!(target: "editlog::compose", pos, inserted = s, deleted = ours, "compose text mismatch");
                                    return Err(OpError::TextMismatch {
                                        offset: pos, expected: s.to_string(), actual: ours.to_string()
                                    });
                                }
                            }
                        }
                        len -= chunk_len;
                        pos += chunk_len;
                        del = rest;
                    }
                    result.insert(insert);
                }
            }
        }

        // Anything left over from self must be deletes at the end of the document.
        while let Some(chunk) = iter.next_whole() {
            result.push_chunk(chunk);
        }

        Ok(result.build_sized(self.len_before()))
    }

    /// Merge two concurrent operations made against the same document. Inserts of `other` at the
    /// same location as inserts in `self` end up after them.
    pub fn plus(&self, other: &Operation) -> Operation {
        self.compose(&other.transform(self, crate::Sticky::Right))
    }

    /// Merge a set of independent edits to the same base document into one operation. Unlike
    /// compose, the operations aren't applied one after another. Each one describes some replaced
    /// regions of the same base text.
    ///
    /// Regions which overlap are merged. Where two operations delete the same text, they must
    /// agree on what that text is. Inserted text inside a merged region is concatenated, in
    /// document order and then in operand order.
    ///
    /// Empty operations are ignored.
    pub fn compose_all<'a, I: IntoIterator<Item = &'a Operation>>(ops: I) -> Operation {
        Self::try_compose_all(ops).unwrap_or_else(|e| panic!("Cannot compose operations: {e}"))
    }

    pub fn try_compose_all<'a, I: IntoIterator<Item = &'a Operation>>(ops: I) -> Result<Operation, OpError> {
        let ops: Vec<&Operation> = ops.into_iter().filter(|op| !op.is_empty()).collect();
        tracing::trace!(target: "editlog::compose", operands = ops.len(), "compose_all");

        let Some(first) = ops.first() else { return Ok(Operation::empty()); };
        let len = first.len_before();
        if let Some(op) = ops.iter().find(|op| op.len_before() != len) {
            tracing::debug!(target: "editlog::compose", expected = len, actual = op.len_before(), "compose_all length mismatch");
            return Err(OpError::LengthMismatch { expected: len, actual: op.len_before() });
        }

        // (start, deleted, inserted). Sort is stable, so operand order is kept at each offset.
        let mut events: Vec<(usize, &str, &str)> = vec![];
        for op in &ops {
            let mut pos = 0;
            for o in op.ops() {
                if let Op::Replace { delete, insert } = o {
                    if !o.is_noop() { events.push((pos, delete.as_str(), insert.as_str())); }
                }
                pos += o.len_before();
            }
        }
        events.sort_by_key(|(start, ..)| *start);

        let mut result = OperationBuilder::new();
        let mut pos = 0;
        let mut open: Option<Span> = None;

        for (start, delete, insert) in events {
            let del_len = count_chars(delete);
            match open.as_mut().filter(|span| start < span.end || start == span.start) {
                Some(span) => {
                    let end = start + del_len;
                    let overlap = span.end.min(end) - start;
                    let theirs = char_slice(&span.delete, start - span.start, start - span.start + overlap);
                    let (ours, tail) = split_at_char(delete, overlap);
                    if theirs != ours {
                        tracing::debug!(target: "editlog::compose", start, theirs, ours, "compose_all overlapping deletes disagree");
                        return Err(OpError::TextMismatch {
                            offset: start, expected: theirs.to_string(), actual: ours.to_string()
                        });
                    }
                    if end > span.end {
                        span.delete.push_str(tail);
                        span.end = end;
                    }
                    span.insert.push_str(insert);
                }
                None => {
                    if let Some(span) = open.take() {
                        pos = span.flush(&mut result, pos);
                    }
                    open = Some(Span {
                        start,
                        end: start + del_len,
                        delete: delete.to_string(),
                        insert: insert.to_string(),
                    });
                }
            }
        }

        if let Some(span) = open {
            pos = span.flush(&mut result, pos);
        }
        result.retain(len - pos);
        Ok(result.build_sized(len))
    }
}

/// A region of the base document being replaced while merging in `compose_all`.
struct Span {
    start: usize,
    end: usize,
    delete: String,
    insert: String,
}

impl Span {
    fn flush(self, result: &mut OperationBuilder, pos: usize) -> usize {
        result.retain(self.start - pos);
        result.replace(&self.delete, &self.insert);
        self.end
    }
}
