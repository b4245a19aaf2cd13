use crate::builder::OperationBuilder;
use crate::chunk::{Chunk, ChunkIter, Context};
use crate::error::OpError;
use crate::points::Sticky;
use crate::unicount::split_at_char;
use crate::Operation;

impl Operation {
    /// Transform this operation by `other`, a concurrent operation made against the same
    /// document. The result has the same intent as `self`, but applies to the document after
    /// `other` has been applied.
    ///
    /// When both operations insert at the same location, `direction` decides the order. With
    /// [`Sticky::Left`] text inserted by `self` ends up before text inserted by `other`. With
    /// [`Sticky::Right`] it ends up after.
    ///
    /// Text inserted by `other` inside a region deleted by `self` is kept. Text deleted by both
    /// operations is only deleted once.
    ///
    /// This satisfies TP1:
    /// `a.compose(&b.transform(&a, Right)) == b.compose(&a.transform(&b, Left))`.
    pub fn transform(&self, other: &Operation, direction: Sticky) -> Operation {
        self.try_transform(other, direction).unwrap_or_else(|e| panic!("Cannot transform {self} by {other}: {e}"))
    }

    pub fn try_transform(&self, other: &Operation, direction: Sticky) -> Result<Operation, OpError> {
        tracing::trace!(target: "editlog::transform", op_size = self.size(), other_size = other.size(), ?direction, "transform");

        if self.is_empty() || other.is_empty() { return Ok(self.clone()); }

        let (expected, actual) = (other.len_before(), self.len_before());
        if expected != actual {
            tracing::debug!(target: "editlog::transform", expected, actual, "transform length mismatch");
            return Err(OpError::LengthMismatch { expected, actual });
        }

        let mut result = OperationBuilder::new();
        let mut iter = ChunkIter::new(self, Context::Pre);
        let mut other_iter = ChunkIter::new(other, Context::Pre);
        // Position in the original document.
        let mut pos = 0;

        while let Some(c) = other_iter.next_whole() {
            match c {
                Chunk::Retain(mut len) => { // Copy our chunks to the output.
                    while len > 0 {
                        let chunk = iter.take(len).ok_or(OpError::LengthMismatch { expected, actual })?;
                        len -= chunk.len(Context::Pre);
                        pos += chunk.len(Context::Pre);
                        result.push_chunk(chunk);
                    }
                }

                Chunk::Delete(mut del) => {
                    let mut len = c.len(Context::Pre);
                    while len > 0 {
                        let chunk = iter.take(len).ok_or(OpError::LengthMismatch { expected, actual })?;
                        let chunk_len = chunk.len(Context::Pre);
                        let (theirs, rest) = split_at_char(del, chunk_len);
                        match chunk {
                            // Already gone.
                            Chunk::Retain(_) => {}
                            Chunk::Delete(ours) => {
                                if ours != theirs {
                                    tracing::debug!(target: "editlog::transform", pos, ours, theirs, "transform deletes disagree");
                                    return Err(OpError::TextMismatch {
                                        offset: pos, expected: theirs.to_string(), actual: ours.to_string()
                                    });
                                }
                            }
                            Chunk::Insert(s) => result.insert(s),
                        }
                        len -= chunk_len;
                        pos += chunk_len;
                        del = rest;
                    }
                }

                Chunk::Insert(_) => {
                    // Our inserts at this location go first.
                    if direction == Sticky::Left {
                        while let Some(chunk) = iter.take_zero_len() {
                            result.push_chunk(chunk);
                        }
                    }

                    // Skip over the text other inserted.
                    result.retain(c.len(Context::Post));
                }
            }
        }

        // Any inserts at the end of the document.
        while let Some(chunk) = iter.next_whole() {
            result.push_chunk(chunk);
        }

        Ok(result.build_sized(other.len_after()))
    }
}
