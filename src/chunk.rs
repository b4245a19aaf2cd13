//! Walking an operation one piece at a time.
//!
//! The algebra functions all need to step through two operations in lockstep, consuming a bit of
//! one and then a bit of the other. That's awkward with ops, because one op might need to be
//! split across several ops of the other operation. A [`ChunkIter`] hands out [`Chunk`]s instead,
//! split to whatever size the caller asks for.

use op_tree::Cursor;

use crate::op::Op;
use crate::unicount::{count_chars, split_at_char};
use crate::Operation;

/// Which document we're measuring chunks against - the one before the operation was applied, or
/// the one after.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Context { Pre, Post }

/// A piece of an op. Each `Replace` is yielded as a delete and an insert. The part with zero
/// length in the iterator's context comes first, so in the `Pre` context inserts come before
/// deletes and in `Post` deletes come before inserts.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Chunk<'a> {
    Retain(usize),
    Delete(&'a str),
    Insert(&'a str),
}

impl<'a> Chunk<'a> {
    pub(crate) fn len(&self, ctx: Context) -> usize {
        match (self, ctx) {
            (Chunk::Retain(len), _) => *len,
            (Chunk::Delete(s), Context::Pre) | (Chunk::Insert(s), Context::Post) => count_chars(s),
            (Chunk::Delete(_), Context::Post) | (Chunk::Insert(_), Context::Pre) => 0,
        }
    }

    /// Split off the first `at` chars (measured in `ctx`), returning (head, tail).
    fn split(self, at: usize, ctx: Context) -> (Self, Self) {
        match (self, ctx) {
            (Chunk::Retain(len), _) => (Chunk::Retain(at), Chunk::Retain(len - at)),
            (Chunk::Delete(s), Context::Pre) => {
                let (a, b) = split_at_char(s, at);
                (Chunk::Delete(a), Chunk::Delete(b))
            }
            (Chunk::Insert(s), Context::Post) => {
                let (a, b) = split_at_char(s, at);
                (Chunk::Insert(a), Chunk::Insert(b))
            }
            _ => unreachable!("Cannot split a zero length chunk"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ChunkIter<'a> {
    ops: Cursor<'a, Op>,
    ctx: Context,
    current: Option<Chunk<'a>>,
    queued: Option<Chunk<'a>>,
}

impl<'a> ChunkIter<'a> {
    pub(crate) fn new(op: &'a Operation, ctx: Context) -> Self {
        Self { ops: op.ops().into_inner(), ctx, current: None, queued: None }
    }

    fn fill(&mut self) -> Option<Chunk<'a>> {
        while self.current.is_none() {
            if let Some(c) = self.queued.take() {
                self.current = Some(c);
                break;
            }

            match self.ops.next()? {
                Op::Retain(0) => {}
                Op::Retain(len) => self.current = Some(Chunk::Retain(*len)),
                Op::Replace { delete, insert } => {
                    let del = (!delete.is_empty()).then_some(Chunk::Delete(delete.as_str()));
                    let ins = (!insert.is_empty()).then_some(Chunk::Insert(insert.as_str()));
                    let (first, second) = match self.ctx {
                        Context::Pre => (ins, del),
                        Context::Post => (del, ins),
                    };
                    self.current = first.or(second);
                    if first.is_some() { self.queued = second; }
                }
            }
        }
        self.current
    }

    /// The next chunk, without consuming it.
    pub(crate) fn peek(&mut self) -> Option<Chunk<'a>> {
        self.fill()
    }

    /// Take the next chunk, limited to at most `max` chars in this iterator's context. Chunks of
    /// zero length are always returned whole.
    pub(crate) fn take(&mut self, max: usize) -> Option<Chunk<'a>> {
        let c = self.fill()?;
        if c.len(self.ctx) <= max {
            self.current = None;
            Some(c)
        } else {
            let (head, tail) = c.split(max, self.ctx);
            self.current = Some(tail);
            Some(head)
        }
    }

    /// Take the next chunk if it has zero length in this context.
    pub(crate) fn take_zero_len(&mut self) -> Option<Chunk<'a>> {
        let c = self.fill()?;
        if c.len(self.ctx) == 0 {
            self.current = None;
            Some(c)
        } else { None }
    }

    pub(crate) fn next_whole(&mut self) -> Option<Chunk<'a>> {
        self.take(usize::MAX)
    }
}
