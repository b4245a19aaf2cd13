use crate::chunk::Chunk;
use crate::op::Op;
use crate::Operation;
use crate::span::AppendRle;

/// Incrementally builds an [`Operation`] from left to right. Adjacent retains and adjacent
/// replaces are merged as they're pushed, and empty ops are dropped, so the result is always
/// soft-normalized.
#[derive(Debug, Clone, Default)]
pub struct OperationBuilder {
    ops: Vec<Op>,
}

impl OperationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Op) {
        if !op.is_noop() {
            self.ops.push_rle(op);
        }
    }

    pub fn retain(&mut self, len: usize) {
        if len > 0 { self.ops.push_rle(Op::Retain(len)); }
    }

    pub fn replace(&mut self, delete: &str, insert: &str) {
        if !delete.is_empty() || !insert.is_empty() {
            self.ops.push_rle(Op::replace(delete, insert));
        }
    }

    pub fn insert(&mut self, text: &str) {
        self.replace("", text);
    }

    pub fn delete(&mut self, text: &str) {
        self.replace(text, "");
    }

    pub(crate) fn push_chunk(&mut self, chunk: Chunk<'_>) {
        match chunk {
            Chunk::Retain(len) => self.retain(len),
            Chunk::Delete(s) => self.delete(s),
            Chunk::Insert(s) => self.insert(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Build an operation with no ops as the universal [`Operation::empty`].
    pub fn build(self) -> Operation {
        Operation::from_ops(self.ops)
    }

    /// Build an operation over a document of `len` chars. With nothing pushed this gives
    /// `identity(len)`, so a zero length document still gets a length-0 operation.
    pub fn build_sized(self, len: usize) -> Operation {
        if self.ops.is_empty() { Operation::identity(len) } else { self.build() }
    }
}

impl Extend<Op> for OperationBuilder {
    fn extend<T: IntoIterator<Item = Op>>(&mut self, iter: T) {
        for op in iter {
            self.push(op);
        }
    }
}
