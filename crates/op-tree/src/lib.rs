//! A persistent B-tree used to store long runs of small items (eg edit operations).
//!
//! Items live in small leaves. Every node caches the summary of everything beneath it, so prefix
//! queries ("how much stuff is there before item X", "which item contains position N") are
//! O(log n). Nodes are reference counted and never mutated once built, so trees are cheap to
//! clone and derived trees share any unmodified leaves.
//!
//! ```rust
//! use op_tree::OpTree;
//! use op_tree::testrun::TestRun;
//!
//! let tree: OpTree<TestRun> = (1..=40).map(TestRun).collect();
//! assert_eq!(tree.summary().count, 40);
//! assert_eq!(tree.summary().len, (1..=40).sum::<usize>());
//!
//! let mut cursor = tree.cursor_at_start();
//! cursor.seek_by(|s| s.len, 10);
//! assert_eq!(cursor.peek(), Some(&TestRun(5)));
//! ```

use std::fmt::Debug;
use std::ops::{AddAssign, SubAssign};
use std::sync::Arc;

use smallvec::SmallVec;

pub use cursor::Cursor;

mod cursor;
mod root;
pub mod testrun;

/// Maximum number of items stored in a single leaf.
pub const LEAF_SIZE: usize = 16;

/// Maximum number of children of an internal node.
pub const NODE_SIZE: usize = 16;

/// Items stored in the tree know how to measure themselves. The summary is a bundle of additive
/// metrics. Summaries of adjacent items are combined with `+=`, and a cursor walking backwards
/// uses `-=`.
pub trait Summarize: Clone + Debug {
    type Summary: Copy + Clone + Default + Debug + Eq + AddAssign + SubAssign;

    fn summarize(&self) -> Self::Summary;
}

/// A persistent sequence of items. Cloning is O(1).
#[derive(Clone)]
pub struct OpTree<E: Summarize> {
    root: Arc<Node<E>>,
}

#[derive(Debug)]
pub(crate) enum Node<E: Summarize> {
    Internal(NodeInternal<E>),
    Leaf(NodeLeaf<E>),
}

/// An internal node. Children are all the same height.
#[derive(Debug)]
pub(crate) struct NodeInternal<E: Summarize> {
    summary: E::Summary,
    children: SmallVec<[Arc<Node<E>>; NODE_SIZE]>,
}

/// A leaf node in the tree. Except for the root, each leaf is non-empty.
#[derive(Debug)]
pub(crate) struct NodeLeaf<E: Summarize> {
    summary: E::Summary,
    data: SmallVec<[E; LEAF_SIZE]>,
}

impl<E: Summarize> Node<E> {
    pub(crate) fn summary(&self) -> E::Summary {
        match self {
            Node::Internal(n) => n.summary,
            Node::Leaf(n) => n.summary,
        }
    }

    fn new_leaf(data: SmallVec<[E; LEAF_SIZE]>) -> Self {
        let mut summary = E::Summary::default();
        for e in &data {
            summary += e.summarize();
        }
        Node::Leaf(NodeLeaf { summary, data })
    }

    fn new_internal(children: SmallVec<[Arc<Node<E>>; NODE_SIZE]>) -> Self {
        let mut summary = E::Summary::default();
        for c in &children {
            summary += c.summary();
        }
        Node::Internal(NodeInternal { summary, children })
    }
}

/// Split `len` items into near-equal chunks so no chunk is bigger than `max`. When splitting is
/// needed at all, chunks aim for half of `max` (rounded up) so there's room to merge into them
/// later.
pub(crate) fn chunk_sizes(len: usize, max: usize) -> impl Iterator<Item = usize> {
    let num_chunks = if len <= max { 1 } else {
        let target = (max + 1) / 2;
        (len + target - 1) / target
    };
    let base = len / num_chunks;
    let extra = len % num_chunks;
    (0..num_chunks).map(move |i| if i < extra { base + 1 } else { base })
}
