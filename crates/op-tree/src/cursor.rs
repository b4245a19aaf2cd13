use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use super::*;

/// A cursor into some location in an [`OpTree`]. The cursor sits *between* items, and tracks the
/// summary of everything before it.
///
/// Cursors borrow the tree immutably, so any number of them can walk the same tree at once. A
/// cursor itself is a single-owner handle - moving it requires `&mut`.
///
/// Note when a cursor sits at the boundary between two leaves, it could either point to the end
/// of the first leaf or the start of the next one. Both are equivalent.
#[derive(Clone)]
pub struct Cursor<'a, E: Summarize> {
    tree: &'a OpTree<E>,
    /// Internal nodes from the root down to the current leaf, with the index of the child we're in.
    path: SmallVec<[(&'a NodeInternal<E>, usize); 8]>,
    leaf: &'a NodeLeaf<E>,
    idx: usize,
    prefix: E::Summary,
}

/// Walk down the leftmost (or rightmost) edge of a subtree, recording the path.
fn descend_edge<'a, E: Summarize>(mut node: &'a Node<E>, rightmost: bool, path: &mut SmallVec<[(&'a NodeInternal<E>, usize); 8]>) -> &'a NodeLeaf<E> {
    loop {
        match node {
            Node::Internal(n) => {
                let i = if rightmost { n.children.len() - 1 } else { 0 };
                path.push((n, i));
                node = n.children[i].as_ref();
            }
            Node::Leaf(l) => return l,
        }
    }
}

impl<E: Summarize> OpTree<E> {
    pub fn cursor_at_start(&self) -> Cursor<'_, E> {
        let mut path = SmallVec::new();
        let leaf = descend_edge(self.root(), false, &mut path);
        Cursor { tree: self, path, leaf, idx: 0, prefix: Default::default() }
    }

    pub fn cursor_at_end(&self) -> Cursor<'_, E> {
        let mut cursor = self.cursor_at_start();
        cursor.seek_end();
        cursor
    }

    /// Create a cursor at the first item whose cumulative `dim` extends past `target`. See
    /// [`Cursor::seek_by`].
    pub fn cursor_at_query<F: Fn(&E::Summary) -> usize>(&self, dim: F, target: usize) -> Cursor<'_, E> {
        let mut cursor = self.cursor_at_start();
        cursor.seek_by(dim, target);
        cursor
    }
}

impl<'a, E: Summarize> Cursor<'a, E> {
    /// The summary of every item before the cursor.
    pub fn prefix(&self) -> E::Summary {
        self.prefix
    }

    pub fn has_next(&self) -> bool {
        self.idx < self.leaf.data.len()
            || self.path.iter().any(|(n, i)| i + 1 < n.children.len())
    }

    pub fn has_prev(&self) -> bool {
        self.idx > 0 || self.path.iter().any(|(_, i)| *i > 0)
    }

    /// The item after the cursor, without moving.
    pub fn peek(&self) -> Option<&'a E> {
        if self.idx < self.leaf.data.len() {
            return Some(&self.leaf.data[self.idx]);
        }

        let depth = self.path.iter().rposition(|(n, i)| i + 1 < n.children.len())?;
        let (n, i) = self.path[depth];
        let mut scratch = SmallVec::new();
        descend_edge(n.children[i + 1].as_ref(), false, &mut scratch).data.first()
    }

    /// Move to the start of the next leaf. Returns false (and leaves the cursor alone) if we're in
    /// the last leaf.
    fn next_leaf(&mut self) -> bool {
        let Some(depth) = self.path.iter().rposition(|(n, i)| i + 1 < n.children.len()) else {
            return false;
        };

        self.path.truncate(depth + 1);
        self.path[depth].1 += 1;
        let (n, i) = self.path[depth];
        self.leaf = descend_edge(n.children[i].as_ref(), false, &mut self.path);
        self.idx = 0;
        true
    }

    /// Move to the end of the previous leaf.
    fn prev_leaf(&mut self) -> bool {
        let Some(depth) = self.path.iter().rposition(|(_, i)| *i > 0) else {
            return false;
        };

        self.path.truncate(depth + 1);
        self.path[depth].1 -= 1;
        let (n, i) = self.path[depth];
        self.leaf = descend_edge(n.children[i].as_ref(), true, &mut self.path);
        self.idx = self.leaf.data.len();
        true
    }

    /// Step backwards over the previous item, returning it.
    pub fn prev(&mut self) -> Option<&'a E> {
        loop {
            if self.idx > 0 {
                self.idx -= 1;
                let e = &self.leaf.data[self.idx];
                self.prefix -= e.summarize();
                return Some(e);
            }
            if !self.prev_leaf() { return None; }
        }
    }

    pub fn seek_start(&mut self) {
        self.path.clear();
        self.leaf = descend_edge(self.tree.root(), false, &mut self.path);
        self.idx = 0;
        self.prefix = Default::default();
    }

    pub fn seek_end(&mut self) {
        self.path.clear();
        self.leaf = descend_edge(self.tree.root(), true, &mut self.path);
        self.idx = self.leaf.data.len();
        self.prefix = self.tree.summary();
    }

    /// Move the cursor to just before the first item where `dim(prefix) + dim(item) > target`.
    /// That is, the item containing position `target` in the metric named by `dim`. Items which
    /// measure 0 at that position are skipped. If no item qualifies, the cursor ends up at the end.
    ///
    /// This is O(log n) in the number of items.
    pub fn seek_by<F: Fn(&E::Summary) -> usize>(&mut self, dim: F, target: usize) {
        self.path.clear();
        self.prefix = Default::default();

        let mut node = self.tree.root();
        loop {
            match node {
                Node::Internal(n) => {
                    // The last child is the fallback if the target is past the end.
                    let mut i = 0;
                    while i + 1 < n.children.len() {
                        let s = n.children[i].summary();
                        if dim(&self.prefix) + dim(&s) > target { break; }
                        self.prefix += s;
                        i += 1;
                    }
                    self.path.push((n, i));
                    node = n.children[i].as_ref();
                }
                Node::Leaf(l) => {
                    let mut i = 0;
                    while i < l.data.len() {
                        let s = l.data[i].summarize();
                        if dim(&self.prefix) + dim(&s) > target { break; }
                        self.prefix += s;
                        i += 1;
                    }
                    self.leaf = l;
                    self.idx = i;
                    return;
                }
            }
        }
    }
}

impl<'a, E: Summarize> Iterator for Cursor<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.idx < self.leaf.data.len() {
                let e = &self.leaf.data[self.idx];
                self.idx += 1;
                self.prefix += e.summarize();
                return Some(e);
            }
            if !self.next_leaf() { return None; }
        }
    }
}

impl<'a, E: Summarize> Debug for Cursor<'a, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("depth", &self.path.len())
            .field("idx", &self.idx)
            .field("prefix", &self.prefix)
            .finish()
    }
}
