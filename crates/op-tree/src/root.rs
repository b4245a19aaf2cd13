use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use smallvec::SmallVec;

use super::*;

impl<E: Summarize> OpTree<E> {
    pub fn new() -> Self {
        OpTree { root: Arc::new(Node::new_leaf(SmallVec::new())) }
    }

    /// Build a tree from a list of items. The tree is built bottom up, so this is O(n).
    pub fn from_vec(items: Vec<E>) -> Self {
        if items.is_empty() { return Self::new(); }

        let mut items = items.into_iter();
        let leaves: Vec<Arc<Node<E>>> = chunk_sizes(items.len(), LEAF_SIZE)
            .map(|size| Arc::new(Node::new_leaf(items.by_ref().take(size).collect())))
            .collect();

        Self::from_nodes(leaves)
    }

    /// Stack a list of same-height nodes into a tree.
    fn from_nodes(mut nodes: Vec<Arc<Node<E>>>) -> Self {
        loop {
            match nodes.len() {
                0 => return Self::new(),
                1 => return OpTree { root: nodes.swap_remove(0) },
                len => {
                    let mut iter = nodes.into_iter();
                    nodes = chunk_sizes(len, NODE_SIZE)
                        .map(|size| Arc::new(Node::new_internal(iter.by_ref().take(size).collect())))
                        .collect();
                }
            }
        }
    }

    /// The combined summary of every item in the tree.
    pub fn summary(&self) -> E::Summary {
        self.root.summary()
    }

    pub fn is_empty(&self) -> bool {
        match self.root.as_ref() {
            Node::Leaf(l) => l.data.is_empty(),
            Node::Internal(_) => false,
        }
    }

    pub(crate) fn root(&self) -> &Node<E> {
        &self.root
    }

    /// Make a new tree containing the items of self followed by the items of other. Both input
    /// trees are left untouched. Only the nodes along the seam are rebuilt, so this is
    /// O(log n) and everything else is shared with the result. The two leaves meeting at the seam
    /// are merged when they fit in a single leaf.
    pub fn concat(&self, other: &Self) -> Self {
        if other.is_empty() { return self.clone(); }
        if self.is_empty() { return other.clone(); }

        let nodes = join(&self.root, self.root.height(), &other.root, other.root.height());
        Self::from_nodes(nodes)
    }

    /// Iterate through all the items in the tree.
    pub fn iter(&self) -> Cursor<'_, E> {
        self.cursor_at_start()
    }

    /// Returns (internal node count, leaf count).
    pub fn count_nodes(&self) -> (usize, usize) {
        fn walk<E: Summarize>(node: &Node<E>, counts: &mut (usize, usize)) {
            match node {
                Node::Internal(n) => {
                    counts.0 += 1;
                    for c in &n.children { walk(c, counts); }
                }
                Node::Leaf(_) => counts.1 += 1,
            }
        }
        let mut counts = (0, 0);
        walk(&self.root, &mut counts);
        counts
    }

    /// Check the structural invariants of the tree. Panics if something is wrong.
    pub fn check(&self) {
        // Returns the height of the subtree.
        fn check_node<E: Summarize>(node: &Node<E>, is_root: bool) -> usize {
            match node {
                Node::Internal(n) => {
                    assert!(!n.children.is_empty(), "Internal node with no children");
                    assert!(n.children.len() <= NODE_SIZE);
                    assert!(n.children.len() >= 2, "Internal node with a single child");

                    let mut summary = E::Summary::default();
                    let mut height = None;
                    for c in &n.children {
                        summary += c.summary();
                        let h = check_node(c, false);
                        if let Some(height) = height {
                            assert_eq!(height, h, "Unbalanced tree");
                        }
                        height = Some(h);
                    }
                    assert_eq!(summary, n.summary, "Internal summary is stale");
                    height.unwrap_or(0) + 1
                }
                Node::Leaf(l) => {
                    assert!(l.data.len() <= LEAF_SIZE);
                    assert!(is_root || !l.data.is_empty(), "Empty non-root leaf");

                    let mut summary = E::Summary::default();
                    for e in &l.data { summary += e.summarize(); }
                    assert_eq!(summary, l.summary, "Leaf summary is stale");
                    0
                }
            }
        }

        check_node(&self.root, true);
    }
}

impl<E: Summarize> Node<E> {
    fn height(&self) -> usize {
        let mut node = self;
        let mut height = 0;
        while let Node::Internal(n) = node {
            node = &n.children[0];
            height += 1;
        }
        height
    }

    fn internal(&self) -> &NodeInternal<E> {
        match self {
            Node::Internal(n) => n,
            Node::Leaf(_) => unreachable!("Expected an internal node"),
        }
    }
}

/// Join two non-empty subtrees of height `ha` and `hb`. Returns one or more nodes with the height
/// of the taller input.
fn join<E: Summarize>(a: &Arc<Node<E>>, ha: usize, b: &Arc<Node<E>>, hb: usize) -> Vec<Arc<Node<E>>> {
    if ha > hb {
        let children = &a.internal().children;
        let last = children.len() - 1;
        let mut nodes: Vec<_> = children[..last].to_vec();
        nodes.extend(join(&children[last], ha - 1, b, hb));
        group_children(nodes)
    } else if ha < hb {
        let children = &b.internal().children;
        let mut nodes = join(a, ha, &children[0], hb - 1);
        nodes.extend_from_slice(&children[1..]);
        group_children(nodes)
    } else if ha > 0 {
        let (left, right) = (&a.internal().children, &b.internal().children);
        let last = left.len() - 1;
        let mut nodes: Vec<_> = left[..last].to_vec();
        nodes.extend(join(&left[last], ha - 1, &right[0], hb - 1));
        nodes.extend_from_slice(&right[1..]);
        group_children(nodes)
    } else {
        match (a.as_ref(), b.as_ref()) {
            (Node::Leaf(la), Node::Leaf(lb)) if la.data.len() + lb.data.len() <= LEAF_SIZE => {
                vec![Arc::new(Node::new_leaf(la.data.iter().chain(lb.data.iter()).cloned().collect()))]
            }
            _ => vec![a.clone(), b.clone()],
        }
    }
}

/// Wrap same-height nodes in as few parents as fit.
fn group_children<E: Summarize>(nodes: Vec<Arc<Node<E>>>) -> Vec<Arc<Node<E>>> {
    let mut iter = nodes.into_iter();
    chunk_sizes(iter.len(), NODE_SIZE)
        .map(|size| Arc::new(Node::new_internal(iter.by_ref().take(size).collect())))
        .collect()
}

impl<E: Summarize> Default for OpTree<E> {
    fn default() -> Self { Self::new() }
}

impl<E: Summarize> FromIterator<E> for OpTree<E> {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, E: Summarize> IntoIterator for &'a OpTree<E> {
    type Item = &'a E;
    type IntoIter = Cursor<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E: Summarize> Debug for OpTree<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
