//! Leaf chain iterator for the B+-tree.

use crate::node::{Node, NodeId};

/// Iterator over `(key, value)` pairs following the leaf chain.
///
/// Starts at a given leaf and position and stops after `upper` (inclusive),
/// or at the end of the chain when no upper bound is set.
pub struct LeafIter<'a, K, V> {
    /// Reference to the arena of nodes.
    arena: &'a [Node<K, V>],
    /// Current leaf ID.
    current_node: Option<NodeId>,
    /// Current position within the leaf.
    current_pos: usize,
    /// Inclusive upper bound on keys.
    upper: Option<&'a K>,
}

impl<'a, K: Ord, V> LeafIter<'a, K, V> {
    /// Creates an iterator starting at `pos` in `start_node`.
    pub(crate) fn new(
        arena: &'a [Node<K, V>],
        start_node: Option<NodeId>,
        pos: usize,
        upper: Option<&'a K>,
    ) -> Self {
        Self {
            arena,
            current_node: start_node,
            current_pos: pos,
            upper,
        }
    }

    /// Creates an iterator that yields nothing.
    pub(crate) fn empty(arena: &'a [Node<K, V>]) -> Self {
        Self::new(arena, None, 0, None)
    }
}

impl<'a, K: Ord, V> Iterator for LeafIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        loop {
            let node = &arena[self.current_node?];

            if self.current_pos >= node.key_count() {
                self.current_node = node.next;
                self.current_pos = 0;
                continue;
            }

            let key = &node.keys[self.current_pos];
            if self.upper.is_some_and(|upper| key > upper) {
                self.current_node = None;
                return None;
            }

            let value = &node.values[self.current_pos];
            self.current_pos += 1;
            return Some((key, value));
        }
    }
}
