//! B+-tree implementation.

use super::iter::LeafIter;
use crate::check::Walk;
use crate::node::{Node, NodeId, MIN_KEYS};
use crate::stats::TreeStats;
use crate::traits::{IndexError, Layout, OrderedIndex};
use alloc::vec::Vec;

/// A B+-tree of order 5.
///
/// Values live only in the leaves, and the leaves form a singly linked chain
/// in ascending key order. A leaf split copies the first key of the new leaf
/// into the parent as separator; the key stays in the leaf as well, so every
/// key present in an internal node also appears in exactly the leaf that
/// starts its right subtree.
#[derive(Debug, Clone)]
pub struct BPlusTree<K, V> {
    /// Arena of all nodes.
    arena: Vec<Node<K, V>>,
    /// Root node ID. `None` until the first insertion.
    root: Option<NodeId>,
    /// Leftmost leaf, head of the leaf chain.
    head: Option<NodeId>,
    /// Number of stored entries.
    len: usize,
}

impl<K: Ord + Clone, V: Clone> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> BPlusTree<K, V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            root: None,
            head: None,
            len: 0,
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocates a new node in the arena and returns its ID.
    fn alloc_node(arena: &mut Vec<Node<K, V>>, node: Node<K, V>) -> NodeId {
        let id = arena.len();
        arena.push(node);
        id
    }

    /// Finds the leaf to descend to for `key`.
    ///
    /// With `leftmost` set, keys equal to a separator are routed left, which
    /// lands on the first leaf that may hold `key`; otherwise they are routed
    /// right, into the subtree the separator was copied from.
    fn find_leaf(&self, key: &K, leftmost: bool) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            let node = &self.arena[current];
            if node.is_leaf {
                return Some(current);
            }
            let pos = if leftmost {
                node.lower_bound(key)
            } else {
                node.upper_bound(key)
            };
            current = node.children[pos];
        }
    }

    /// Inserts a key-value pair.
    ///
    /// The first insertion creates a single leaf which is also the head of the
    /// leaf chain. When the root overflows, a new root is put above it and the
    /// old root is split beneath it.
    pub fn insert(&mut self, key: K, value: V) {
        match self.root {
            None => {
                let mut leaf = Node::new_leaf();
                leaf.insert_entry(0, key, value);
                let leaf = Self::alloc_node(&mut self.arena, leaf);
                self.root = Some(leaf);
                self.head = Some(leaf);
            }
            Some(root) => {
                self.insert_into(root, key, value);
                if self.arena[root].is_overflowing() {
                    let mut new_root = Node::new_internal(false);
                    new_root.children.push(root);
                    let new_root = Self::alloc_node(&mut self.arena, new_root);
                    self.split_child(new_root, 0);
                    self.root = Some(new_root);
                }
            }
        }
        self.len += 1;
    }

    /// Inserts below `node_id`, splitting the child it descended into if that
    /// child overflowed.
    fn insert_into(&mut self, node_id: NodeId, key: K, value: V) {
        let node = &self.arena[node_id];
        let pos = node.upper_bound(&key);
        if node.is_leaf {
            self.arena[node_id].insert_entry(pos, key, value);
            return;
        }

        let child = node.children[pos];
        self.insert_into(child, key, value);
        if self.arena[child].is_overflowing() {
            self.split_child(node_id, pos);
        }
    }

    /// Splits the overflowing child at `index` of `parent_id`.
    fn split_child(&mut self, parent_id: NodeId, index: usize) {
        let child_id = self.arena[parent_id].children[index];
        let (separator, sibling_id) = if self.arena[child_id].is_leaf {
            self.split_leaf(child_id)
        } else {
            self.split_internal(child_id)
        };

        let parent = &mut self.arena[parent_id];
        parent.keys.insert(index, separator);
        parent.children.insert(index + 1, sibling_id);
    }

    /// Moves the upper entries of a leaf into a new leaf linked right after it.
    /// Returns the separator (copied, not moved) and the new leaf.
    fn split_leaf(&mut self, leaf_id: NodeId) -> (K, NodeId) {
        let leaf = &mut self.arena[leaf_id];
        debug_assert!(leaf.is_overflowing());

        let mut sibling = Node::new_leaf();
        sibling.keys = leaf.keys.split_off(MIN_KEYS);
        sibling.values = leaf.values.split_off(MIN_KEYS);
        // The new leaf takes over the old successor before the old leaf is
        // pointed at it, so the chain is whole at every step.
        sibling.next = leaf.next;
        let separator = sibling.keys[0].clone();

        let sibling_id = Self::alloc_node(&mut self.arena, sibling);
        self.arena[leaf_id].next = Some(sibling_id);
        (separator, sibling_id)
    }

    /// Moves the upper keys and children of an internal node into a new node.
    /// The middle key is removed and returned as separator.
    fn split_internal(&mut self, node_id: NodeId) -> (K, NodeId) {
        let node = &mut self.arena[node_id];
        debug_assert!(node.is_overflowing());

        let mut sibling = Node::new_internal(false);
        sibling.keys = node.keys.split_off(MIN_KEYS + 1);
        sibling.children = node.children.split_off(MIN_KEYS + 1);
        let separator = node.keys.remove(MIN_KEYS);

        (separator, Self::alloc_node(&mut self.arena, sibling))
    }

    /// Returns a value stored under `key`.
    pub fn search(&self, key: &K) -> Option<&V> {
        let leaf = &self.arena[self.find_leaf(key, false)?];
        leaf.keys
            .iter()
            .position(|k| k == key)
            .map(|pos| &leaf.values[pos])
    }

    /// Iterates over the entries with keys in `[low, high]`, in key order.
    ///
    /// Descends once to the first leaf that may hold `low`, then follows the
    /// leaf chain until a key exceeds `high`.
    pub fn range<'a>(&'a self, low: &K, high: &'a K) -> LeafIter<'a, K, V> {
        if low > high {
            return LeafIter::empty(&self.arena);
        }
        match self.find_leaf(low, true) {
            Some(leaf) => {
                let pos = self.arena[leaf].lower_bound(low);
                LeafIter::new(&self.arena, Some(leaf), pos, Some(high))
            }
            None => LeafIter::empty(&self.arena),
        }
    }

    /// Returns every value with a key in `[low, high]`, in ascending key order.
    pub fn range_query(&self, low: &K, high: &K) -> Vec<V> {
        self.range(low, high).map(|(_, v)| v.clone()).collect()
    }

    /// Iterates over all entries in key order along the leaf chain.
    pub fn iter(&self) -> LeafIter<'_, K, V> {
        LeafIter::new(&self.arena, self.head, 0, None)
    }

    /// Returns the keys of every leaf, following the leaf chain.
    pub fn leaf_chain(&self) -> Vec<Vec<K>> {
        let mut chain = Vec::new();
        let mut current = self.head;
        while let Some(id) = current {
            let leaf = &self.arena[id];
            chain.push(leaf.keys.clone());
            current = leaf.next;
        }
        chain
    }

    /// Returns the keys of the root node (empty for an empty tree).
    pub fn root_keys(&self) -> &[K] {
        match self.root {
            Some(root) => &self.arena[root].keys,
            None => &[],
        }
    }

    /// Returns shape statistics.
    pub fn stats(&self) -> TreeStats {
        TreeStats::collect(&self.arena, self.root, self.len)
    }

    /// Approximate memory held by the nodes, in bytes.
    pub fn approx_bytes(&self) -> usize {
        self.arena.iter().map(Node::footprint).sum()
    }

    /// Verifies node occupancy, child counts, key order, separator bounds and
    /// the leaf chain.
    pub fn check_invariants(&self) -> Result<(), IndexError> {
        let Some(root) = self.root else {
            return match (self.head, self.len) {
                (None, 0) => Ok(()),
                (Some(head), _) => Err(IndexError::BrokenLeafChain { node: head }),
                (None, len) => Err(IndexError::LengthMismatch { expected: len, found: 0 }),
            };
        };

        let mut walk = Walk::new(&self.arena, false);
        let found = walk.run(root)?;
        if found != self.len {
            return Err(IndexError::LengthMismatch {
                expected: self.len,
                found,
            });
        }

        // The chain must visit exactly the leaves of the tree, left to right,
        // and end after the last one.
        let mut current = self.head;
        let mut previous_last: Option<&K> = None;
        for &expected in &walk.leaves {
            let Some(id) = current else {
                return Err(IndexError::BrokenLeafChain { node: expected });
            };
            if id != expected {
                return Err(IndexError::BrokenLeafChain { node: id });
            }
            let leaf = &self.arena[id];
            if previous_last.is_some_and(|last| leaf.keys[0] < *last) {
                return Err(IndexError::BrokenLeafChain { node: id });
            }
            previous_last = leaf.keys.last();
            current = leaf.next;
        }
        match current {
            Some(extra) => Err(IndexError::BrokenLeafChain { node: extra }),
            None => Ok(()),
        }
    }
}

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> for BPlusTree<K, V> {
    fn insert(&mut self, key: K, value: V) {
        BPlusTree::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        BPlusTree::search(self, key)
    }

    fn range_query(&self, low: &K, high: &K) -> Vec<V> {
        BPlusTree::range_query(self, low, high)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn layout(&self) -> Layout {
        Layout::BPlusTree
    }

    fn stats(&self) -> TreeStats {
        BPlusTree::stats(self)
    }

    fn approx_bytes(&self) -> usize {
        BPlusTree::approx_bytes(self)
    }

    fn check_invariants(&self) -> Result<(), IndexError> {
        BPlusTree::check_invariants(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn build(keys: &[i32]) -> BPlusTree<i32, u32> {
        let mut tree = BPlusTree::new();
        for (i, &k) in keys.iter().enumerate() {
            tree.insert(k, i as u32);
            tree.check_invariants().unwrap();
        }
        tree
    }

    fn keys_of(tree: &BPlusTree<i32, u32>) -> Vec<i32> {
        tree.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_bplus_new() {
        let tree: BPlusTree<i32, u32> = BPlusTree::new();
        assert!(tree.is_empty());
        assert!(tree.leaf_chain().is_empty());
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let tree: BPlusTree<i32, u32> = BPlusTree::new();
        assert_eq!(tree.search(&5), None);
        assert!(tree.range_query(&i32::MIN, &i32::MAX).is_empty());
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn test_single_leaf_root() {
        let tree = build(&[4, 2, 3, 1]);
        assert_eq!(tree.stats().height, 1);
        assert_eq!(tree.leaf_chain(), vec![vec![1, 2, 3, 4]]);
        assert_eq!(tree.search(&3), Some(&2));
    }

    #[test]
    fn test_separator_stays_in_leaf() {
        let tree = build(&[1, 2, 3, 4, 5]);
        // Overflowing leaf [1..=5] splits 2 / 3; the first key of the new leaf
        // is copied up and kept in the leaf.
        assert_eq!(tree.root_keys(), [3]);
        assert_eq!(tree.leaf_chain(), vec![vec![1, 2], vec![3, 4, 5]]);
        assert_eq!(tree.search(&3), Some(&2));
        assert_eq!(tree.range_query(&3, &3), vec![2]);
    }

    #[test]
    fn test_internal_split_moves_separator_up() {
        let keys: Vec<i32> = (1..=20).collect();
        let tree = build(&keys);
        let stats = tree.stats();
        assert_eq!(stats.height, 3);

        // Every internal key is the first key of some leaf and appears exactly
        // once among all internal nodes.
        let leaf_heads: Vec<i32> = tree.leaf_chain().iter().map(|leaf| leaf[0]).collect();
        let mut internal_keys: Vec<i32> = tree
            .arena
            .iter()
            .filter(|node| !node.is_leaf)
            .flat_map(|node| node.keys.iter().copied())
            .collect();
        internal_keys.sort();
        assert_eq!(internal_keys, leaf_heads[1..].to_vec());
    }

    #[test]
    fn test_reference_sequence() {
        let keys = [10, 20, 5, 6, 12, 30, 7, 17];
        let tree = build(&keys);

        assert_eq!(tree.search(&6), Some(&3));
        let values = tree.range_query(&6, &17);
        let found: Vec<i32> = values.iter().map(|&i| keys[i as usize]).collect();
        assert_eq!(found, vec![6, 7, 10, 12, 17]);
    }

    #[test]
    fn test_search_missing() {
        let tree = build(&[10, 20, 5, 6, 12, 30, 7, 17]);
        assert_eq!(tree.search(&8), None);
        assert_eq!(tree.search(&100), None);
    }

    #[test]
    fn test_range_walks_leaf_chain() {
        let keys: Vec<i32> = (0..100).map(|k| k * 2).collect();
        let tree = build(&keys);

        let found: Vec<i32> = tree.range(&15, &41).map(|(k, _)| *k).collect();
        assert_eq!(found, vec![16, 18, 20, 22, 24, 26, 28, 30, 32, 34, 36, 38, 40]);
        assert!(tree.range_query(&199, &1_000).is_empty());
        assert!(tree.range_query(&-10, &-1).is_empty());
        assert!(tree.range_query(&40, &30).is_empty());
    }

    #[test]
    fn test_leaf_chain_sorted_after_random_inserts() {
        let keys: Vec<i32> = (0..400).map(|k| (k * 7919) % 1009).collect();
        let tree = build(&keys);

        let chained: Vec<i32> = tree.leaf_chain().into_iter().flatten().collect();
        let mut expected = keys.clone();
        expected.sort();
        assert_eq!(chained, expected);
        assert_eq!(keys_of(&tree), expected);
    }

    #[test]
    fn test_duplicates_across_leaves() {
        let mut tree = BPlusTree::new();
        for i in 0..25u32 {
            tree.insert(5, i);
        }
        tree.insert(4, 100);
        tree.insert(6, 200);
        tree.check_invariants().unwrap();

        assert_eq!(tree.range_query(&5, &5).len(), 25);
        assert_eq!(tree.range_query(&4, &6).len(), 27);
        assert!(tree.search(&5).is_some_and(|&v| v < 25));
        assert_eq!(tree.search(&4), Some(&100));
        assert_eq!(tree.search(&6), Some(&200));
    }

    #[test]
    fn test_duplicate_keys_sequence() {
        let keys: Vec<i32> = (0..300).map(|k| k % 13).collect();
        let tree = build(&keys);
        for k in 0..13 {
            let expected = keys.iter().filter(|&&x| x == k).count();
            assert_eq!(tree.range_query(&k, &k).len(), expected);
            assert!(tree.search(&k).is_some());
        }
    }

    #[test]
    fn test_large_reverse() {
        let keys: Vec<i32> = (0..1_000).rev().collect();
        let tree = build(&keys);
        assert_eq!(keys_of(&tree), (0..1_000).collect::<Vec<_>>());
        assert_eq!(tree.range_query(&250, &259).len(), 10);
    }

    #[test]
    fn test_broken_chain_is_detected() {
        let mut tree = build(&(0..30).collect::<Vec<_>>());
        let head = tree.head.unwrap();
        let second = tree.arena[head].next.unwrap();
        tree.arena[head].next = tree.arena[second].next;
        assert_eq!(
            tree.check_invariants(),
            Err(IndexError::BrokenLeafChain { node: tree.arena[second].next.unwrap() })
        );
    }
}
