//! B-tree implementation.

use crate::check::Walk;
use crate::node::{Node, NodeId, MIN_KEYS};
use crate::stats::TreeStats;
use crate::traits::{IndexError, Layout, OrderedIndex};
use alloc::vec::Vec;

/// A B-tree of order 5 with values co-located with keys at every level.
#[derive(Debug, Clone)]
pub struct BTree<K, V> {
    /// Arena of all nodes.
    arena: Vec<Node<K, V>>,
    /// Root node ID. `None` until the first insertion.
    root: Option<NodeId>,
    /// Number of stored entries.
    len: usize,
}

impl<K: Ord + Clone, V: Clone> Default for BTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> BTree<K, V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            root: None,
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

    /// Inserts a key-value pair.
    ///
    /// The first insertion creates a single leaf. When the root overflows, a
    /// new root is put above it and the old root is split beneath it, so the
    /// tree only ever grows in height at the top.
    pub fn insert(&mut self, key: K, value: V) {
        match self.root {
            None => {
                let mut leaf = Node::new_leaf();
                leaf.insert_entry(0, key, value);
                self.root = Some(Self::alloc_node(&mut self.arena, leaf));
            }
            Some(root) => {
                self.insert_into(root, key, value);
                if self.arena[root].is_overflowing() {
                    let mut new_root = Node::new_internal(true);
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
        if node.is_leaf {
            // Duplicates go after the keys they equal.
            let pos = node.upper_bound(&key);
            self.arena[node_id].insert_entry(pos, key, value);
            return;
        }

        let pos = node.lower_bound(&key);
        let child = node.children[pos];
        self.insert_into(child, key, value);
        if self.arena[child].is_overflowing() {
            self.split_child(node_id, pos);
        }
    }

    /// Splits the overflowing child at `index` of `parent_id`.
    ///
    /// The child keeps its lower `MIN_KEYS` entries, the new sibling receives
    /// the upper `MIN_KEYS` entries (and the matching children), and the entry
    /// at `MIN_KEYS` moves up into the parent together with its value.
    fn split_child(&mut self, parent_id: NodeId, index: usize) {
        let child_id = self.arena[parent_id].children[index];
        let child = &mut self.arena[child_id];
        debug_assert!(child.is_overflowing());

        let mut sibling = if child.is_leaf {
            Node::new_leaf()
        } else {
            Node::new_internal(true)
        };
        sibling.keys = child.keys.split_off(MIN_KEYS + 1);
        sibling.values = child.values.split_off(MIN_KEYS + 1);
        if !child.is_leaf {
            sibling.children = child.children.split_off(MIN_KEYS + 1);
        }
        let median_key = child.keys.remove(MIN_KEYS);
        let median_value = child.values.remove(MIN_KEYS);

        let sibling_id = Self::alloc_node(&mut self.arena, sibling);
        let parent = &mut self.arena[parent_id];
        parent.keys.insert(index, median_key);
        parent.values.insert(index, median_value);
        parent.children.insert(index + 1, sibling_id);
    }

    /// Returns a value stored under `key`.
    ///
    /// With duplicate keys, whichever matching entry sits highest in the tree
    /// is returned.
    pub fn search(&self, key: &K) -> Option<&V> {
        let mut current = self.root?;
        loop {
            let node = &self.arena[current];
            let pos = node.lower_bound(key);
            if pos < node.key_count() && node.keys[pos] == *key {
                return Some(&node.values[pos]);
            }
            if node.is_leaf {
                return None;
            }
            current = node.children[pos];
        }
    }

    /// Returns every value with a key in `[low, high]`, in ascending key order.
    pub fn range_query(&self, low: &K, high: &K) -> Vec<V> {
        let mut result = Vec::new();
        if let Some(root) = self.root {
            if low <= high {
                self.collect_range(root, low, high, &mut result);
            }
        }
        result
    }

    /// In-order walk restricted to the subtrees whose key interval meets
    /// `[low, high]`.
    fn collect_range(&self, node_id: NodeId, low: &K, high: &K, result: &mut Vec<V>) {
        let node = &self.arena[node_id];
        let start = node.lower_bound(low);
        let end = node.upper_bound(high);

        // Child i covers [keys[i-1], keys[i]], so only children start..=end can
        // hold matches.
        for i in start..end {
            if !node.is_leaf {
                self.collect_range(node.children[i], low, high, result);
            }
            result.push(node.values[i].clone());
        }
        if !node.is_leaf {
            self.collect_range(node.children[end], low, high, result);
        }
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

    /// Verifies node occupancy, child counts, key order and separator bounds.
    pub fn check_invariants(&self) -> Result<(), IndexError> {
        let found = match self.root {
            Some(root) => Walk::new(&self.arena, true).run(root)?,
            None => 0,
        };
        if found != self.len {
            return Err(IndexError::LengthMismatch {
                expected: self.len,
                found,
            });
        }
        Ok(())
    }
}

impl<K: Ord + Clone, V: Clone> OrderedIndex<K, V> for BTree<K, V> {
    fn insert(&mut self, key: K, value: V) {
        BTree::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        BTree::search(self, key)
    }

    fn range_query(&self, low: &K, high: &K) -> Vec<V> {
        BTree::range_query(self, low, high)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn layout(&self) -> Layout {
        Layout::BTree
    }

    fn stats(&self) -> TreeStats {
        BTree::stats(self)
    }

    fn approx_bytes(&self) -> usize {
        BTree::approx_bytes(self)
    }

    fn check_invariants(&self) -> Result<(), IndexError> {
        BTree::check_invariants(self)
    }
}
