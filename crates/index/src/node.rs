//! Tree node shared by the B-tree and the B+-tree.

use alloc::vec::Vec;
use core::mem::size_of;

/// Node identifier in a tree arena.
pub type NodeId = usize;

/// Maximum number of children of an internal node.
pub const ORDER: usize = 5;

/// Maximum number of keys a node holds between insertions.
pub const MAX_KEYS: usize = ORDER - 1;

/// Minimum number of keys of every node except the root.
pub const MIN_KEYS: usize = MAX_KEYS / 2;

/// A node in a tree arena.
///
/// The same layout backs both trees:
///
/// - B-tree: `values` runs parallel to `keys` at every level.
/// - B+-tree internal node: `values` is empty, `children` routes.
/// - B+-tree leaf: `values` runs parallel to `keys`, `next` links the
///   following leaf.
///
/// A node may hold `MAX_KEYS + 1` keys only while an insertion is in flight;
/// the owning tree splits it before the insertion returns.
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    /// Keys in non-decreasing order.
    pub keys: Vec<K>,
    /// Values associated with each key (see the type docs for when it is used).
    pub values: Vec<V>,
    /// Child node IDs. Empty for leaf nodes.
    pub children: Vec<NodeId>,
    /// Next leaf in key order. B+-tree leaves only.
    pub next: Option<NodeId>,
    /// Whether this is a leaf node.
    pub is_leaf: bool,
}

impl<K: Ord, V> Node<K, V> {
    /// Creates a new leaf node.
    pub fn new_leaf() -> Self {
        Self {
            keys: Vec::with_capacity(MAX_KEYS + 1),
            values: Vec::with_capacity(MAX_KEYS + 1),
            children: Vec::new(),
            next: None,
            is_leaf: true,
        }
    }

    /// Creates a new internal node. `with_values` reserves room for values
    /// co-located with the keys (B-tree layout).
    pub fn new_internal(with_values: bool) -> Self {
        Self {
            keys: Vec::with_capacity(MAX_KEYS + 1),
            values: if with_values {
                Vec::with_capacity(MAX_KEYS + 1)
            } else {
                Vec::new()
            },
            children: Vec::with_capacity(ORDER + 1),
            next: None,
            is_leaf: false,
        }
    }

    /// Returns the number of keys in this node.
    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns true once the node holds more than `MAX_KEYS` keys.
    #[inline]
    pub fn is_overflowing(&self) -> bool {
        self.keys.len() > MAX_KEYS
    }

    /// Index of the first key `>= key`.
    #[inline]
    pub fn lower_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Index of the first key `> key`.
    #[inline]
    pub fn upper_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }

    /// Inserts a key-value pair at `pos`, shifting later entries right.
    pub fn insert_entry(&mut self, pos: usize, key: K, value: V) {
        debug_assert_eq!(self.keys.len(), self.values.len());
        self.keys.insert(pos, key);
        self.values.insert(pos, value);
    }

    /// Approximate heap and inline footprint of this node in bytes.
    pub fn footprint(&self) -> usize {
        size_of::<Self>()
            + self.keys.capacity() * size_of::<K>()
            + self.values.capacity() * size_of::<V>()
            + self.children.capacity() * size_of::<NodeId>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_bounds() {
        assert_eq!(ORDER, 5);
        assert_eq!(MAX_KEYS, 4);
        assert_eq!(MIN_KEYS, 2);
    }

    #[test]
    fn test_bounds_with_duplicates() {
        let mut node: Node<i32, u32> = Node::new_leaf();
        for (i, k) in [5, 7, 7, 9].into_iter().enumerate() {
            node.insert_entry(i, k, i as u32);
        }
        assert_eq!(node.lower_bound(&7), 1);
        assert_eq!(node.upper_bound(&7), 3);
        assert_eq!(node.lower_bound(&1), 0);
        assert_eq!(node.upper_bound(&10), 4);
    }

    #[test]
    fn test_insert_entry_keeps_values_parallel() {
        let mut node: Node<i32, &str> = Node::new_leaf();
        node.insert_entry(0, 20, "b");
        node.insert_entry(0, 10, "a");
        node.insert_entry(2, 30, "c");
        assert_eq!(node.keys, [10, 20, 30]);
        assert_eq!(node.values, ["a", "b", "c"]);
    }

    #[test]
    fn test_overflow_threshold() {
        let mut node: Node<i32, ()> = Node::new_leaf();
        for k in 0..MAX_KEYS as i32 {
            node.insert_entry(node.key_count(), k, ());
        }
        assert!(!node.is_overflowing());
        node.insert_entry(node.key_count(), 99, ());
        assert!(node.is_overflowing());
    }

    #[test]
    fn test_internal_without_values() {
        let node: Node<i32, u64> = Node::new_internal(false);
        assert!(!node.is_leaf);
        assert_eq!(node.values.capacity(), 0);
        assert!(node.footprint() >= size_of::<Node<i32, u64>>());
    }
}
