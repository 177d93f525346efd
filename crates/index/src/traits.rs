//! Ordered index trait definitions.
//!
//! This module defines the `OrderedIndex` trait that both tree layouts
//! satisfy, so the engine can hold either behind a trait object.

use crate::bplus::BPlusTree;
use crate::btree::BTree;
use crate::node::NodeId;
use crate::stats::TreeStats;
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Tree layout backing an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Keys and values co-located at every level.
    BTree,
    /// Values only at leaves; leaves linked in key order.
    BPlusTree,
}

impl Layout {
    /// Both layouts, in reporting order.
    pub const ALL: [Layout; 2] = [Layout::BTree, Layout::BPlusTree];

    /// Name used in reports and responses.
    pub fn name(&self) -> &'static str {
        match self {
            Layout::BTree => "btree",
            Layout::BPlusTree => "bplustree",
        }
    }

    /// Creates an empty index with this layout.
    pub fn empty_index<K, V>(&self) -> Box<dyn OrderedIndex<K, V>>
    where
        K: Ord + Clone + 'static,
        V: Clone + 'static,
    {
        match self {
            Layout::BTree => Box::new(BTree::new()),
            Layout::BPlusTree => Box::new(BPlusTree::new()),
        }
    }
}

/// Core trait for the ordered trees.
///
/// Indexes are insert-only: there is no delete and no update.
pub trait OrderedIndex<K, V> {
    /// Inserts a key-value pair. Duplicate keys are kept side by side.
    fn insert(&mut self, key: K, value: V);

    /// Returns a value stored under `key`, if any.
    fn search(&self, key: &K) -> Option<&V>;

    /// Returns every value whose key lies in `[low, high]`, in key order.
    fn range_query(&self, low: &K, high: &K) -> Vec<V>;

    /// Returns the number of stored entries.
    fn len(&self) -> usize;

    /// Returns true if the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the layout of this index.
    fn layout(&self) -> Layout;

    /// Returns shape statistics for this index.
    fn stats(&self) -> TreeStats;

    /// Approximate memory held by the nodes, in bytes.
    fn approx_bytes(&self) -> usize;

    /// Walks the whole tree and verifies its structural invariants.
    fn check_invariants(&self) -> Result<(), IndexError>;
}

/// Structural invariant violation found by `check_invariants`.
///
/// None of these can occur through the public API; they indicate a defect in
/// the split logic.
#[derive(Clone, Debug, PartialEq)]
pub enum IndexError {
    /// A node holds more than `MAX_KEYS` keys.
    Overflow { node: NodeId, keys: usize },
    /// A non-root node holds fewer than `MIN_KEYS` keys.
    Underflow { node: NodeId, keys: usize },
    /// An internal node does not have `keys + 1` children.
    ChildCount { node: NodeId, keys: usize, children: usize },
    /// Keys and values of a node are not parallel.
    ValueCount { node: NodeId, keys: usize, values: usize },
    /// Keys of a node are out of order.
    Unsorted { node: NodeId },
    /// A key lies outside the separators that route to its node.
    OutOfBounds { node: NodeId },
    /// Leaves sit at different depths.
    UnevenDepth { node: NodeId },
    /// The leaf chain skips, repeats or reorders leaves.
    BrokenLeafChain { node: NodeId },
    /// The number of reachable entries differs from the tracked length.
    LengthMismatch { expected: usize, found: usize },
}

impl core::fmt::Display for IndexError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IndexError::Overflow { node, keys } => {
                write!(f, "Node {} overflows with {} keys", node, keys)
            }
            IndexError::Underflow { node, keys } => {
                write!(f, "Node {} underflows with {} keys", node, keys)
            }
            IndexError::ChildCount { node, keys, children } => write!(
                f,
                "Node {} has {} keys but {} children",
                node, keys, children
            ),
            IndexError::ValueCount { node, keys, values } => write!(
                f,
                "Node {} has {} keys but {} values",
                node, keys, values
            ),
            IndexError::Unsorted { node } => write!(f, "Node {} keys are not sorted", node),
            IndexError::OutOfBounds { node } => {
                write!(f, "Node {} holds a key outside its separators", node)
            }
            IndexError::UnevenDepth { node } => {
                write!(f, "Leaf {} is not at the common leaf depth", node)
            }
            IndexError::BrokenLeafChain { node } => {
                write!(f, "Leaf chain broken at node {}", node)
            }
            IndexError::LengthMismatch { expected, found } => {
                write!(f, "Tree tracks {} entries but {} are reachable", expected, found)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_layout_names() {
        assert_eq!(Layout::BTree.name(), "btree");
        assert_eq!(Layout::BPlusTree.name(), "bplustree");
    }

    #[test]
    fn test_empty_index_per_layout() {
        for layout in Layout::ALL {
            let mut index = layout.empty_index::<i32, u32>();
            assert_eq!(index.layout(), layout);
            assert!(index.is_empty());

            index.insert(7, 70);
            index.insert(3, 30);
            assert_eq!(index.len(), 2);
            assert_eq!(index.search(&7), Some(&70));
            assert_eq!(index.range_query(&0, &10), [30, 70]);
            assert!(index.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_error_display() {
        let err = IndexError::ChildCount { node: 3, keys: 2, children: 2 };
        assert_eq!(err.to_string(), "Node 3 has 2 keys but 2 children");

        let err = IndexError::LengthMismatch { expected: 5, found: 4 };
        assert_eq!(err.to_string(), "Tree tracks 5 entries but 4 are reachable");
    }
}
