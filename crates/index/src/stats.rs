//! Shape statistics for the trees.

use crate::node::{Node, NodeId, MAX_KEYS};

/// Shape of a tree at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreeStats {
    /// Number of stored entries.
    pub entries: usize,
    /// Levels from the root down to the leaves (0 for an empty tree).
    pub height: usize,
    /// Total number of nodes.
    pub nodes: usize,
    /// Number of leaf nodes.
    pub leaves: usize,
    /// Total number of keys over all nodes, separators included.
    pub keys: usize,
}

impl TreeStats {
    /// Collects statistics by walking the tree from `root`.
    pub fn collect<K: Ord, V>(arena: &[Node<K, V>], root: Option<NodeId>, entries: usize) -> Self {
        let mut stats = TreeStats {
            entries,
            ..TreeStats::default()
        };
        if let Some(root) = root {
            stats.visit(arena, root, 1);
        }
        stats
    }

    fn visit<K: Ord, V>(&mut self, arena: &[Node<K, V>], node_id: NodeId, depth: usize) {
        let node = &arena[node_id];
        self.nodes += 1;
        self.keys += node.key_count();
        if node.is_leaf {
            self.leaves += 1;
            self.height = self.height.max(depth);
            return;
        }
        for &child in &node.children {
            self.visit(arena, child, depth + 1);
        }
    }

    /// Returns the number of internal nodes.
    pub fn internal_nodes(&self) -> usize {
        self.nodes - self.leaves
    }

    /// Average share of key slots in use, between 0 and 1.
    pub fn fill_factor(&self) -> f64 {
        if self.nodes == 0 {
            return 0.0;
        }
        self.keys as f64 / (self.nodes * MAX_KEYS) as f64
    }
}
