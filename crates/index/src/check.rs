//! Structural invariant walker shared by both tree layouts.

use crate::node::{Node, NodeId, MAX_KEYS, MIN_KEYS};
use crate::traits::IndexError;
use alloc::vec::Vec;

/// State carried through one invariant walk.
pub(crate) struct Walk<'a, K, V> {
    arena: &'a [Node<K, V>],
    /// Whether internal nodes carry values (B-tree layout).
    values_on_internal: bool,
    leaf_depth: Option<usize>,
    /// Leaves in left-to-right order.
    pub leaves: Vec<NodeId>,
}

impl<'a, K: Ord, V> Walk<'a, K, V> {
    pub fn new(arena: &'a [Node<K, V>], values_on_internal: bool) -> Self {
        Self {
            arena,
            values_on_internal,
            leaf_depth: None,
            leaves: Vec::new(),
        }
    }

    /// Checks the whole tree under `root` and returns the number of entries
    /// that carry a value.
    pub fn run(&mut self, root: NodeId) -> Result<usize, IndexError> {
        self.subtree(root, true, None, None, 0)
    }

    fn subtree(
        &mut self,
        node_id: NodeId,
        is_root: bool,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        depth: usize,
    ) -> Result<usize, IndexError> {
        let arena = self.arena;
        let node = &arena[node_id];
        let keys = node.key_count();

        if keys > MAX_KEYS {
            return Err(IndexError::Overflow { node: node_id, keys });
        }
        if (!is_root && keys < MIN_KEYS) || keys == 0 {
            return Err(IndexError::Underflow { node: node_id, keys });
        }
        if node.keys.windows(2).any(|w| w[0] > w[1]) {
            return Err(IndexError::Unsorted { node: node_id });
        }
        let below_lower = lower.is_some_and(|l| node.keys[0] < *l);
        let above_upper = upper.is_some_and(|u| node.keys[keys - 1] > *u);
        if below_lower || above_upper {
            return Err(IndexError::OutOfBounds { node: node_id });
        }

        let expected_values = if node.is_leaf || self.values_on_internal { keys } else { 0 };
        if node.values.len() != expected_values {
            return Err(IndexError::ValueCount {
                node: node_id,
                keys,
                values: node.values.len(),
            });
        }

        if node.is_leaf {
            if !node.children.is_empty() {
                return Err(IndexError::ChildCount {
                    node: node_id,
                    keys,
                    children: node.children.len(),
                });
            }
            match self.leaf_depth {
                Some(d) if d != depth => return Err(IndexError::UnevenDepth { node: node_id }),
                _ => self.leaf_depth = Some(depth),
            }
            self.leaves.push(node_id);
            return Ok(keys);
        }

        if node.children.len() != keys + 1 {
            return Err(IndexError::ChildCount {
                node: node_id,
                keys,
                children: node.children.len(),
            });
        }

        let mut entries = expected_values;
        for (i, &child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(&node.keys[i - 1]) };
            let child_upper = if i == keys { upper } else { Some(&node.keys[i]) };
            entries += self.subtree(child, false, child_lower, child_upper, depth + 1)?;
        }
        Ok(entries)
    }
}
