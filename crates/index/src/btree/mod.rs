//! B-tree index for tickdex.
//!
//! Keys and values are co-located at every level, so an exact match can end
//! above the leaves.

mod tree;

pub use tree::BTree;
