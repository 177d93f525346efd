//! B+-tree index for tickdex.
//!
//! This module provides the leaf-linked layout used for ordered range scans.

mod iter;
mod tree;

pub use iter::LeafIter;
pub use tree::BPlusTree;
