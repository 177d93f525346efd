//! Tickdex Index - ordered tree indexes for tickdex.
//!
//! This crate provides the two tree layouts the engine compares:
//!
//! - `BTree`: keys and values at every level, exact matches may end early
//! - `BPlusTree`: values only in leaves, leaves linked for range scans
//!
//! Both have order 5, are insert-only and keep duplicate keys.
//!
//! # Example
//!
//! ```rust
//! use tickdex_index::{BPlusTree, BTree, Layout, OrderedIndex};
//!
//! let mut btree: BTree<i32, u32> = BTree::new();
//! for (i, key) in [10, 20, 5, 6, 12, 30, 7, 17].into_iter().enumerate() {
//!     btree.insert(key, i as u32);
//! }
//! assert_eq!(btree.search(&6), Some(&3));
//! assert_eq!(btree.range_query(&6, &10), vec![3, 6, 0]);
//!
//! let mut bplus: BPlusTree<i32, u32> = BPlusTree::new();
//! for key in 1..=5 {
//!     bplus.insert(key, key as u32);
//! }
//! assert_eq!(bplus.root_keys(), &[3]);
//!
//! let mut index = Layout::BPlusTree.empty_index::<i32, u32>();
//! index.insert(42, 0);
//! assert_eq!(index.range_query(&0, &100), vec![0]);
//! ```

#![no_std]

extern crate alloc;

pub mod bplus;
pub mod btree;
mod check;
pub mod node;
pub mod stats;
pub mod traits;

pub use bplus::{BPlusTree, LeafIter};
pub use btree::BTree;
pub use node::{NodeId, MAX_KEYS, MIN_KEYS, ORDER};
pub use stats::TreeStats;
pub use traits::{IndexError, Layout, OrderedIndex};
