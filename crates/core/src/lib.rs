//! tickdex Core - record types and key projections for the tickdex engine.
//!
//! This crate provides the foundational pieces shared by the index and the
//! engine crates:
//!
//! - `Record`: an immutable stock or crypto tick
//! - `RecordStore`: append-only owner of every ingested record
//! - `key`: projections from a record to an `i32` index key
//! - `CoreError`: error types for parsing record fields
//!
//! # Example
//!
//! ```rust
//! use tickdex_core::{key, Record, RecordStore, RecordType};
//!
//! let mut store = RecordStore::new();
//! let id = store.push(Record::new(
//!     "2024-01-15 10:00:00",
//!     "AAPL",
//!     "AAPL",
//!     185.92,
//!     186.40,
//!     183.92,
//!     65_076_600.0,
//!     RecordType::Stock,
//! ));
//!
//! let record = store.get(id).unwrap();
//! assert_eq!(key::price_to_key(record.price), 18592);
//! assert_eq!(key::timestamp_to_key(&record.timestamp), 1_705_312_800);
//! ```

pub mod error;
pub mod key;
pub mod record;
pub mod store;

pub use error::{CoreError, Result};
pub use key::{Key, KeyProjection};
pub use record::{Record, RecordId, RecordType};
pub use store::RecordStore;
