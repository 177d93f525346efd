//! Tickdex Engine - index manager, query engine and query server.
//!
//! This crate ties the record store and the tree indexes together:
//!
//! - `loader`: CSV ingestion of stock and crypto ticks
//! - `IndexManager`: one index per key projection over a shared store
//! - `QueryEngine`: ticker, date range and price range queries
//! - `Server`: the line-oriented JSON protocol
//! - `perf`: B-tree versus B+-tree timing snapshot
//!
//! # Example
//!
//! ```rust
//! use tickdex_engine::loader::{read_records, CsvFormat};
//! use tickdex_engine::{IndexManager, QueryEngine};
//! use tickdex_index::Layout;
//!
//! let csv = "\
//! timestamp,name,close,high,low,open,adj_close,volume,exchange
//! 2024-01-15 10:00:00,AAPL,185.92,186.40,183.92,184.35,185.92,65076600,NASDAQ
//! ";
//! let records = read_records(csv.as_bytes(), CsvFormat::Stock, None).unwrap();
//! let engine = QueryEngine::new(IndexManager::build(Layout::BPlusTree, records));
//!
//! let response = engine.price_range(180.0, 190.0).unwrap();
//! assert_eq!(response.results[0].name, "AAPL");
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod perf;
pub mod query;
pub mod server;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{EngineError, Result};
pub use manager::IndexManager;
pub use perf::PerfSnapshot;
pub use query::{QueryEngine, Request, MAX_RESULTS};
pub use server::{Response, Server};
