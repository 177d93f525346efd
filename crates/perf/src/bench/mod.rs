//! Benchmark modules.

pub mod dataset;
pub mod layout;
