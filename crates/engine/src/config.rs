//! Command-line and environment configuration of the query server.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tickdex_index::Layout;

/// Tree layout selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Structure {
    Btree,
    Bplus,
}

impl From<Structure> for Layout {
    fn from(structure: Structure) -> Self {
        match structure {
            Structure::Btree => Layout::BTree,
            Structure::Bplus => Layout::BPlusTree,
        }
    }
}

/// Serve market record queries over stdin/stdout, one JSON object per line.
#[derive(Clone, Debug, Parser)]
#[command(name = "tickdex-server", version, about)]
pub struct ServerConfig {
    /// Stock CSV file.
    #[arg(long, env = "TICKDEX_STOCKS", default_value = "stocks.csv")]
    pub stocks: PathBuf,

    /// Crypto CSV file.
    #[arg(long, env = "TICKDEX_CRYPTO", default_value = "crypto.csv")]
    pub crypto: PathBuf,

    /// Maximum number of records loaded from each file.
    #[arg(long, env = "TICKDEX_MAX_ROWS")]
    pub max_rows: Option<usize>,

    /// Tree layout backing the indexes.
    #[arg(long, env = "TICKDEX_STRUCTURE", value_enum, default_value_t = Structure::Bplus)]
    pub structure: Structure,

    /// Where the perf snapshot is written.
    #[arg(long, env = "TICKDEX_PERF_OUTPUT", default_value = "performance_results.json")]
    pub perf_output: PathBuf,

    /// Skip the perf snapshot at startup.
    #[arg(long, env = "TICKDEX_NO_PERF")]
    pub no_perf: bool,

    /// Default log filter, overridden by RUST_LOG.
    #[arg(long, env = "TICKDEX_LOG", default_value = "info")]
    pub log: String,
}

impl ServerConfig {
    /// Layout of the indexes.
    pub fn layout(&self) -> Layout {
        self.structure.into()
    }
}
