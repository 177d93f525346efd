//! Compares the B-tree and B+-tree layouts.
//!
//! Runs synthetic insert, lookup and range benchmarks for both layouts, then,
//! when market data is available, times the indexes over the real records and
//! writes the perf snapshot the query server serves.

mod bench;
mod report;

use anyhow::Context;
use clap::Parser;
use report::Report;
use std::path::PathBuf;
use tickdex_engine::loader::{self, CsvFormat};
use tickdex_engine::telemetry::init_tracing;
use tickdex_engine::{IndexManager, PerfSnapshot};
use tickdex_index::Layout;

#[derive(Debug, Parser)]
#[command(name = "tickdex-perf", version, about)]
struct Args {
    /// Largest synthetic key set.
    #[arg(long, default_value_t = 100_000)]
    max_size: usize,

    /// Stock CSV file.
    #[arg(long, env = "TICKDEX_STOCKS", default_value = "stocks.csv")]
    stocks: PathBuf,

    /// Crypto CSV file.
    #[arg(long, env = "TICKDEX_CRYPTO", default_value = "crypto.csv")]
    crypto: PathBuf,

    /// Maximum number of records loaded from each file.
    #[arg(long, env = "TICKDEX_MAX_ROWS")]
    max_rows: Option<usize>,

    /// Where the perf snapshot is written.
    #[arg(long, env = "TICKDEX_PERF_OUTPUT", default_value = "performance_results.json")]
    perf_output: PathBuf,

    /// Default log filter, overridden by RUST_LOG.
    #[arg(long, env = "TICKDEX_LOG", default_value = "warn")]
    log: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              tickdex B-tree vs B+-tree comparison                ║");
    println!("╚══════════════════════════════════════════════════════════════════╝\n");

    let mut report = Report::new();

    let sizes: Vec<usize> = bench::layout::SIZES
        .iter()
        .copied()
        .filter(|&size| size <= args.max_size)
        .collect();
    println!("▶ Synthetic keys");
    bench::layout::run(&mut report, &sizes);
    println!();

    let mut records = loader::load_file(&args.stocks, CsvFormat::Stock, args.max_rows)?;
    records.extend(loader::load_file(&args.crypto, CsvFormat::Crypto, args.max_rows)?);
    if records.is_empty() {
        println!("▶ No market data found, skipping dataset benchmarks\n");
    } else {
        let manager = IndexManager::build(Layout::BPlusTree, records);
        println!("▶ Market data");
        bench::dataset::run(&mut report, &manager)?;
        println!();

        PerfSnapshot::measure(&manager)?
            .write_to(&args.perf_output)
            .with_context(|| format!("writing {}", args.perf_output.display()))?;
        println!("Snapshot written to {}\n", args.perf_output.display());
    }

    report.print_summary();
    report.print_comparison(
        &format!("Layout/{}", Layout::BTree.name()),
        &format!("Layout/{}", Layout::BPlusTree.name()),
    );
    Ok(())
}
