use anyhow::Context;
use clap::Parser;
use std::io;
use tickdex_engine::loader::{self, CsvFormat};
use tickdex_engine::telemetry::init_tracing;
use tickdex_engine::{IndexManager, PerfSnapshot, QueryEngine, Server, ServerConfig};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(&config.log);

    let mut records = loader::load_file(&config.stocks, CsvFormat::Stock, config.max_rows)
        .with_context(|| format!("reading {}", config.stocks.display()))?;
    let crypto = loader::load_file(&config.crypto, CsvFormat::Crypto, config.max_rows)
        .with_context(|| format!("reading {}", config.crypto.display()))?;
    records.extend(crypto);

    let manager = IndexManager::build(config.layout(), records);

    if !config.no_perf {
        // A failed snapshot should not keep the server from answering queries.
        if let Err(err) = PerfSnapshot::measure(&manager)
            .and_then(|snapshot| snapshot.write_to(&config.perf_output))
        {
            warn!(error = %err, "perf snapshot failed");
        }
    }

    info!(records = manager.len(), "ready for queries");
    let server = Server::new(QueryEngine::new(manager), config.perf_output);
    server
        .serve(io::stdin().lock(), io::stdout().lock())
        .context("serving queries")?;
    Ok(())
}
