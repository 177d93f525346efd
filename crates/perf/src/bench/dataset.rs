//! Benchmarks over the ingested record set.

use crate::report::Report;
use tickdex_core::KeyProjection;
use tickdex_engine::perf::utils::*;
use tickdex_engine::perf::{PerfMetrics, Workload};
use tickdex_engine::IndexManager;
use tickdex_index::Layout;

pub fn run(report: &mut Report, manager: &IndexManager) -> anyhow::Result<()> {
    for workload in [Workload::timestamp()?, Workload::price()] {
        let name = workload.projection.index_name();
        println!("  {} index ({} records):", name, manager.len());
        let keys = manager.keys(workload.projection);

        for layout in Layout::ALL {
            let metrics = workload.run(layout, &keys);
            print_metrics(layout, &metrics);
            record(report, workload.projection, layout, &metrics);
        }
    }
    Ok(())
}

fn print_metrics(layout: Layout, metrics: &PerfMetrics) {
    println!(
        "    {:<10} build {:>10}  narrow {:>10}  medium {:>10}  wide {:>10}  exact {:>10}  {:.3} MB",
        layout.name(),
        format_secs(metrics.build_time),
        format_secs(metrics.range_query100),
        format_secs(metrics.range_query1000),
        format_secs(metrics.range_query10000),
        format_secs(metrics.exact_lookup),
        metrics.memory,
    );
}

fn record(report: &mut Report, projection: KeyProjection, layout: Layout, metrics: &PerfMetrics) {
    let category = format!("Dataset/{}/{}", projection.index_name(), layout.name());
    for (name, secs) in [
        ("build", metrics.build_time),
        ("range narrow", metrics.range_query100),
        ("range medium", metrics.range_query1000),
        ("range wide", metrics.range_query10000),
        ("exact lookup", metrics.exact_lookup),
        ("sequential scan", metrics.sequential_scan),
    ] {
        report.add_secs(&category, name, None, secs);
    }
}

fn format_secs(secs: f64) -> String {
    format_duration(std::time::Duration::from_secs_f64(secs.max(0.0)))
}
