//! B-tree versus B+-tree over synthetic key sets.

use crate::report::Report;
use tickdex_engine::perf::utils::*;
use tickdex_index::{Layout, OrderedIndex};

/// Key set sizes to test.
pub const SIZES: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

/// Range widths, as a share of the key space.
const RANGE_WIDTHS: [(&str, usize); 3] = [("range 0.1%", 1_000), ("range 1%", 100), ("range 10%", 10)];

pub fn run(report: &mut Report, sizes: &[usize]) {
    for layout in Layout::ALL {
        println!("  {}:", layout.name());
        for &size in sizes {
            insert_sequential(report, layout, size);
            insert_shuffled(report, layout, size);
            point_lookup(report, layout, size);
            range_scan(report, layout, size);
        }
    }
}

fn category(layout: Layout) -> String {
    format!("Layout/{}", layout.name())
}

fn build(layout: Layout, keys: impl Iterator<Item = i32>) -> Box<dyn OrderedIndex<i32, u32>> {
    let mut index = layout.empty_index();
    for (i, key) in keys.enumerate() {
        index.insert(key, i as u32);
    }
    index
}

fn insert_sequential(report: &mut Report, layout: Layout, size: usize) {
    let result = measure(ITERATIONS, || build(layout, 0..size as i32));
    let throughput = result.throughput(size);
    println!(
        "    {:>7} sequential inserts: {:>10} ({:>12})",
        size,
        format_duration(result.mean),
        format_throughput(throughput)
    );
    report.add_result(&category(layout), "insert sequential", Some(size), result, Some(throughput));
}

fn insert_shuffled(report: &mut Report, layout: Layout, size: usize) {
    let order = shuffle_indices(size, 12345);
    let result = measure(ITERATIONS, || build(layout, order.iter().map(|&i| i as i32)));
    let throughput = result.throughput(size);
    println!(
        "    {:>7} shuffled inserts:   {:>10} ({:>12})",
        size,
        format_duration(result.mean),
        format_throughput(throughput)
    );
    report.add_result(&category(layout), "insert shuffled", Some(size), result, Some(throughput));
}

fn point_lookup(report: &mut Report, layout: Layout, size: usize) {
    let index = build(layout, 0..size as i32);

    // Use random order to avoid CPU prefetch optimization
    let lookup_keys: Vec<i32> = shuffle_indices(size, 54321)
        .into_iter()
        .take(1000.min(size))
        .map(|i| i as i32)
        .collect();
    let lookup_count = lookup_keys.len();

    let result = measure(ITERATIONS, || {
        lookup_keys
            .iter()
            .filter(|key| index.search(key).is_some())
            .count()
    });

    let throughput = result.throughput(lookup_count);
    println!(
        "    {:>7} rows ({} lookups): {:>10} ({:>12}), {} nodes, height {}",
        size,
        lookup_count,
        format_duration(result.mean),
        format_throughput(throughput),
        index.stats().nodes,
        index.stats().height,
    );
    report.add_result(&category(layout), "point lookup", Some(size), result, Some(throughput));
}

fn range_scan(report: &mut Report, layout: Layout, size: usize) {
    let index = build(layout, 0..size as i32);

    for (name, divisor) in RANGE_WIDTHS {
        let width = (size / divisor).max(1) as i32;
        let low = size as i32 / 2;
        let high = low + width - 1;

        let result = measure(ITERATIONS, || index.range_query(&low, &high));
        let throughput = result.throughput(width as usize);
        println!(
            "    {:>7} rows, {:<10} ({:>6} hits): {:>10}",
            size,
            name,
            width,
            format_duration(result.mean)
        );
        report.add_result(&category(layout), name, Some(size), result, Some(throughput));
    }
}
