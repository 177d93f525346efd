//! Performance report generation.

use std::collections::HashMap;
use std::time::Duration;
use tickdex_engine::perf::utils::{format_duration, format_throughput, BenchResult};

#[derive(Clone)]
pub struct BenchEntry {
    pub name: String,
    pub category: String,
    pub size: Option<usize>,
    pub result: BenchResult,
    pub throughput: Option<f64>,
}

#[derive(Default)]
pub struct Report {
    entries: Vec<BenchEntry>,
    categories: HashMap<String, Vec<usize>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: BenchEntry) {
        let idx = self.entries.len();
        self.categories
            .entry(entry.category.clone())
            .or_default()
            .push(idx);
        self.entries.push(entry);
    }

    pub fn add_result(
        &mut self,
        category: &str,
        name: &str,
        size: Option<usize>,
        result: BenchResult,
        throughput: Option<f64>,
    ) {
        self.add(BenchEntry {
            name: name.to_string(),
            category: category.to_string(),
            size,
            result,
            throughput,
        });
    }

    /// Adds a single timing given in seconds.
    pub fn add_secs(&mut self, category: &str, name: &str, size: Option<usize>, secs: f64) {
        let elapsed = Duration::from_secs_f64(secs.max(0.0));
        self.add_result(category, name, size, BenchResult::from_times(&[elapsed]), None);
    }

    /// Mean time of an entry, by category and name and size.
    pub fn mean(&self, category: &str, name: &str, size: Option<usize>) -> Option<Duration> {
        self.categories.get(category)?.iter().find_map(|&idx| {
            let entry = &self.entries[idx];
            (entry.name == name && entry.size == size).then_some(entry.result.mean)
        })
    }

    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                      PERFORMANCE SUMMARY                         ║");
        println!("╚══════════════════════════════════════════════════════════════════╝\n");

        // Group by category
        let mut categories: Vec<_> = self.categories.keys().collect();
        categories.sort();

        for category in categories {
            println!("┌─ {} ─", category);
            if let Some(indices) = self.categories.get(category.as_str()) {
                for &idx in indices {
                    let entry = &self.entries[idx];
                    let size_str = entry
                        .size
                        .map(|s| format!(" [{:>6}]", format_size(s)))
                        .unwrap_or_default();

                    let throughput_str = entry
                        .throughput
                        .map(|t| format!(" ({})", format_throughput(t)))
                        .unwrap_or_default();

                    println!(
                        "│ {:<30}{}: {:>12}{}",
                        entry.name,
                        size_str,
                        format_duration(entry.result.mean),
                        throughput_str,
                    );
                }
            }
            println!("└─");
            println!();
        }
    }

    /// Prints the B+-tree time as a ratio of the B-tree time for every
    /// operation measured on both layouts.
    pub fn print_comparison(&self, btree: &str, bplus: &str) {
        let Some(indices) = self.categories.get(btree) else {
            return;
        };

        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("  B+-tree time relative to B-tree (below 1.00x: B+-tree faster)");
        for &idx in indices {
            let entry = &self.entries[idx];
            let Some(other) = self.mean(bplus, &entry.name, entry.size) else {
                continue;
            };
            let base = entry.result.mean.as_secs_f64();
            if base > 0.0 {
                let size_str = entry.size.map(format_size).unwrap_or_default();
                println!(
                    "  {:<20} {:>6}: {:.2}x",
                    entry.name,
                    size_str,
                    other.as_secs_f64() / base
                );
            }
        }
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}

fn format_size(size: usize) -> String {
    if size >= 1_000_000 {
        format!("{}M", size / 1_000_000)
    } else if size >= 1_000 {
        format!("{}K", size / 1_000)
    } else {
        format!("{}", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_category() {
        let mut report = Report::new();
        report.add_secs("Layout/btree", "insert", Some(1000), 0.5);
        report.add_secs("Layout/bplustree", "insert", Some(1000), 0.25);

        assert_eq!(
            report.mean("Layout/bplustree", "insert", Some(1000)),
            Some(Duration::from_millis(250))
        );
        assert_eq!(report.mean("Layout/bplustree", "insert", Some(10)), None);
        assert_eq!(report.mean("Layout/avl", "insert", Some(1000)), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(999), "999");
        assert_eq!(format_size(10_000), "10K");
        assert_eq!(format_size(1_000_000), "1M");
    }
}
