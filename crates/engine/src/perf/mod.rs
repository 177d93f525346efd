//! Layout comparison snapshot.
//!
//! For the `timestamp` and `price` projections, each layout is rebuilt from
//! scratch over the stored records and timed on a fixed workload. The live
//! indexes of the [`IndexManager`] are never touched.

pub mod utils;

use crate::error::Result;
use crate::manager::IndexManager;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tickdex_core::key::{self, DayBound, Key};
use tickdex_core::{KeyProjection, RecordId};
use tickdex_index::Layout;
use tracing::info;
use utils::{measure, time_once, ITERATIONS};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Timings of one layout over one index. Times in seconds, memory in MB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfMetrics {
    pub build_time: f64,
    pub range_query100: f64,
    pub range_query1000: f64,
    pub range_query10000: f64,
    pub exact_lookup: f64,
    /// Full ordered scan over every key.
    pub sequential_scan: f64,
    pub memory: f64,
}

/// Both layouts measured on the same index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutComparison {
    pub btree: PerfMetrics,
    pub bplustree: PerfMetrics,
}

impl LayoutComparison {
    /// Returns the metrics of one layout.
    pub fn get(&self, layout: Layout) -> &PerfMetrics {
        match layout {
            Layout::BTree => &self.btree,
            Layout::BPlusTree => &self.bplustree,
        }
    }

    fn get_mut(&mut self, layout: Layout) -> &mut PerfMetrics {
        match layout {
            Layout::BTree => &mut self.btree,
            Layout::BPlusTree => &mut self.bplustree,
        }
    }
}

/// Contents of the perf snapshot file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfSnapshot {
    /// ISO-8601 UTC time of the measurement.
    pub updated_at: String,
    #[serde(rename = "timestamp_index")]
    pub timestamp_index: LayoutComparison,
    #[serde(rename = "price_index")]
    pub price_index: LayoutComparison,
}

/// Query bounds timed against one index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Workload {
    pub projection: KeyProjection,
    /// Narrow, medium and wide inclusive ranges.
    pub ranges: [(Key, Key); 3],
    pub exact: Key,
}

impl Workload {
    /// One day, one month and one year of January-2024-anchored ticks.
    pub fn timestamp() -> Result<Self> {
        let day = |date: &str, bound| key::date_bound_to_key(date, bound);
        Ok(Self {
            projection: KeyProjection::Timestamp,
            ranges: [
                (day("2024-01-15", DayBound::Start)?, day("2024-01-16", DayBound::End)?),
                (day("2024-01-01", DayBound::Start)?, day("2024-01-31", DayBound::End)?),
                (day("2024-01-01", DayBound::Start)?, day("2024-12-31", DayBound::End)?),
            ],
            exact: key::epoch_to_key(key::parse_timestamp("2024-01-15 10:00:00")?)?,
        })
    }

    /// Price bands from a few hundred dollars up to the whole market.
    pub fn price() -> Self {
        let cents = key::price_to_key;
        Self {
            projection: KeyProjection::Price,
            ranges: [
                (cents(100.0), cents(500.0)),
                (cents(50.0), cents(1000.0)),
                (cents(0.0), cents(50000.0)),
            ],
            exact: cents(250.5),
        }
    }

    /// Builds a fresh index of `layout` over `keys` and times this workload.
    pub fn run(&self, layout: Layout, keys: &[(Key, RecordId)]) -> PerfMetrics {
        let (index, build) = time_once(|| {
            let mut index = layout.empty_index();
            for &(key, id) in keys {
                index.insert(key, id);
            }
            index
        });

        let range = |(low, high): (Key, Key)| {
            measure(ITERATIONS, || index.range_query(&low, &high)).mean_secs()
        };

        PerfMetrics {
            build_time: build.as_secs_f64(),
            range_query100: range(self.ranges[0]),
            range_query1000: range(self.ranges[1]),
            range_query10000: range(self.ranges[2]),
            exact_lookup: measure(ITERATIONS, || index.search(&self.exact).copied()).mean_secs(),
            sequential_scan: range((Key::MIN, Key::MAX)),
            memory: index.approx_bytes() as f64 / BYTES_PER_MB,
        }
    }
}

impl PerfSnapshot {
    /// Times both layouts on the timestamp and price workloads.
    pub fn measure(manager: &IndexManager) -> Result<Self> {
        let timestamp_index = compare(manager, &Workload::timestamp()?);
        let price_index = compare(manager, &Workload::price());

        Ok(Self {
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            timestamp_index,
            price_index,
        })
    }

    /// Overwrites `path` with this snapshot as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %path.display(), "perf snapshot written");
        Ok(())
    }
}

fn compare(manager: &IndexManager, workload: &Workload) -> LayoutComparison {
    let keys = manager.keys(workload.projection);
    let mut comparison = LayoutComparison::default();
    for layout in Layout::ALL {
        let metrics = workload.run(layout, &keys);
        info!(
            index = workload.projection.index_name(),
            structure = layout.name(),
            build_secs = metrics.build_time,
            memory_mb = metrics.memory,
            "measured layout"
        );
        *comparison.get_mut(layout) = metrics;
    }
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickdex_core::{Record, RecordType};

    fn manager() -> IndexManager {
        let records = (0..200).map(|i| {
            Record::new(
                format!("2024-01-{:02} {:02}:00:00", i % 28 + 1, i % 24),
                format!("T{}", i % 7),
                format!("T{}", i % 7),
                10.0 + i as f64 * 3.5,
                0.0,
                0.0,
                100.0,
                RecordType::Stock,
            )
        });
        IndexManager::build(Layout::BPlusTree, records)
    }

    #[test]
    fn test_timestamp_workload_bounds() {
        let workload = Workload::timestamp().unwrap();
        assert_eq!(workload.ranges[0], (1_705_276_800, 1_705_449_599));
        assert_eq!(workload.exact, 1_705_312_800);
    }

    #[test]
    fn test_price_workload_bounds() {
        let workload = Workload::price();
        assert_eq!(workload.ranges, [(10_000, 50_000), (5_000, 100_000), (0, 5_000_000)]);
        assert_eq!(workload.exact, 25_050);
    }

    #[test]
    fn test_snapshot_measures_both_layouts() {
        let snapshot = PerfSnapshot::measure(&manager()).unwrap();
        for layout in Layout::ALL {
            for comparison in [&snapshot.timestamp_index, &snapshot.price_index] {
                let metrics = comparison.get(layout);
                assert!(metrics.build_time >= 0.0);
                assert!(metrics.memory > 0.0);
            }
        }
    }

    #[test]
    fn test_snapshot_field_names() {
        let snapshot = PerfSnapshot::measure(&manager()).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json["updatedAt"].as_str().is_some_and(|s| s.ends_with('Z')));
        for index in ["timestamp_index", "price_index"] {
            for layout in ["btree", "bplustree"] {
                let metrics = &json[index][layout];
                for field in [
                    "buildTime",
                    "rangeQuery100",
                    "rangeQuery1000",
                    "rangeQuery10000",
                    "exactLookup",
                    "sequentialScan",
                    "memory",
                ] {
                    assert!(metrics[field].is_number(), "{index}.{layout}.{field}");
                }
            }
        }
    }
}
