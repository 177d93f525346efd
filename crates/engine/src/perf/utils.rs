//! Timing helpers shared by the perf snapshot and the `tickdex-perf` binary.

use std::time::{Duration, Instant};

/// Timed runs per measured query.
pub const ITERATIONS: usize = 20;

/// Untimed runs before measuring, to warm caches.
pub const WARMUP_ITERATIONS: usize = 3;

/// Runs `f` `WARMUP_ITERATIONS` times untimed, then `iterations` times timed.
pub fn measure<F, R>(iterations: usize, mut f: F) -> BenchResult
where
    F: FnMut() -> R,
{
    for _ in 0..WARMUP_ITERATIONS {
        std::hint::black_box(f());
    }

    let times: Vec<Duration> = (0..iterations)
        .map(|_| time_once(|| std::hint::black_box(f())).1)
        .collect();
    BenchResult::from_times(&times)
}

/// Times a single run of `f`, returning its output alongside the elapsed time.
pub fn time_once<F, R>(f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let output = f();
    (output, start.elapsed())
}

/// Mean of a series of timed runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BenchResult {
    pub mean: Duration,
    pub iterations: usize,
}

impl BenchResult {
    /// Averages `times`; an empty series yields a zero mean.
    pub fn from_times(times: &[Duration]) -> Self {
        let Ok(count) = u32::try_from(times.len()) else {
            return Self::default();
        };
        if count == 0 {
            return Self::default();
        }

        Self {
            mean: times.iter().sum::<Duration>() / count,
            iterations: times.len(),
        }
    }

    pub fn mean_secs(&self) -> f64 {
        self.mean.as_secs_f64()
    }

    /// Operations per second, given `count` operations per run.
    pub fn throughput(&self, count: usize) -> f64 {
        count as f64 / self.mean.as_secs_f64()
    }
}

/// Formats a duration with the largest unit that keeps it above one.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        format!("{} ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2} μs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2} ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2} s", nanos as f64 / 1_000_000_000.0)
    }
}

/// Formats an operations-per-second rate.
pub fn format_throughput(ops_per_sec: f64) -> String {
    if ops_per_sec >= 1_000_000.0 {
        format!("{:.2}M ops/s", ops_per_sec / 1_000_000.0)
    } else if ops_per_sec >= 1_000.0 {
        format!("{:.2}K ops/s", ops_per_sec / 1_000.0)
    } else {
        format!("{:.2} ops/s", ops_per_sec)
    }
}

/// Deterministic Fisher-Yates shuffle of `0..count`, driven by an LCG.
pub fn shuffle_indices(count: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..count).collect();
    let mut s = seed;
    for i in (1..count).rev() {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        let j = (s as usize) % (i + 1);
        indices.swap(i, j);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_times() {
        let times = [3, 1, 2].map(Duration::from_millis);
        let result = BenchResult::from_times(&times);
        assert_eq!(result.mean, Duration::from_millis(2));
        assert_eq!(result.iterations, 3);
        assert_eq!(result.mean_secs(), 0.002);
    }

    #[test]
    fn test_measure_counts_timed_runs_only() {
        let mut calls = 0;
        let result = measure(5, || calls += 1);
        assert_eq!(calls, 5 + WARMUP_ITERATIONS);
        assert_eq!(result.iterations, 5);
    }

    #[test]
    fn test_from_no_times() {
        let result = BenchResult::from_times(&[]);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.mean, Duration::ZERO);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(999)), "999 ns");
        assert_eq!(format_duration(Duration::from_micros(1_500)), "1.50 ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00 s");
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut shuffled = shuffle_indices(100, 42);
        assert_ne!(shuffled, (0..100).collect::<Vec<_>>());
        shuffled.sort();
        assert_eq!(shuffled, (0..100).collect::<Vec<_>>());
        assert_eq!(shuffle_indices(100, 42), shuffle_indices(100, 42));
    }
}
