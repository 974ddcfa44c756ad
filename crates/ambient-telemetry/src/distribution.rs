use parking_lot::Mutex;
use serde::Serialize;

/// Number of most-recent observations retained for shape statistics.
const RESERVOIR_SIZE: usize = 1024;

/// Cumulative tracker for a stream of integer observations.
///
/// `count`, `min`, `max`, and `mean` are exact over everything ever
/// recorded; the distribution is never reset. Shape statistics
/// (median/p95/p99) are computed over a ring of the most recent
/// [`RESERVOIR_SIZE`] observations. Both sides take a short internal
/// lock, so recording never waits on anything slower than a memcpy and
/// no observation is lost to a concurrent snapshot.
pub struct Distribution {
    inner: Mutex<Reservoir>,
}

struct Reservoir {
    count: u64,
    min: i64,
    max: i64,
    sum: i64,
    values: Vec<i64>,
    next: usize,
}

/// Summary statistics extracted from a [`Distribution`] at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DistributionSummary {
    pub count: u64,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub median: i64,
    pub p95: i64,
    pub p99: i64,
}

impl Distribution {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Reservoir {
                count: 0,
                min: 0,
                max: 0,
                sum: 0,
                values: Vec::with_capacity(RESERVOIR_SIZE),
                next: 0,
            }),
        }
    }

    pub fn record(&self, value: i64) {
        let mut r = self.inner.lock();
        if r.count == 0 {
            r.min = value;
            r.max = value;
        } else {
            r.min = r.min.min(value);
            r.max = r.max.max(value);
        }
        r.count += 1;
        r.sum += value;

        if r.values.len() < RESERVOIR_SIZE {
            r.values.push(value);
        } else {
            let slot = r.next;
            r.values[slot] = value;
        }
        r.next = (r.next + 1) % RESERVOIR_SIZE;
    }

    /// Current summary. Does not reset the distribution.
    pub fn snapshot(&self) -> DistributionSummary {
        let (count, min, max, mean, mut window) = {
            let r = self.inner.lock();
            if r.count == 0 {
                return DistributionSummary::default();
            }
            (
                r.count,
                r.min,
                r.max,
                r.sum as f64 / r.count as f64,
                r.values.clone(),
            )
        };

        // Sorting happens outside the lock.
        window.sort_unstable();
        DistributionSummary {
            count,
            min,
            max,
            mean,
            median: percentile(&window, 50.0),
            p95: percentile(&window, 95.0),
            p99: percentile(&window, 99.0),
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self::new()
    }
}

fn percentile(sorted: &[i64], pct: f64) -> i64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (pct / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn empty_distribution_snapshots_to_zeroes() {
        let dist = Distribution::new();
        assert_eq!(dist.snapshot(), DistributionSummary::default());
    }

    #[test]
    fn count_matches_number_of_records() {
        let dist = Distribution::new();
        for i in 0..500 {
            dist.record(i);
        }
        assert_eq!(dist.snapshot().count, 500);
    }

    #[test]
    fn min_max_mean_are_exact() {
        let dist = Distribution::new();
        for v in [10, -5, 30, 25] {
            dist.record(v);
        }
        let s = dist.snapshot();
        assert_eq!(s.min, -5);
        assert_eq!(s.max, 30);
        assert_eq!(s.mean, 15.0);
    }

    #[test]
    fn snapshot_does_not_reset() {
        let dist = Distribution::new();
        dist.record(7);
        let _ = dist.snapshot();
        dist.record(7);
        assert_eq!(dist.snapshot().count, 2);
    }

    #[test]
    fn percentiles_over_uniform_window() {
        let dist = Distribution::new();
        for v in 1..=100 {
            dist.record(v);
        }
        let s = dist.snapshot();
        assert_eq!(s.median, 50);
        assert_eq!(s.p95, 95);
        assert_eq!(s.p99, 99);
    }

    #[test]
    fn exact_stats_survive_reservoir_wrap() {
        let dist = Distribution::new();
        let total = RESERVOIR_SIZE as i64 * 3;
        for v in 0..total {
            dist.record(v);
        }
        let s = dist.snapshot();
        assert_eq!(s.count, total as u64);
        assert_eq!(s.min, 0);
        assert_eq!(s.max, total - 1);
        // Shape comes from the retained window, which has overwritten
        // the early low values by now.
        assert!(s.median >= total - RESERVOIR_SIZE as i64);
    }

    #[test]
    fn concurrent_snapshots_lose_no_records() {
        let dist = Arc::new(Distribution::new());
        let writer_dist = Arc::clone(&dist);
        const N: u64 = 20_000;

        let writer = thread::spawn(move || {
            for i in 0..N {
                writer_dist.record((i % 100) as i64);
            }
        });

        // Snapshot continuously while the writer runs; counts must only
        // ever grow.
        let mut last = 0;
        while !writer.is_finished() {
            let count = dist.snapshot().count;
            assert!(count >= last);
            last = count;
        }
        writer.join().unwrap();

        assert_eq!(dist.snapshot().count, N);
    }
}
