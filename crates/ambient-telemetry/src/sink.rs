use serde::Serialize;

use crate::distribution::{Distribution, DistributionSummary};

/// Scale applied to unit-range stats before insertion. The cast
/// truncates toward zero, collapsing sub-percent resolution.
const UNIT_SCALE: f32 = 100.0;

/// The shared accumulation point between the analysis thread and the
/// reporter: one cumulative distribution per statistic.
pub struct MetricSink {
    amplitude: Distribution,
    peak: Distribution,
}

/// Summaries of both distributions at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkSnapshot {
    pub amplitude: DistributionSummary,
    pub peak: DistributionSummary,
}

impl MetricSink {
    pub fn new() -> Self {
        Self {
            amplitude: Distribution::new(),
            peak: Distribution::new(),
        }
    }

    /// Record one block's stats. Called from the analysis thread only.
    pub fn record(&self, rms: f32, peak: f32) {
        self.amplitude.record((rms * UNIT_SCALE) as i64);
        self.peak.record((peak * UNIT_SCALE) as i64);
    }

    /// Summarize both distributions without resetting them.
    pub fn snapshot(&self) -> SinkSnapshot {
        SinkSnapshot {
            amplitude: self.amplitude.snapshot(),
            peak: self.peak.snapshot(),
        }
    }
}

impl Default for MetricSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_scales_by_100_and_truncates() {
        let sink = MetricSink::new();
        sink.record(0.256, 0.999);

        let snap = sink.snapshot();
        assert_eq!(snap.amplitude.max, 25);
        assert_eq!(snap.peak.max, 99);
    }

    #[test]
    fn each_record_lands_in_both_distributions() {
        let sink = MetricSink::new();
        for _ in 0..50 {
            sink.record(0.1, 0.2);
        }

        let snap = sink.snapshot();
        assert_eq!(snap.amplitude.count, 50);
        assert_eq!(snap.peak.count, 50);
    }

    #[test]
    fn distributions_are_cumulative_across_snapshots() {
        let sink = MetricSink::new();
        sink.record(0.5, 0.5);
        let first = sink.snapshot();
        sink.record(0.5, 0.5);
        let second = sink.snapshot();

        assert_eq!(first.amplitude.count, 1);
        assert_eq!(second.amplitude.count, 2);
    }
}
