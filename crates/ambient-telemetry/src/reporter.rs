use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use ambient_foundation::DeliveryError;

use crate::sink::{MetricSink, SinkSnapshot};

/// External delivery sink for aggregated statistics. Injected at
/// construction so the reporting logic can be exercised without a
/// network.
#[async_trait]
pub trait MetricsTransport: Send + Sync {
    async fn deliver(&self, report: &ReportSnapshot) -> Result<(), DeliveryError>;
}

/// One reporting cycle's extraction: both summaries plus static tags.
/// Built fresh each firing and owned by that delivery call.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    pub tags: Vec<String>,
    pub series: SinkSnapshot,
}

/// Periodic task that snapshots the sink and hands the aggregate to the
/// transport. Delivery is awaited inline and missed ticks are delayed,
/// so two deliveries never overlap; a slow delivery postpones the next
/// firing instead of stacking a burst behind it.
pub struct Reporter {
    sink: Arc<MetricSink>,
    transport: Arc<dyn MetricsTransport>,
    tags: Vec<String>,
    interval: Duration,
}

impl Reporter {
    pub fn new(
        sink: Arc<MetricSink>,
        transport: Arc<dyn MetricsTransport>,
        tags: Vec<String>,
        interval: Duration,
    ) -> Self {
        Self {
            sink,
            transport,
            tags,
            interval,
        }
    }

    pub fn spawn(self) -> ReporterHandle {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = tokio::spawn(async move {
            tracing::info!("Metrics reporter started, interval {:?}", self.interval);
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the first
            // report carries a full interval of observations.
            ticker.tick().await;

            while flag.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    break;
                }

                let report = ReportSnapshot {
                    tags: self.tags.clone(),
                    series: self.sink.snapshot(),
                };
                match self.transport.deliver(&report).await {
                    Ok(()) => tracing::debug!(
                        amplitude_count = report.series.amplitude.count,
                        peak_count = report.series.peak.count,
                        "Report delivered"
                    ),
                    Err(e) => {
                        tracing::warn!("Report delivery failed, skipping this cycle: {}", e)
                    }
                }
            }
            tracing::info!("Metrics reporter stopped");
        });

        ReporterHandle { handle, running }
    }
}

/// Handle to the reporter task.
pub struct ReporterHandle {
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

impl ReporterHandle {
    /// Cancel future firings. An in-flight delivery is not awaited.
    pub fn stop(self) {
        self.running.store(false, Ordering::SeqCst);
        self.handle.abort();
    }
}
