use std::sync::Arc;

use ambient_app::transport::HttpTransport;
use ambient_audio::{AnalysisThread, ByteRingBuffer, CaptureThread, RingBufferSource, BLOCK_BYTES};
use ambient_foundation::{ProbeConfig, ShutdownGuard};
use ambient_telemetry::{MetricSink, Reporter};

fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    tracing::info!("Starting ambient probe");

    let config = ProbeConfig::from_env()?;
    tracing::info!(
        hostname = %config.hostname,
        endpoint = %config.endpoint,
        interval = ?config.report_interval,
        "Probe configured"
    );

    let shutdown = ShutdownGuard::install();
    let sink = Arc::new(MetricSink::new());

    // --- Capture stream: device -> ring -> analyzer -> sink ---
    // A device that cannot be opened is logged by the capture thread
    // and ends that stream only; the reporter keeps its schedule.
    let ring = ByteRingBuffer::new(BLOCK_BYTES * 32);
    let (producer, consumer) = ring.split();
    let capture = CaptureThread::spawn(config.input_device.clone(), producer)?;
    let analysis = AnalysisThread::spawn(RingBufferSource::new(consumer), Arc::clone(&sink))?;

    // --- Reporter stream: sink -> transport, fixed interval ---
    let transport = Arc::new(HttpTransport::new(&config)?);
    let tags = vec![format!("hostname:{}", config.hostname)];
    let reporter = Reporter::new(
        Arc::clone(&sink),
        transport,
        tags,
        config.report_interval,
    )
    .spawn();

    shutdown.wait().await;

    tracing::info!("Beginning graceful shutdown");
    reporter.stop();
    // Stopping capture drops the ring producer, which ends the analysis
    // loop; join it afterwards.
    capture.stop();
    analysis.stop();

    tracing::info!("Shutdown complete");
    Ok(())
}
