use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use ambient_foundation::CaptureError;
use ambient_telemetry::MetricSink;

use crate::analyzer::FrameAnalyzer;
use crate::source::{SampleSource, BLOCK_BYTES};

/// The capture-side stream: source -> analyzer -> sink, one iteration
/// per block, running until the source signals end of stream.
pub struct AnalysisThread {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl AnalysisThread {
    pub fn spawn<S>(mut source: S, sink: Arc<MetricSink>) -> Result<Self, CaptureError>
    where
        S: SampleSource + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("audio-analysis".to_string())
            .spawn(move || {
                tracing::info!("Audio analysis started");
                let mut analyzer = FrameAnalyzer::new();
                let mut block = vec![0u8; BLOCK_BYTES];

                while running.load(Ordering::SeqCst) {
                    match source.next_block(&mut block) {
                        Some(len) => {
                            let stats = analyzer.analyze(&block[..len]);
                            sink.record(stats.rms, stats.peak);
                        }
                        None => {
                            tracing::info!("Audio stream ended");
                            break;
                        }
                    }
                }
                tracing::info!("Audio analysis stopped");
            })
            .map_err(|e| CaptureError::Fatal(format!("Failed to spawn analysis thread: {}", e)))?;

        Ok(Self { handle, shutdown })
    }

    /// Stop after the current block. The source must already have been
    /// closed (or keep producing) for the in-flight `next_block` to
    /// return; process shutdown stops capture first for that reason.
    pub fn stop(self) {
        self.shutdown.store(false, Ordering::SeqCst);
        let _ = self.handle.join();
    }
}
