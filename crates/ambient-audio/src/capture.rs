use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ambient_foundation::CaptureError;

use crate::ring_buffer::ByteProducer;

/// Fixed capture format: the probe only understands mono 16-bit PCM.
pub const SAMPLE_RATE_HZ: u32 = 44_100;
const CHANNELS: u16 = 1;

#[derive(Debug, Default)]
pub struct CaptureStats {
    pub callbacks: AtomicU64,
    pub bytes_captured: AtomicU64,
    pub bytes_dropped: AtomicU64,
}

/// Handle to the dedicated thread that owns the cpal input stream.
pub struct CaptureThread {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
}

impl CaptureThread {
    /// Spawn the capture thread. Device acquisition happens on the
    /// thread itself (cpal streams are not `Send`); an unavailable
    /// device or format is logged there and ends the capture stream by
    /// dropping the ring producer, leaving the rest of the process
    /// running.
    pub fn spawn(
        device_name: Option<String>,
        producer: ByteProducer,
    ) -> Result<Self, CaptureError> {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::clone(&running);
        let stats = Arc::new(CaptureStats::default());
        let thread_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                match run_capture(device_name, producer, running, thread_stats) {
                    Ok(()) => tracing::info!("Audio capture thread shutting down"),
                    Err(e) => tracing::error!("Audio capture unavailable: {}", e),
                }
                // The producer (owned by the stream callback) is dropped
                // on either path, which ends the analysis loop.
            })
            .map_err(|e| CaptureError::Fatal(format!("Failed to spawn capture thread: {}", e)))?;

        Ok(Self {
            handle,
            shutdown,
            stats,
        })
    }

    pub fn stats(&self) -> Arc<CaptureStats> {
        Arc::clone(&self.stats)
    }

    pub fn stop(self) {
        self.shutdown.store(false, Ordering::SeqCst);
        let _ = self.handle.join();
        tracing::info!(
            callbacks = self.stats.callbacks.load(Ordering::Relaxed),
            bytes_captured = self.stats.bytes_captured.load(Ordering::Relaxed),
            bytes_dropped = self.stats.bytes_dropped.load(Ordering::Relaxed),
            "Capture stats at shutdown"
        );
    }
}

fn run_capture(
    device_name: Option<String>,
    mut producer: ByteProducer,
    running: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
) -> Result<(), CaptureError> {
    let device = open_device(device_name.as_deref())?;
    if let Ok(name) = device.name() {
        tracing::info!("Capture device: {}", name);
    }
    let config = probe_config(&device)?;

    let failed = Arc::new(AtomicBool::new(false));
    let err_failed = Arc::clone(&failed);
    let err_fn = move |err: cpal::StreamError| {
        tracing::error!("Audio stream error: {}", err);
        err_failed.store(true, Ordering::SeqCst);
    };

    // Reused serialization buffer; the callback must not allocate per
    // invocation once warmed up.
    let mut byte_buf: Vec<u8> = Vec::new();
    let stream = device.build_input_stream(
        &config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            stats.callbacks.fetch_add(1, Ordering::Relaxed);

            byte_buf.clear();
            byte_buf.reserve(data.len() * 2);
            for &sample in data {
                byte_buf.extend_from_slice(&sample.to_le_bytes());
            }

            match producer.write(&byte_buf) {
                Ok(written) => {
                    stats
                        .bytes_captured
                        .fetch_add(written as u64, Ordering::Relaxed);
                }
                Err(_) => {
                    stats
                        .bytes_dropped
                        .fetch_add(byte_buf.len() as u64, Ordering::Relaxed);
                }
            }
        },
        err_fn,
        None,
    )?;
    stream.play()?;
    tracing::info!(
        "Audio stream started: {}ch i16 @ {}Hz",
        CHANNELS,
        SAMPLE_RATE_HZ
    );

    while running.load(Ordering::SeqCst) && !failed.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }
    // Dropping the stream tears down the callback and with it the ring
    // producer.
    drop(stream);
    Ok(())
}

fn open_device(name: Option<&str>) -> Result<cpal::Device, CaptureError> {
    let host = cpal::default_host();
    match name {
        Some(wanted) => host
            .input_devices()?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| CaptureError::DeviceUnavailable {
                name: Some(wanted.to_string()),
            }),
        None => host
            .default_input_device()
            .ok_or(CaptureError::DeviceUnavailable { name: None }),
    }
}

/// Pick the fixed probe format. The probe adapts to nothing: a device
/// that cannot do mono i16 at 44.1kHz fails the capture stream.
fn probe_config(device: &cpal::Device) -> Result<StreamConfig, CaptureError> {
    let wanted: SampleRate = SAMPLE_RATE_HZ;
    for range in device.supported_input_configs()? {
        if range.sample_format() == SampleFormat::I16
            && range.channels() == CHANNELS
            && range.min_sample_rate() <= wanted
            && wanted <= range.max_sample_rate()
        {
            return Ok(StreamConfig {
                channels: CHANNELS,
                sample_rate: wanted,
                buffer_size: cpal::BufferSize::Default,
            });
        }
    }

    Err(CaptureError::FormatNotSupported {
        format: format!("{}ch i16 @ {}Hz", CHANNELS, SAMPLE_RATE_HZ),
    })
}
