use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audio subsystem error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Metrics delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

/// Failures of the capture stream. All of these end that stream only;
/// the reporter keeps its schedule and the process keeps running.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Device unavailable: {name:?}")]
    DeviceUnavailable { name: Option<String> },

    #[error("Format not supported: {format}")]
    FormatNotSupported { format: String },

    #[error("Device enumeration error: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("Supported stream configs error: {0}")]
    SupportedStreamConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("Build stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Play stream error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

/// A rejected or failed report delivery. Recovered locally by skipping
/// the cycle; never retried, never surfaced to the capture stream.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("delivery rejected with status {status}")]
    Rejected { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),
}
