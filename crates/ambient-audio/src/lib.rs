pub mod analyzer;
pub mod capture;
pub mod pipeline;
pub mod ring_buffer;
pub mod source;

// Public API
pub use analyzer::{BlockStats, FrameAnalyzer};
pub use capture::{CaptureStats, CaptureThread, SAMPLE_RATE_HZ};
pub use pipeline::AnalysisThread;
pub use ring_buffer::{ByteConsumer, ByteProducer, ByteRingBuffer};
pub use source::{RingBufferSource, SampleSource, BLOCK_BYTES};
