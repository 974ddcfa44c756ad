/// Per-block loudness and peak statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStats {
    pub rms: f32,
    pub peak: f32,
}

/// Decay multiplier applied to the previous peak when the current block
/// comes in lower, giving a VU-meter-like ballistic release instead of
/// an abrupt drop on transient silence.
const PEAK_DECAY: f32 = 0.875;

/// Divisor normalizing signed 16-bit samples into [-1.0, 1.0).
const SAMPLE_SCALE: f32 = 32768.0;

/// Turns raw capture blocks into [`BlockStats`], carrying peak-decay
/// state from one block to the next. One analyzer per capture stream;
/// the smoothing memory lives here, not in a global.
pub struct FrameAnalyzer {
    last_peak: f32,
}

impl FrameAnalyzer {
    pub fn new() -> Self {
        Self { last_peak: 0.0 }
    }

    /// Decode one block of little-endian i16 PCM and compute its stats.
    /// A trailing odd byte is ignored.
    pub fn analyze(&mut self, block: &[u8]) -> BlockStats {
        let mut sum_squares = 0.0f32;
        let mut raw_peak = 0.0f32;
        let mut samples = 0usize;

        for pair in block.chunks_exact(2) {
            let sample = i16::from_le_bytes([pair[0], pair[1]]) as f32 / SAMPLE_SCALE;
            let abs = sample.abs();
            if abs > raw_peak {
                raw_peak = abs;
            }
            sum_squares += sample * sample;
            samples += 1;
        }

        let rms = if samples == 0 {
            0.0
        } else {
            (sum_squares / samples as f32).sqrt()
        };

        // Release ballistics: a falling peak decays from the previous
        // block's stored value; a rising peak passes through unchanged.
        let peak = if self.last_peak > raw_peak {
            self.last_peak * PEAK_DECAY
        } else {
            raw_peak
        };
        self.last_peak = peak;

        BlockStats { rms, peak }
    }
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_of(raw: i16, count: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(count * 2);
        for _ in 0..count {
            bytes.extend_from_slice(&raw.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn normalization_maps_into_unit_range() {
        let mut analyzer = FrameAnalyzer::new();

        let max = analyzer.analyze(&block_of(32767, 1));
        assert!((max.peak - 0.99997).abs() < 1e-4);
        assert!(max.peak < 1.0);

        let mut analyzer = FrameAnalyzer::new();
        let min = analyzer.analyze(&block_of(-32768, 1));
        assert_eq!(min.peak, 1.0);
        assert_eq!(min.rms, 1.0);
    }

    #[test]
    fn silent_block_has_zero_rms() {
        let mut analyzer = FrameAnalyzer::new();
        let stats = analyzer.analyze(&block_of(0, 1024));
        assert_eq!(stats.rms, 0.0);
        assert_eq!(stats.peak, 0.0);
    }

    #[test]
    fn constant_amplitude_rms_equals_amplitude() {
        let mut analyzer = FrameAnalyzer::new();
        // 16384 / 32768 == 0.5 exactly
        let stats = analyzer.analyze(&block_of(16384, 1024));
        assert_eq!(stats.rms, 0.5);
        assert_eq!(stats.peak, 0.5);

        let mut analyzer = FrameAnalyzer::new();
        let stats = analyzer.analyze(&block_of(-16384, 1024));
        assert_eq!(stats.rms, 0.5);
    }

    #[test]
    fn falling_peak_decays_from_previous_value() {
        let mut analyzer = FrameAnalyzer::new();
        analyzer.analyze(&block_of(-32768, 64)); // last_peak = 1.0

        let stats = analyzer.analyze(&block_of(0, 64));
        assert_eq!(stats.peak, 0.875);

        // Decay compounds from the stored peak, not the raw one.
        let stats = analyzer.analyze(&block_of(0, 64));
        assert_eq!(stats.peak, 0.875 * 0.875);
    }

    #[test]
    fn silent_run_decays_geometrically_toward_zero() {
        let mut analyzer = FrameAnalyzer::new();
        analyzer.analyze(&block_of(-32768, 64));

        let mut previous = 1.0f32;
        for _ in 0..200 {
            let stats = analyzer.analyze(&block_of(0, 64));
            assert!(stats.peak < previous);
            assert!(stats.peak > 0.0);
            previous = stats.peak;
        }
    }

    #[test]
    fn rising_peak_is_not_smoothed() {
        let mut analyzer = FrameAnalyzer::new();
        analyzer.analyze(&block_of(8192, 64)); // 0.25

        let stats = analyzer.analyze(&block_of(16384, 64)); // 0.5
        assert_eq!(stats.peak, 0.5);

        // Equal raw peak also passes through unchanged.
        let stats = analyzer.analyze(&block_of(16384, 64));
        assert_eq!(stats.peak, 0.5);
    }

    #[test]
    fn trailing_odd_byte_is_ignored() {
        let mut analyzer = FrameAnalyzer::new();
        let mut bytes = block_of(16384, 8);
        bytes.push(0xFF);

        let stats = analyzer.analyze(&bytes);
        assert_eq!(stats.rms, 0.5);
        assert_eq!(stats.peak, 0.5);
    }

    #[test]
    fn empty_block_yields_zero_stats() {
        let mut analyzer = FrameAnalyzer::new();
        let stats = analyzer.analyze(&[]);
        assert_eq!(stats.rms, 0.0);
        assert_eq!(stats.peak, 0.0);
    }

    #[test]
    fn mixed_block_peak_is_max_absolute_sample() {
        let mut analyzer = FrameAnalyzer::new();
        let mut bytes = Vec::new();
        for raw in [100i16, -8192, 4096, -100] {
            bytes.extend_from_slice(&raw.to_le_bytes());
        }

        let stats = analyzer.analyze(&bytes);
        assert_eq!(stats.peak, 8192.0 / 32768.0);
    }
}
