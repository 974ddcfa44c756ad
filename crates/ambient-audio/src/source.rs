use std::thread;
use std::time::Duration;

use crate::ring_buffer::ByteConsumer;

/// Fixed byte length of one capture block.
pub const BLOCK_BYTES: usize = 2048;

/// Blocking producer of raw audio blocks.
///
/// `next_block` fills `buf` with the next block, blocking until enough
/// data has arrived. It returns the number of bytes written (up to
/// `buf.len()`; a short block can only happen at stream end) or `None`
/// once the stream has ended and nothing remains to drain. There is no
/// retry: end-of-stream is permanent.
pub trait SampleSource: Send {
    fn next_block(&mut self, buf: &mut [u8]) -> Option<usize>;
}

/// Assembles fixed-size blocks out of the capture ring buffer.
pub struct RingBufferSource {
    consumer: ByteConsumer,
    poll: Duration,
}

impl RingBufferSource {
    pub fn new(consumer: ByteConsumer) -> Self {
        Self {
            consumer,
            poll: Duration::from_millis(5),
        }
    }
}

impl SampleSource for RingBufferSource {
    fn next_block(&mut self, buf: &mut [u8]) -> Option<usize> {
        let mut filled = 0;
        loop {
            filled += self.consumer.read(&mut buf[filled..]);
            if filled == buf.len() {
                return Some(filled);
            }
            if self.consumer.is_closed() && self.consumer.slots() == 0 {
                // Capture side is gone; hand back whatever was left.
                return if filled > 0 { Some(filled) } else { None };
            }
            // One 2048-byte block spans ~23ms at 44.1kHz mono i16, so a
            // 5ms poll checks several times per block without spinning.
            thread::sleep(self.poll);
        }
    }
}
