//! Frame rate tracking (zero-allocation ring buffer)
//!
//! Auto-rotation advances a fixed amount per frame, so the effective spin
//! speed is only knowable from the frame rate. The viewer feeds every tick
//! in here.

use std::time::Instant;

/// 2 seconds at 60fps
const CAPACITY: usize = 120;

/// Frame-time ring buffer with O(1) FPS
#[derive(Debug, Clone)]
pub struct StatsCollector {
    /// Frame deltas in ms
    frame_times: Vec<f32>,
    /// Next write index
    head: usize,
    /// Running sum of `frame_times`
    total_time: f32,
    /// Frames recorded, saturating at capacity
    filled: usize,
    last_frame: Option<Instant>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            frame_times: vec![0.0; CAPACITY],
            head: 0,
            total_time: 0.0,
            filled: 0,
            last_frame: None,
        }
    }

    /// Record a frame at the current instant.
    ///
    /// The first call only starts the clock.
    pub fn record_frame(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame.replace(now) {
            self.record_interval(now.duration_since(last).as_secs_f32() * 1000.0);
        }
    }

    /// Record one frame delta in milliseconds
    pub fn record_interval(&mut self, delta_ms: f32) {
        let old = self.frame_times[self.head];
        self.frame_times[self.head] = delta_ms;
        self.total_time = self.total_time - old + delta_ms;
        self.head = (self.head + 1) % self.frame_times.len();
        self.filled = (self.filled + 1).min(self.frame_times.len());
    }

    /// Average FPS over the recorded window, 0 before any frame
    pub fn fps(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }
        let avg_ms = self.total_time / self.filled as f32;
        if avg_ms > 0.001 {
            1000.0 / avg_ms
        } else {
            0.0
        }
    }

    pub fn capacity(&self) -> usize {
        self.frame_times.len()
    }

    /// Drop all samples
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
