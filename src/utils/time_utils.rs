use std::time::Instant;

/// Wall-clock stopwatch for stage timings.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seconds between consecutive extracted frames.
pub fn frame_delta(frame_rate: u32) -> f64 {
    1.0 / frame_rate as f64
}
