//! Fixed-timestep frame loop.
//!
//! The globe and the stars turn by a fixed angle per update step, so the
//! update rate is pinned at 60 Hz no matter how fast the display refreshes.
//! An accumulator decides how many steps each rendered frame owes.

use std::time::Instant;
use tracing::warn;

/// Fixed update step: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame time fed into the accumulator.
/// A stalled frame (window drag, debugger) is clamped rather than replayed.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator-driven fixed-rate update loop.
pub struct FrameLoop {
    previous_time: Instant,
    accumulator: f64,
    frame_count: u64,
    update_count: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Wall-clock seconds since the previous call, unclamped.
    ///
    /// Warns when the frame is long enough to be clamped by [`Self::advance`].
    pub fn measure_frame_time(&mut self) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;

        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
        }
        frame_time
    }

    /// Feeds a frame time into the accumulator and runs the owed updates.
    ///
    /// `update_fn(fixed_dt)` runs zero or more times. Returns the number of
    /// steps taken this frame.
    pub fn advance(&mut self, frame_time: f64, mut update_fn: impl FnMut(f64)) -> u32 {
        self.accumulator += frame_time.clamp(0.0, MAX_FRAME_TIME);

        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT);
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
            steps += 1;
        }

        self.frame_count += 1;
        steps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
