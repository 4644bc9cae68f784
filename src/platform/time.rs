//! Frame clock
//!
//! Timestamps are monotonic seconds (`performance.now() / 1000` in the
//! browser, `Instant` based natively).

use std::fmt;

use crate::consts::MAX_FRAME_DELTA;

/// Frame rate over the last reporting window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsReport {
    pub fps: u32,
    pub ms_per_frame: f64,
}

impl fmt::Display for FpsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FPS: {} ({:.2} ms/frame)", self.fps, self.ms_per_frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Seconds to simulate this frame, clamped to [0, MAX_FRAME_DELTA]
    pub delta: f32,
    /// Present once per second
    pub fps: Option<FpsReport>,
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    last: f64,
    window_start: f64,
    window_frames: u32,
}

impl FrameClock {
    pub fn new(start: f64) -> Self {
        Self {
            last: start,
            window_start: start,
            window_frames: 0,
        }
    }

    /// Record a frame at `now`
    pub fn tick(&mut self, now: f64) -> FrameTiming {
        // A stalled tab or a debugger pause must not tunnel the bird
        // through a pipe
        let delta = ((now - self.last) as f32).clamp(0.0, MAX_FRAME_DELTA);
        self.last = now;

        self.window_frames += 1;
        let window = now - self.window_start;
        let fps = if window >= 1.0 {
            let report = FpsReport {
                fps: self.window_frames,
                ms_per_frame: window * 1000.0 / self.window_frames as f64,
            };
            self.window_start = now;
            self.window_frames = 0;
            Some(report)
        } else {
            None
        };

        FrameTiming { delta, fps }
    }
}
