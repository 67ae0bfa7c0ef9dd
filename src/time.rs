//! Frame clock.
//!
//! Tracks wall-clock delta time and cumulative elapsed time for the frame loop.
//! Elapsed time is accumulated from deltas, so it is monotonic non-decreasing
//! regardless of whether ticks come from the wall clock or from [`Time::advance`].
//!
//! # Example
//!
//! ```ignore
//! use trailfx::time::Time;
//!
//! let mut time = Time::new();
//!
//! // Once per display refresh:
//! let frame = time.update();
//!
//! println!("Elapsed: {:.2}s", frame.elapsed_time);
//! println!("Delta: {:.4}s", frame.delta_time);
//! println!("FPS: {:.1}", time.fps());
//! ```

use std::time::{Duration, Instant};

/// Timing snapshot produced by one tick of the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameState {
    /// Seconds since the previous tick (always `>= 0`).
    pub delta_time: f32,
    /// Seconds accumulated since the clock started.
    pub elapsed_time: f32,
}

/// Frame clock for the render loop.
///
/// Provides delta time, elapsed time, a frame counter and a periodic FPS
/// estimate.
#[derive(Debug)]
pub struct Time {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds.
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Seconds accumulated since last FPS update.
    fps_accum: f32,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_accum: 0.0,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
        }
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn update(&mut self) -> FrameState {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(self.fixed_delta.unwrap_or(raw_delta))
    }

    /// Advance the clock by an explicit delta in seconds.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn advance(&mut self, delta: f32) -> FrameState {
        self.delta_secs = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        self.fps_accum += self.delta_secs;
        if self.fps_accum >= self.fps_update_interval.as_secs_f32() {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / self.fps_accum;
            self.fps_frame_count = self.frame_count;
            self.fps_accum = 0.0;
        }

        self.state()
    }

    /// Current timing snapshot without advancing.
    #[inline]
    pub fn state(&self) -> FrameState {
        FrameState {
            delta_time: self.delta_secs,
            elapsed_time: self.elapsed_secs,
        }
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds (delta time).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
