//! Frame timing for the window host.
//!
//! The engine advances its ambient timers by whatever delta it is handed, so
//! the host measures real frame time here and caps it: a window that was
//! minimized or dragged for a few seconds should resume smoothly instead of
//! jumping the growth timers forward.
//!
//! ```ignore
//! let mut time = Time::new();
//! // each redraw
//! let delta = time.update();
//! engine.frame(&mut renderer, delta);
//! ```

use std::time::{Duration, Instant};

/// Longest delta a single frame may report.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Measures time between frames.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    delta: Duration,
    max_delta: Duration,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    paused: bool,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            max_delta: MAX_FRAME_DELTA,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            paused: false,
        }
    }

    /// Use a different delta cap.
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Start a new frame and return its (capped) delta. Zero while paused.
    pub fn update(&mut self) -> Duration {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.delta = if self.paused {
            Duration::ZERO
        } else {
            raw.min(self.max_delta)
        };
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= Duration::from_millis(500) {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.delta(), Duration::ZERO);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let delta = time.update();
        assert!(delta >= Duration::from_millis(10));
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_delta_is_capped() {
        let mut time = Time::new().with_max_delta(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(time.update(), Duration::from_millis(5));
    }

    #[test]
    fn test_time_pause() {
        let mut time = Time::new();
        time.pause();
        thread::sleep(Duration::from_millis(10));
        assert_eq!(time.update(), Duration::ZERO);

        time.toggle_pause();
        assert!(!time.is_paused());
    }
}
