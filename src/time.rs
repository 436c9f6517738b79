//! Frame timing for the animation loop.
//!
//! The particle step is tuned for a nominal frame rate: at that rate each
//! frame moves particles by `wind * velocity_scale`. A [`FrameClock`] turns
//! real frame intervals into the multiplier handed to
//! [`Population::step`](crate::particle::Population::step), so a dropped
//! frame advances particles twice as far instead of slowing the flow down.
//!
//! # Example
//!
//! ```ignore
//! use windtrail::time::FrameClock;
//!
//! let mut clock = FrameClock::new(20.0, 3.0);
//!
//! // Once per frame:
//! let scale = clock.tick();
//! population.step(&grid, &mapper, scale);
//!
//! println!("Frame: {} ({:.1} fps)", clock.frame(), clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Converts wall-clock frame intervals into step multipliers.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Nominal interval between frames.
    target_interval: Duration,
    /// Upper bound on the multiplier after a long stall.
    max_delta_scale: f32,
    /// When the last frame occurred.
    last_frame: Option<Instant>,
    /// Multiplier computed by the last tick.
    delta_scale: f32,
    /// Overrides the measured multiplier when set.
    fixed_delta_scale: Option<f32>,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Option<Instant>,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock for `frame_rate` frames per second.
    ///
    /// Non-positive rates fall back to 20 fps.
    pub fn new(frame_rate: f32, max_delta_scale: f32) -> Self {
        let rate = if frame_rate > 0.0 && frame_rate.is_finite() { frame_rate } else { 20.0 };
        Self {
            target_interval: Duration::from_nanos((1e9 / rate as f64).round() as u64),
            max_delta_scale: max_delta_scale.max(1.0),
            last_frame: None,
            delta_scale: 1.0,
            fixed_delta_scale: None,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: None,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Nominal interval between frames.
    #[inline]
    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }

    /// Advance one frame using the current time.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance one frame as if it happened at `now`.
    ///
    /// The first tick after construction or [`reset`](Self::reset) returns
    /// `1.0`. Later ticks return `elapsed / target_interval` clamped to
    /// `[0, max_delta_scale]`.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let measured = match self.last_frame {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last).as_secs_f32();
                elapsed / self.target_interval.as_secs_f32()
            }
            None => 1.0,
        };
        self.delta_scale = self
            .fixed_delta_scale
            .unwrap_or(measured)
            .clamp(0.0, self.max_delta_scale);
        self.last_frame = Some(now);
        self.frame_count += 1;

        let since = *self.fps_update_time.get_or_insert(now);
        let fps_elapsed = now.saturating_duration_since(since);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = Some(now);
        }

        self.delta_scale
    }

    /// Multiplier from the last tick.
    #[inline]
    pub fn delta_scale(&self) -> f32 {
        self.delta_scale
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

    /// Use a fixed multiplier for deterministic stepping.
    ///
    /// Pass `None` to go back to measured frame timing.
    pub fn set_fixed_delta_scale(&mut self, scale: Option<f32>) {
        self.fixed_delta_scale = scale;
    }

    /// Forget previous frames. The next tick returns `1.0`.
    pub fn reset(&mut self) {
        self.last_frame = None;
        self.delta_scale = 1.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(20.0, 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new(20.0, 3.0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.target_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_first_tick_is_nominal() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick_at(Instant::now()), 1.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_tick_scales_with_interval() {
        let mut clock = FrameClock::new(20.0, 3.0);
        let t0 = Instant::now();
        clock.tick_at(t0);
        let scale = clock.tick_at(t0 + Duration::from_millis(100));
        assert!((scale - 2.0).abs() < 1e-3);
        let scale = clock.tick_at(t0 + Duration::from_millis(125));
        assert!((scale - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FrameClock::new(20.0, 3.0);
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(10)), 3.0);
    }

    #[test]
    fn test_fixed_delta_scale() {
        let mut clock = FrameClock::default();
        clock.set_fixed_delta_scale(Some(0.5));
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(1)), 0.5);
        assert_eq!(clock.delta_scale(), 0.5);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::default();
        let t0 = Instant::now();
        clock.tick_at(t0);
        clock.tick_at(t0 + Duration::from_millis(200));
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn test_fps_updates() {
        let mut clock = FrameClock::new(20.0, 3.0);
        let t0 = Instant::now();
        for i in 0..=20 {
            clock.tick_at(t0 + Duration::from_millis(50 * i));
        }
        assert!((clock.fps() - 20.0).abs() < 1.0, "fps {}", clock.fps());
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        let clock = FrameClock::new(0.0, 3.0);
        assert_eq!(clock.target_interval(), Duration::from_millis(50));
    }
}
