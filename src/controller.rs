//! Public start/stop lifecycle of the wind overlay.
//!
//! A [`Controller`] is the long-lived object a host keeps next to its map.
//! The map reports every `load`, `resize`, `move` and `zoom` as a
//! [`ViewportSnapshot`]; the controller validates it, derives the
//! zoom-dependent [`StartOptions`] and restarts the animation. Frames are
//! driven by a [`FrameScheduler`] so the host decides when drawing happens.
//!
//! ```ignore
//! let grid = Arc::new(VectorGrid::load("wind.json")?);
//! let mut controller = Controller::new(grid, RendererConfig::default(), ManualScheduler::new());
//! controller.on_viewport_change(&snapshot)?;
//! while controller.pump() {
//!     upload(controller.canvas().as_bytes());
//! }
//! ```

use std::sync::Arc;

use glam::DVec2;

use crate::animator::Animator;
use crate::canvas::Canvas;
use crate::config::RendererConfig;
use crate::error::ViewportError;
use crate::grid::VectorGrid;
use crate::scheduler::{FrameScheduler, FrameToken, ManualScheduler};
use crate::viewport::{GeoBounds, Viewport, ViewportSnapshot};

/// Stroke width for a map zoom level.
///
/// Zoomed-in views get thinner lines so dense trails stay readable.
pub fn particle_width_for_zoom(zoom: f64) -> f32 {
    if zoom > 6.0 {
        0.05
    } else if zoom > 5.0 {
        0.07
    } else if zoom > 4.0 {
        0.2
    } else if zoom > 3.0 {
        0.4
    } else if zoom > 2.0 {
        0.6
    } else {
        0.8
    }
}

/// Particle density multiplier for a map zoom level.
///
/// Continental views show fewer particles per pixel.
pub fn density_scale_for_zoom(zoom: f64) -> f64 {
    if zoom < 3.0 {
        0.75
    } else {
        1.0
    }
}

/// Per-start rendering options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartOptions {
    /// Stroke width; the configured default when `None`.
    pub particle_line_width: Option<f32>,
    /// Pixels per (m/s) per frame; derived from the viewport area when `None`.
    pub velocity_scale: Option<f64>,
    /// Multiplier on the configured particle density.
    pub density_scale: f64,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            particle_line_width: None,
            velocity_scale: None,
            density_scale: 1.0,
        }
    }
}

impl StartOptions {
    /// Options the map glue uses for `zoom`.
    pub fn for_zoom(zoom: f64) -> Self {
        Self {
            particle_line_width: Some(particle_width_for_zoom(zoom)),
            velocity_scale: None,
            density_scale: density_scale_for_zoom(zoom),
        }
    }
}

/// Drives one animated wind overlay.
#[derive(Debug)]
pub struct Controller<S: FrameScheduler> {
    grid: Arc<VectorGrid>,
    config: RendererConfig,
    animator: Animator,
    scheduler: S,
    pending: Option<FrameToken>,
    /// Viewport and options of the running animation.
    current: Option<(Viewport, StartOptions)>,
}

impl<S: FrameScheduler> Controller<S> {
    pub fn new(grid: Arc<VectorGrid>, config: RendererConfig, scheduler: S) -> Self {
        let animator = Animator::new(&config);
        Self {
            grid,
            config,
            animator,
            scheduler,
            pending: None,
            current: None,
        }
    }

    /// Place particles deterministically from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.animator = self.animator.with_seed(seed);
        self
    }

    /// Step with a fixed multiplier instead of measured frame time.
    pub fn set_fixed_delta_scale(&mut self, scale: Option<f32>) {
        self.animator.set_fixed_delta_scale(scale);
    }

    /// Start animating over `bounds` shown in the given pixel rectangle.
    ///
    /// A running animation is stopped first. An invalid viewport leaves
    /// the current state untouched and is reported as an error.
    pub fn start(
        &mut self,
        origin: DVec2,
        width: u32,
        height: u32,
        bounds: GeoBounds,
        options: StartOptions,
    ) -> Result<(), ViewportError> {
        let viewport = Viewport::new(origin, width, height, bounds).map_err(|e| {
            log::warn!("ignoring start with invalid viewport: {}", e);
            e
        })?;
        self.start_viewport(viewport, options);
        Ok(())
    }

    fn start_viewport(&mut self, viewport: Viewport, options: StartOptions) {
        self.stop();

        let density = self.config.particle_multiplier * options.density_scale.max(0.0);
        let count = (viewport.pixel_area() * density).round() as usize;
        let velocity_scale = options
            .velocity_scale
            .unwrap_or_else(|| self.config.velocity_scale * viewport.bounds.area().powf(0.4));
        let line_width = options.particle_line_width.unwrap_or(self.config.particle_line_width);

        self.animator.start(viewport, count, velocity_scale, line_width);
        self.pending = Some(self.scheduler.schedule_next_frame());
        self.current = Some((viewport, options));
    }

    /// Stop animating. Safe to call repeatedly or before any start.
    pub fn stop(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
        self.animator.stop();
        self.current = None;
    }

    /// Draw the frame identified by `token`.
    ///
    /// Returns `false` without drawing when `token` is not the pending
    /// frame, e.g. one scheduled before the last restart.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.pending != Some(token) {
            log::trace!("ignoring stale frame {:?}", token);
            return false;
        }
        self.pending = None;
        if self.animator.frame(&self.grid).is_none() {
            return false;
        }
        self.pending = Some(self.scheduler.schedule_next_frame());
        true
    }

    /// React to a map event.
    ///
    /// Width and particle density follow the snapshot's zoom. A snapshot
    /// identical to the running one keeps the animation as it is.
    pub fn on_viewport_change(&mut self, snapshot: &ViewportSnapshot) -> Result<(), ViewportError> {
        let viewport = snapshot.validate().map_err(|e| {
            log::warn!("ignoring viewport change: {}", e);
            e
        })?;
        let options = StartOptions::for_zoom(snapshot.zoom);
        if self.is_running() && self.current == Some((viewport, options)) {
            return Ok(());
        }
        self.start_viewport(viewport, options);
        Ok(())
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.animator.is_running()
    }

    /// The trail canvas.
    #[inline]
    pub fn canvas(&self) -> &Canvas {
        self.animator.canvas()
    }

    /// Live particle count, zero while stopped.
    pub fn population_len(&self) -> usize {
        self.animator.population().map_or(0, |p| p.len())
    }

    /// Viewport of the running animation.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.current.as_ref().map(|(viewport, _)| viewport)
    }

    /// The frame a host should deliver next.
    #[inline]
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending
    }

    #[inline]
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    #[inline]
    pub fn grid(&self) -> &Arc<VectorGrid> {
        &self.grid
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl Controller<ManualScheduler> {
    /// Deliver the next due frame, if any. Returns whether a frame was drawn.
    pub fn pump(&mut self) -> bool {
        match self.scheduler.take_due() {
            Some(token) => self.on_frame(token),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller<ManualScheduler> {
        let bounds = GeoBounds::from_corners([0.0, 0.0], [10.0, 10.0]);
        let grid = VectorGrid::new(2, 2, bounds, vec![1.0; 4], vec![0.5; 4]).unwrap();
        let mut c = Controller::new(Arc::new(grid), RendererConfig::default(), ManualScheduler::new()).with_seed(1);
        c.set_fixed_delta_scale(Some(1.0));
        c
    }

    fn unit_bounds() -> GeoBounds {
        GeoBounds::from_corners([0.0, 0.0], [10.0, 10.0])
    }

    #[test]
    fn test_width_policy() {
        assert_eq!(particle_width_for_zoom(7.0), 0.05);
        assert_eq!(particle_width_for_zoom(6.0), 0.07);
        assert_eq!(particle_width_for_zoom(5.5), 0.07);
        assert_eq!(particle_width_for_zoom(5.0), 0.2);
        assert_eq!(particle_width_for_zoom(4.0), 0.4);
        assert_eq!(particle_width_for_zoom(3.0), 0.6);
        assert_eq!(particle_width_for_zoom(2.0), 0.8);
        assert_eq!(particle_width_for_zoom(1.0), 0.8);
    }

    #[test]
    fn test_width_policy_is_monotonic() {
        let mut last = f32::INFINITY;
        for i in 0..=40 {
            let w = particle_width_for_zoom(i as f64 * 0.25);
            assert!(w <= last);
            last = w;
        }
    }

    #[test]
    fn test_population_size() {
        let mut c = controller();
        c.start(DVec2::ZERO, 300, 200, unit_bounds(), StartOptions::default()).unwrap();
        assert_eq!(c.population_len(), 200);

        let half = StartOptions {
            density_scale: 0.5,
            ..Default::default()
        };
        c.start(DVec2::ZERO, 300, 200, unit_bounds(), half).unwrap();
        assert_eq!(c.population_len(), 100);
        assert_eq!(c.grid().dimensions(), (2, 2));
    }

    #[test]
    fn test_stale_token_ignored() {
        let mut c = controller();
        c.start(DVec2::ZERO, 100, 100, unit_bounds(), StartOptions::default()).unwrap();
        let first = c.pending_frame().unwrap();
        c.start(DVec2::ZERO, 100, 100, unit_bounds(), StartOptions::default()).unwrap();
        assert!(!c.on_frame(first));
        assert_eq!(c.scheduler().pending_count(), 1);
        assert!(c.pump());
    }

    #[test]
    fn test_invalid_start_keeps_running_state() {
        let mut c = controller();
        c.start(DVec2::ZERO, 100, 100, unit_bounds(), StartOptions::default()).unwrap();
        let err = c.start(DVec2::ZERO, 0, 100, unit_bounds(), StartOptions::default());
        assert_eq!(err, Err(ViewportError::EmptyExtent));
        assert!(c.is_running());
        assert!(c.pump());
    }

    #[test]
    fn test_explicit_velocity_scale() {
        let mut c = controller();
        let options = StartOptions {
            velocity_scale: Some(0.25),
            ..Default::default()
        };
        c.start(DVec2::ZERO, 100, 100, unit_bounds(), options).unwrap();
        let scale = c.animator().population().map(|p| p.velocity_scale());
        assert_eq!(scale, Some(0.25));
    }

    #[test]
    fn test_derived_velocity_scale_grows_with_area() {
        let mut c = controller();
        c.start(DVec2::ZERO, 100, 100, unit_bounds(), StartOptions::default()).unwrap();
        let small = c.animator().population().map(|p| p.velocity_scale()).unwrap();
        let wide = GeoBounds::from_corners([0.0, 0.0], [40.0, 40.0]);
        c.start(DVec2::ZERO, 100, 100, wide, StartOptions::default()).unwrap();
        let large = c.animator().population().map(|p| p.velocity_scale()).unwrap();
        assert!((small - 0.011 * 100f64.powf(0.4)).abs() < 1e-12);
        assert!(large > small);
    }

    #[test]
    fn test_identical_snapshot_keeps_animation() {
        let mut c = controller();
        let snap = ViewportSnapshot::new(100, 100, unit_bounds(), 5.0);
        c.on_viewport_change(&snap).unwrap();
        let token = c.pending_frame();
        c.on_viewport_change(&snap).unwrap();
        assert_eq!(c.pending_frame(), token);
        assert_eq!(c.animator().line_width(), Some(0.2));
    }
}
