//! Per-frame integration and trail rendering.
//!
//! The [`Animator`] is a two-state machine:
//!
//! - **Idle**: no particles, transparent canvas.
//! - **Running**: a [`Population`] bound to one [`CoordinateMapper`]. Each
//!   [`frame`](Animator::frame) steps the population, fades the canvas and
//!   strokes every particle's newest segment, grouped into one pass per
//!   speed bucket.
//!
//! Calling [`start`](Animator::start) while running stops first, so there is
//! never more than one population.

use glam::DVec2;

use crate::canvas::Canvas;
use crate::config::RendererConfig;
use crate::grid::VectorGrid;
use crate::mapper::CoordinateMapper;
use crate::palette::ColorScale;
use crate::particle::{Population, StepStats};
use crate::time::FrameClock;
use crate::viewport::Viewport;

/// Observable animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running,
}

#[derive(Debug)]
enum State {
    Idle,
    Running {
        mapper: CoordinateMapper,
        population: Population,
        line_width: f32,
    },
}

/// Owns the particle population and the trail canvas.
#[derive(Debug)]
pub struct Animator {
    state: State,
    canvas: Canvas,
    clock: FrameClock,
    colors: ColorScale,
    fade_opacity: f32,
    max_particle_age: u32,
    trail_length: usize,
    seed: Option<u64>,
    /// Segments per speed bucket, reused across frames.
    buckets: Vec<Vec<(DVec2, DVec2)>>,
}

impl Animator {
    pub fn new(config: &RendererConfig) -> Self {
        let colors = ColorScale::new(config.palette, config.color_buckets, config.stroke_opacity);
        let buckets = vec![Vec::new(); colors.len()];
        Self {
            state: State::Idle,
            canvas: Canvas::new(0, 0),
            clock: FrameClock::new(config.frame_rate, config.max_delta_scale),
            colors,
            fade_opacity: config.fade_opacity,
            max_particle_age: config.max_particle_age,
            trail_length: config.trail_length,
            seed: None,
            buckets,
        }
    }

    /// Use deterministic particle placement from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Step with a fixed multiplier instead of measured frame time.
    pub fn set_fixed_delta_scale(&mut self, scale: Option<f32>) {
        self.clock.set_fixed_delta_scale(scale);
    }

    /// Enter Running with a fresh mapper and population.
    pub fn start(&mut self, viewport: Viewport, particle_count: usize, velocity_scale: f64, line_width: f32) {
        if self.is_running() {
            self.stop();
        }
        let mut population = match self.seed {
            Some(seed) => Population::with_seed(self.max_particle_age, self.trail_length, velocity_scale, seed),
            None => Population::new(self.max_particle_age, self.trail_length, velocity_scale),
        };
        population.seed(&viewport, particle_count);
        self.canvas.resize(viewport.width, viewport.height);
        self.clock.reset();
        log::debug!(
            "animation started: {}x{} px, {} particles, velocity scale {:.5}, line width {}",
            viewport.width,
            viewport.height,
            particle_count,
            velocity_scale,
            line_width
        );
        self.state = State::Running {
            mapper: CoordinateMapper::new(viewport),
            population,
            line_width,
        };
    }

    /// Advance and draw one frame. Returns `None` while idle.
    pub fn frame(&mut self, grid: &VectorGrid) -> Option<StepStats> {
        let State::Running { mapper, population, line_width } = &mut self.state else {
            return None;
        };
        let delta = self.clock.tick();
        let stats = population.step(grid, mapper, delta);

        for bucket in &mut self.buckets {
            bucket.clear();
        }
        let range = grid.magnitude_range();
        let origin = mapper.viewport().origin;
        for p in population.iter() {
            if let Some((from, to)) = p.segment() {
                let bucket = self.colors.bucket_for(p.speed, range);
                self.buckets[bucket].push((from - origin, to - origin));
            }
        }

        self.canvas.fade(self.fade_opacity);
        for (i, segments) in self.buckets.iter().enumerate() {
            let color = self.colors.color(i);
            for &(from, to) in segments {
                self.canvas.stroke_segment(from, to, color, *line_width);
            }
        }

        log::trace!(
            "frame {}: moved {}, respawned {}, scale {:.2}",
            self.clock.frame(),
            stats.moved,
            stats.respawned,
            delta
        );
        Some(stats)
    }

    /// Return to Idle: clear the canvas and release the particles.
    pub fn stop(&mut self) {
        if let State::Running { population, .. } = &self.state {
            log::debug!("animation stopped after {} frames ({} particles)", self.clock.frame(), population.len());
        }
        self.state = State::Idle;
        self.canvas.clear();
    }

    pub fn state(&self) -> AnimationState {
        match self.state {
            State::Idle => AnimationState::Idle,
            State::Running { .. } => AnimationState::Running,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state() == AnimationState::Running
    }

    /// The trail canvas, sized to the last started viewport.
    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The running population, if any.
    pub fn population(&self) -> Option<&Population> {
        match &self.state {
            State::Running { population, .. } => Some(population),
            State::Idle => None,
        }
    }

    /// The running mapper, if any.
    pub fn mapper(&self) -> Option<&CoordinateMapper> {
        match &self.state {
            State::Running { mapper, .. } => Some(mapper),
            State::Idle => None,
        }
    }

    /// Stroke width of the running animation.
    pub fn line_width(&self) -> Option<f32> {
        match self.state {
            State::Running { line_width, .. } => Some(line_width),
            State::Idle => None,
        }
    }
}
