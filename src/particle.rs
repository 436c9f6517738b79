//! Particle population advected through a wind field.
//!
//! Particles live in pixel space. Each step converts a particle's pixel
//! position to geographic coordinates, samples the [`VectorGrid`] there and
//! moves the particle by the wind vector. Particles that age out, land on
//! missing data or leave the viewport are respawned at a random pixel, so
//! the population size never changes between [`Population::seed`] calls.

use std::collections::VecDeque;

use glam::DVec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::grid::{Sample, VectorGrid};
use crate::mapper::CoordinateMapper;
use crate::viewport::Viewport;

/// A single animated particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Current pixel position.
    pub position: DVec2,
    /// Frames since spawn or last reset.
    pub age: u32,
    /// Wind speed at the last step (m/s), used for coloring.
    pub speed: f32,
    /// Previous positions, oldest first.
    trail: VecDeque<DVec2>,
}

impl Particle {
    fn new(position: DVec2) -> Self {
        Self {
            position,
            age: 0,
            speed: 0.0,
            trail: VecDeque::new(),
        }
    }

    /// Previous positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.trail.iter().copied()
    }

    /// The segment drawn this frame: last trail point to current position.
    ///
    /// `None` right after a spawn, when there is nothing to connect.
    pub fn segment(&self) -> Option<(DVec2, DVec2)> {
        self.trail.back().map(|&from| (from, self.position))
    }

    fn reset(&mut self, position: DVec2) {
        self.position = position;
        self.age = 0;
        self.speed = 0.0;
        self.trail.clear();
    }
}

/// Summary of one [`Population::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Particles that advanced along the field.
    pub moved: usize,
    /// Particles reset to a fresh random position.
    pub respawned: usize,
}

/// Fixed-size set of particles.
#[derive(Debug, Clone)]
pub struct Population {
    particles: Vec<Particle>,
    /// Particles older than this are respawned.
    max_age: u32,
    /// Previous positions kept per particle.
    trail_length: usize,
    /// Pixels per (m/s) per nominal frame.
    velocity_scale: f64,
    rng: SmallRng,
}

impl Population {
    /// Create an empty population seeded from system entropy.
    pub fn new(max_age: u32, trail_length: usize, velocity_scale: f64) -> Self {
        Self::from_rng(max_age, trail_length, velocity_scale, SmallRng::from_entropy())
    }

    /// Create an empty population with a deterministic random sequence.
    pub fn with_seed(max_age: u32, trail_length: usize, velocity_scale: f64, seed: u64) -> Self {
        Self::from_rng(max_age, trail_length, velocity_scale, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(max_age: u32, trail_length: usize, velocity_scale: f64, rng: SmallRng) -> Self {
        Self {
            particles: Vec::new(),
            max_age,
            trail_length: trail_length.max(1),
            velocity_scale,
            rng,
        }
    }

    /// Replace all particles with `count` fresh ones at random positions
    /// inside `viewport`.
    pub fn seed(&mut self, viewport: &Viewport, count: usize) {
        self.particles.clear();
        self.particles.reserve_exact(count);
        for _ in 0..count {
            let position = random_position(&mut self.rng, viewport);
            self.particles.push(Particle::new(position));
        }
    }

    /// Add one particle at `position` with age 0.
    pub fn spawn_at(&mut self, position: DVec2) {
        self.particles.push(Particle::new(position));
    }

    /// Advance every particle by one frame.
    ///
    /// `delta_time_scale` is the frame's length relative to the nominal
    /// frame (1.0 at the configured frame rate).
    pub fn step(&mut self, grid: &VectorGrid, mapper: &CoordinateMapper, delta_time_scale: f32) -> StepStats {
        let viewport = *mapper.viewport();
        let scale = self.velocity_scale * delta_time_scale as f64;
        let (max_age, trail_length) = (self.max_age, self.trail_length);
        let Self { particles, rng, .. } = self;

        let mut stats = StepStats::default();
        for p in particles.iter_mut() {
            if p.age > max_age {
                p.reset(random_position(rng, &viewport));
                stats.respawned += 1;
                continue;
            }

            let geo = mapper.pixel_to_geo(p.position.x, p.position.y);
            let Sample::Wind(uv) = grid.sample(geo.x, geo.y) else {
                p.reset(random_position(rng, &viewport));
                stats.respawned += 1;
                continue;
            };

            // v points north, pixel y grows south.
            let next = p.position + DVec2::new(uv.x as f64, -(uv.y as f64)) * scale;
            if !next.is_finite() || !mapper.contains_pixel(next) {
                p.reset(random_position(rng, &viewport));
                stats.respawned += 1;
                continue;
            }

            p.trail.push_back(p.position);
            while p.trail.len() > trail_length {
                p.trail.pop_front();
            }
            p.position = next;
            p.age += 1;
            p.speed = uv.length();
            stats.moved += 1;
        }
        stats
    }

    /// Pixels per (m/s) per nominal frame.
    #[inline]
    pub fn velocity_scale(&self) -> f64 {
        self.velocity_scale
    }

    /// Drop every particle and release the storage.
    pub fn clear(&mut self) {
        self.particles = Vec::new();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

fn random_position(rng: &mut SmallRng, viewport: &Viewport) -> DVec2 {
    viewport.origin
        + DVec2::new(
            rng.gen::<f64>() * viewport.width as f64,
            rng.gen::<f64>() * viewport.height as f64,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::GeoBounds;

    fn unit_viewport() -> Viewport {
        Viewport::new(DVec2::ZERO, 100, 100, GeoBounds::from_corners([0.0, 0.0], [1.0, 1.0])).unwrap()
    }

    fn uniform_grid(u: f32, v: f32) -> VectorGrid {
        VectorGrid::new(2, 2, GeoBounds::from_corners([0.0, 0.0], [1.0, 1.0]), vec![u; 4], vec![v; 4]).unwrap()
    }

    #[test]
    fn test_seed_inside_viewport() {
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let mut pop = Population::with_seed(90, 1, 1.0, 7);
        pop.seed(&vp, 500);
        assert_eq!(pop.len(), 500);
        for p in pop.iter() {
            assert!(mapper.contains_pixel(p.position));
            assert_eq!(p.age, 0);
            assert!(p.segment().is_none());
        }
    }

    #[test]
    fn test_eastward_wind_moves_right() {
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let grid = uniform_grid(1.0, 0.0);
        let mut pop = Population::with_seed(90, 1, 2.0, 1);
        pop.spawn_at(DVec2::new(50.0, 50.0));

        let stats = pop.step(&grid, &mapper, 1.0);
        assert_eq!(stats, StepStats { moved: 1, respawned: 0 });
        let p = pop.iter().next().unwrap();
        assert_eq!(p.position, DVec2::new(52.0, 50.0));
        assert_eq!(p.age, 1);
        assert_eq!(p.speed, 1.0);
        assert_eq!(p.segment(), Some((DVec2::new(50.0, 50.0), DVec2::new(52.0, 50.0))));
    }

    #[test]
    fn test_northward_wind_moves_up() {
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let grid = uniform_grid(0.0, 3.0);
        let mut pop = Population::with_seed(90, 1, 1.0, 1);
        pop.spawn_at(DVec2::new(50.0, 50.0));
        pop.step(&grid, &mapper, 0.5);
        assert_eq!(pop.iter().next().unwrap().position, DVec2::new(50.0, 48.5));
    }

    #[test]
    fn test_leaving_viewport_respawns_inside() {
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let grid = uniform_grid(1.0, 0.0);
        let mut pop = Population::with_seed(90, 1, 10.0, 3);
        pop.spawn_at(DVec2::new(99.0, 50.0));

        let stats = pop.step(&grid, &mapper, 1.0);
        assert_eq!(stats.respawned, 1);
        let p = pop.iter().next().unwrap();
        assert!(mapper.contains_pixel(p.position));
        assert_eq!(p.age, 0);
        assert!(p.segment().is_none());
    }

    #[test]
    fn test_no_data_respawns() {
        // Field covers only the western half of the viewport.
        let grid =
            VectorGrid::new(2, 2, GeoBounds::from_corners([0.0, 0.0], [0.5, 1.0]), vec![0.0; 4], vec![0.0; 4]).unwrap();
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let mut pop = Population::with_seed(90, 1, 1.0, 5);
        pop.spawn_at(DVec2::new(80.0, 50.0));
        pop.spawn_at(DVec2::new(20.0, 50.0));

        let stats = pop.step(&grid, &mapper, 1.0);
        assert_eq!(stats, StepStats { moved: 1, respawned: 1 });
    }

    #[test]
    fn test_old_particles_respawn() {
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let grid = uniform_grid(0.0, 0.0);
        let mut pop = Population::with_seed(3, 1, 1.0, 9);
        pop.spawn_at(DVec2::new(10.0, 10.0));

        let mut respawns = 0;
        for _ in 0..5 {
            respawns += pop.step(&grid, &mapper, 1.0).respawned;
        }
        // Ages 0..=3 step, then age 4 > 3 respawns.
        assert_eq!(respawns, 1);
        assert_eq!(pop.iter().next().unwrap().age, 0);
    }

    #[test]
    fn test_trail_is_bounded() {
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let grid = uniform_grid(1.0, 0.0);
        let mut pop = Population::with_seed(90, 3, 1.0, 2);
        pop.spawn_at(DVec2::new(10.0, 10.0));
        for _ in 0..10 {
            pop.step(&grid, &mapper, 1.0);
        }
        let p = pop.iter().next().unwrap();
        let trail: Vec<_> = p.trail().collect();
        assert_eq!(trail, vec![DVec2::new(17.0, 10.0), DVec2::new(18.0, 10.0), DVec2::new(19.0, 10.0)]);
        assert_eq!(p.position, DVec2::new(20.0, 10.0));
    }

    #[test]
    fn test_population_size_is_stable() {
        let vp = unit_viewport();
        let mapper = CoordinateMapper::new(vp);
        let grid = uniform_grid(5.0, -5.0);
        let mut pop = Population::with_seed(20, 1, 3.0, 11);
        pop.seed(&vp, 200);
        for _ in 0..100 {
            let stats = pop.step(&grid, &mapper, 1.0);
            assert_eq!(stats.moved + stats.respawned, 200);
        }
        assert_eq!(pop.len(), 200);
        assert!(pop.iter().all(|p| mapper.contains_pixel(p.position)));
    }

    #[test]
    fn test_clear_releases() {
        let vp = unit_viewport();
        let mut pop = Population::with_seed(90, 1, 1.0, 0);
        pop.seed(&vp, 10);
        pop.clear();
        assert!(pop.is_empty());
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let vp = unit_viewport();
        let mut a = Population::with_seed(90, 1, 1.0, 42);
        let mut b = Population::with_seed(90, 1, 1.0, 42);
        a.seed(&vp, 20);
        b.seed(&vp, 20);
        assert!(a.iter().zip(b.iter()).all(|(x, y)| x == y));
    }
}
