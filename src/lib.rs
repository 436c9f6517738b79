//! # windtrail - animated wind particles for map overlays
//!
//! Renders a gridded wind field as thousands of short-lived particles whose
//! fading trails follow the flow, in sync with a panning and zooming map.
//!
//! windtrail handles interpolation, projection, particle aging and trail
//! drawing. The host only reports what its map shows and delivers frames.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use windtrail::prelude::*;
//!
//! let grid = Arc::new(VectorGrid::load("wind.json")?);
//! let mut controller = Controller::new(grid, RendererConfig::default(), ManualScheduler::new());
//!
//! // Map `load` / `resize` / `move` / `zoom`:
//! let bounds = GeoBounds::from_corners([60.0, 24.0], [78.0, 37.0]);
//! controller.on_viewport_change(&ViewportSnapshot::new(1280, 720, bounds, 5.0))?;
//!
//! // Frame loop:
//! while controller.pump() {
//!     draw(controller.canvas().as_bytes());
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Grid Field
//!
//! [`VectorGrid`] holds `u`/`v` wind components on a regular lat/lon grid and
//! answers [`VectorGrid::sample`] with a bilinear [`Sample::Wind`], or
//! [`Sample::NoData`] outside coverage and next to missing cells.
//!
//! ### Viewport and Mapper
//!
//! A [`ViewportSnapshot`] is what the map reports. Once validated it becomes a
//! [`Viewport`], and a [`CoordinateMapper`] converts between its pixels and
//! degrees. A new viewport always means a new mapper.
//!
//! ### Particles
//!
//! A [`Population`] keeps a fixed number of particles in pixel space. Each
//! step moves them by the sampled wind and respawns those that age out, hit
//! missing data or leave the viewport.
//!
//! ### Animation
//!
//! The [`Animator`] steps the population, fades the [`Canvas`] and strokes
//! each particle's newest segment in a color picked by speed. The
//! [`Controller`] owns it and ties it to map events and a [`FrameScheduler`].
//!
//! ## Zoom Policy
//!
//! | Zoom | Line width |
//! |------|------------|
//! | > 6 | 0.05 |
//! | > 5 | 0.07 |
//! | > 4 | 0.2 |
//! | > 3 | 0.4 |
//! | > 2 | 0.6 |
//! | otherwise | 0.8 |

pub mod animator;
pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod mapper;
pub mod palette;
pub mod particle;
pub mod scheduler;
pub mod synthetic;
pub mod time;
pub mod viewer;
pub mod viewport;

pub use animator::{AnimationState, Animator};
pub use canvas::{Canvas, Rgba};
pub use config::RendererConfig;
pub use controller::{density_scale_for_zoom, particle_width_for_zoom, Controller, StartOptions};
pub use error::{ConfigError, GpuError, GridError, SnapshotError, ViewerError, ViewportError};
pub use glam::{DVec2, Vec2};
pub use grid::{Sample, VectorGrid};
pub use mapper::CoordinateMapper;
pub use palette::{ColorScale, Palette};
pub use particle::{Particle, Population, StepStats};
pub use scheduler::{FrameScheduler, FrameToken, ManualScheduler};
pub use synthetic::Cyclone;
pub use time::FrameClock;
pub use viewport::{GeoBounds, Viewport, ViewportSnapshot};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use windtrail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, Rgba};
    pub use crate::config::RendererConfig;
    pub use crate::controller::{particle_width_for_zoom, Controller, StartOptions};
    pub use crate::grid::{Sample, VectorGrid};
    pub use crate::palette::Palette;
    pub use crate::scheduler::{FrameScheduler, FrameToken, ManualScheduler};
    pub use crate::viewport::{GeoBounds, ViewportSnapshot};
    pub use crate::{DVec2, Vec2};
}
