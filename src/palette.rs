//! Speed-bucketed stroke colors.
//!
//! Particles are not colored individually. Every frame they are sorted into
//! a small number of buckets by wind speed, and each bucket is stroked in a
//! single color. A [`ColorScale`] turns a [`Palette`] into those bucket
//! colors and picks the bucket for a speed.
//!
//! ```ignore
//! let scale = ColorScale::new(Palette::Wind, 15, 0.9);
//! let bucket = scale.bucket_for(speed, grid.magnitude_range());
//! let color = scale.color(bucket);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::canvas::Rgba;

/// Pre-defined color palettes for particle strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Calm blue through yellow to storm red (default).
    #[default]
    Wind,

    /// Gray ramp from dim to white; brighter means faster.
    Intensity,

    /// Viridis - perceptually uniform, colorblind-friendly (purple to yellow).
    Viridis,

    /// Magma - perceptually uniform (black to yellow through red).
    Magma,

    /// Grayscale - black to white.
    Grayscale,
}

impl Palette {
    /// Color stops for this palette, slowest first.
    pub fn colors(&self) -> Vec<Vec3> {
        match self {
            Palette::Wind => [
                [36, 104, 180],
                [60, 157, 194],
                [128, 205, 193],
                [151, 218, 168],
                [198, 231, 181],
                [238, 247, 217],
                [255, 238, 159],
                [252, 217, 125],
                [255, 182, 100],
                [252, 150, 75],
                [250, 112, 52],
                [245, 64, 32],
                [237, 45, 28],
                [220, 24, 32],
                [180, 0, 35],
            ]
            .iter()
            .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32) / 255.0)
            .collect(),
            Palette::Intensity => vec![Vec3::splat(85.0 / 255.0), Vec3::ONE],
            Palette::Viridis => vec![
                Vec3::new(0.267, 0.004, 0.329), // Dark purple
                Vec3::new(0.282, 0.140, 0.458), // Purple
                Vec3::new(0.127, 0.566, 0.551), // Teal
                Vec3::new(0.369, 0.789, 0.383), // Green
                Vec3::new(0.993, 0.906, 0.144), // Yellow
            ],
            Palette::Magma => vec![
                Vec3::new(0.001, 0.0, 0.014),   // Black
                Vec3::new(0.329, 0.071, 0.435), // Purple
                Vec3::new(0.716, 0.215, 0.475), // Pink
                Vec3::new(0.994, 0.541, 0.380), // Orange
                Vec3::new(0.987, 0.991, 0.749), // Light yellow
            ],
            Palette::Grayscale => vec![Vec3::ZERO, Vec3::ONE],
        }
    }

    /// Linearly interpolated color at `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let stops = self.colors();
        let last = stops.len() - 1;
        let x = t.clamp(0.0, 1.0) * last as f32;
        let i = (x.floor() as usize).min(last);
        let j = (i + 1).min(last);
        stops[i].lerp(stops[j], x - i as f32)
    }
}

/// Discrete bucket colors derived from a palette.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    colors: Vec<Rgba>,
}

impl ColorScale {
    /// Sample `buckets` evenly spaced colors from `palette`.
    ///
    /// `opacity` (0.0-1.0) becomes the stroke alpha. At least one bucket is
    /// always created.
    pub fn new(palette: Palette, buckets: usize, opacity: f32) -> Self {
        let n = buckets.max(1);
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let colors = (0..n)
            .map(|i| {
                let t = if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
                let c = (palette.sample(t) * 255.0).round();
                Rgba::new(c.x as u8, c.y as u8, c.z as u8, alpha)
            })
            .collect();
        Self { colors }
    }

    /// Number of buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a scale has at least one bucket.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Stroke color for a bucket.
    #[inline]
    pub fn color(&self, bucket: usize) -> Rgba {
        self.colors[bucket.min(self.colors.len() - 1)]
    }

    /// Bucket for `speed` relative to the field's `(min, max)` speed range.
    ///
    /// Speeds outside the range clamp to the first or last bucket; an empty
    /// range puts everything in bucket 0.
    pub fn bucket_for(&self, speed: f32, range: (f32, f32)) -> usize {
        let (min, max) = range;
        let last = self.colors.len() - 1;
        if !(max > min) || !speed.is_finite() {
            return 0;
        }
        let t = ((speed - min) / (max - min)) * last as f32;
        (t.round().max(0.0) as usize).min(last)
    }
}
