//! Renderer tuning, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "fade_opacity": 0.95, "palette": "viridis" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::palette::Palette;

/// Tunable constants of the wind renderer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Base pixels per (m/s) per frame, scaled by `area^0.4` of the viewport.
    pub velocity_scale: f64,
    /// Frames a particle lives before it is respawned.
    pub max_particle_age: u32,
    /// Particles per pixel of viewport area.
    pub particle_multiplier: f64,
    /// Stroke width when the caller gives none.
    pub particle_line_width: f32,
    /// Alpha kept by existing trails each frame.
    pub fade_opacity: f32,
    /// Alpha of new strokes.
    pub stroke_opacity: f32,
    /// Nominal frames per second.
    pub frame_rate: f32,
    /// Previous positions kept per particle.
    pub trail_length: usize,
    /// Stroke colors by speed.
    pub palette: Palette,
    /// Number of speed buckets sampled from the palette.
    pub color_buckets: usize,
    /// Cap on the per-frame step multiplier after a stall.
    pub max_delta_scale: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            velocity_scale: 0.011,
            max_particle_age: 90,
            particle_multiplier: 1.0 / 300.0,
            particle_line_width: 0.8,
            fade_opacity: 0.97,
            stroke_opacity: 0.9,
            frame_rate: 20.0,
            trail_length: 1,
            palette: Palette::Wind,
            color_buckets: 15,
            max_delta_scale: 3.0,
        }
    }
}

impl RendererConfig {
    /// Largest accepted `particle_multiplier`: one particle per pixel.
    pub const MAX_PARTICLE_MULTIPLIER: f64 = 1.0;
    /// Largest accepted `color_buckets`.
    pub const MAX_COLOR_BUCKETS: usize = 256;
    /// Largest accepted `trail_length`.
    pub const MAX_TRAIL_LENGTH: usize = 64;

    /// Parse a configuration from JSON text.
    ///
    /// Values that would make the renderer allocate without bound or divide
    /// by zero are rejected with [`ConfigError::OutOfRange`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, field: &'static str, expected: &'static str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, expected })
            }
        }

        check(
            self.velocity_scale.is_finite() && self.velocity_scale >= 0.0,
            "velocity_scale",
            "finite and non-negative",
        )?;
        check(self.max_particle_age >= 1, "max_particle_age", "at least 1")?;
        check(
            (0.0..=Self::MAX_PARTICLE_MULTIPLIER).contains(&self.particle_multiplier),
            "particle_multiplier",
            "between 0 and 1",
        )?;
        check(
            self.particle_line_width > 0.0 && self.particle_line_width <= 64.0,
            "particle_line_width",
            "in (0, 64]",
        )?;
        check((0.0..=1.0).contains(&self.fade_opacity), "fade_opacity", "between 0 and 1")?;
        check((0.0..=1.0).contains(&self.stroke_opacity), "stroke_opacity", "between 0 and 1")?;
        check(
            self.frame_rate > 0.0 && self.frame_rate <= 240.0,
            "frame_rate",
            "in (0, 240]",
        )?;
        check(
            (1..=Self::MAX_TRAIL_LENGTH).contains(&self.trail_length),
            "trail_length",
            "between 1 and 64",
        )?;
        check(
            (1..=Self::MAX_COLOR_BUCKETS).contains(&self.color_buckets),
            "color_buckets",
            "between 1 and 256",
        )?;
        check(
            self.max_delta_scale.is_finite() && self.max_delta_scale >= 1.0,
            "max_delta_scale",
            "finite and at least 1",
        )
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load `path`, or fall back to defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("using default renderer config, {} unusable: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = RendererConfig::default();
        assert_eq!(c.max_particle_age, 90);
        assert_eq!(c.frame_rate, 20.0);
        assert_eq!(c.fade_opacity, 0.97);
        assert_eq!(c.palette, Palette::Wind);
        assert!((c.particle_multiplier - 1.0 / 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c = RendererConfig::from_json_str(r#"{"fade_opacity": 0.9, "palette": "magma"}"#).unwrap();
        assert_eq!(c.fade_opacity, 0.9);
        assert_eq!(c.palette, Palette::Magma);
        assert_eq!(c.max_particle_age, 90);
        assert_eq!(c.trail_length, 1);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(RendererConfig::from_json_str("{}").unwrap(), RendererConfig::default());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(RendererConfig::from_json_str("[1, 2"), Err(ConfigError::Json(_))));
        assert!(matches!(
            RendererConfig::from_json_str(r#"{"palette": "rainbow"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_defaults_validate() {
        assert!(RendererConfig::default().validate().is_ok());
    }

    #[test]
    fn test_absurd_values_rejected() {
        for (json, field) in [
            (r#"{"particle_multiplier": 1e12}"#, "particle_multiplier"),
            (r#"{"color_buckets": 4000000000}"#, "color_buckets"),
            (r#"{"color_buckets": 0}"#, "color_buckets"),
            (r#"{"trail_length": 100000}"#, "trail_length"),
            (r#"{"frame_rate": 0.0}"#, "frame_rate"),
            (r#"{"fade_opacity": 1.5}"#, "fade_opacity"),
            (r#"{"velocity_scale": -1.0}"#, "velocity_scale"),
        ] {
            match RendererConfig::from_json_str(json) {
                Err(ConfigError::OutOfRange { field: f, .. }) => assert_eq!(f, field, "{}", json),
                other => panic!("{} should be rejected, got {:?}", json, other),
            }
        }
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("windtrail-config-{}.json", std::process::id()));
        let config = RendererConfig {
            frame_rate: 30.0,
            palette: Palette::Viridis,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = RendererConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("windtrail-config-does-not-exist.json");
        assert_eq!(RendererConfig::load_or_default(path), RendererConfig::default());
        assert!(matches!(
            RendererConfig::load("/nonexistent/windtrail.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
