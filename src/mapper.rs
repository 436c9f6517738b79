//! Geographic ↔ pixel conversion for the current viewport.
//!
//! A [`CoordinateMapper`] is an immutable value built from one [`Viewport`].
//! When the map moves, the controller builds a new mapper rather than
//! adjusting the old one.

use glam::DVec2;

use crate::viewport::Viewport;

/// Per-axis affine transform between a viewport's pixels and degrees.
///
/// West maps to the left edge, east to the right, north to the top and
/// south to the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    viewport: Viewport,
    /// Pixels per degree along each axis (y is negative: north is up).
    scale: DVec2,
    /// Geographic coordinate at the pixel origin.
    geo_origin: DVec2,
}

impl CoordinateMapper {
    /// Build a mapper for `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        let b = viewport.bounds;
        let scale = DVec2::new(
            viewport.width as f64 / b.width(),
            -(viewport.height as f64) / b.height(),
        );
        Self {
            viewport,
            scale,
            geo_origin: DVec2::new(b.west, b.north),
        }
    }

    /// The viewport this mapper was built from.
    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Convert `(lon, lat)` to pixel coordinates.
    #[inline]
    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> DVec2 {
        self.viewport.origin + (DVec2::new(lon, lat) - self.geo_origin) * self.scale
    }

    /// Convert pixel coordinates to `(lon, lat)`.
    #[inline]
    pub fn pixel_to_geo(&self, x: f64, y: f64) -> DVec2 {
        self.geo_origin + (DVec2::new(x, y) - self.viewport.origin) / self.scale
    }

    /// Whether the pixel lies inside the viewport rectangle.
    #[inline]
    pub fn contains_pixel(&self, p: DVec2) -> bool {
        let max = self.viewport.max_pixel();
        p.x >= self.viewport.origin.x && p.y >= self.viewport.origin.y && p.x < max.x && p.y < max.y
    }

    /// Degrees covered by one pixel along each axis.
    pub fn degrees_per_pixel(&self) -> DVec2 {
        DVec2::ONE / self.scale.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::GeoBounds;

    fn mapper(origin: DVec2, w: u32, h: u32, bounds: GeoBounds) -> CoordinateMapper {
        CoordinateMapper::new(Viewport::new(origin, w, h, bounds).unwrap())
    }

    #[test]
    fn test_corners_map_to_extent() {
        let m = mapper(DVec2::ZERO, 100, 50, GeoBounds::from_corners([10.0, 20.0], [30.0, 30.0]));
        assert_eq!(m.geo_to_pixel(10.0, 30.0), DVec2::new(0.0, 0.0));
        assert_eq!(m.geo_to_pixel(30.0, 20.0), DVec2::new(100.0, 50.0));
        assert_eq!(m.pixel_to_geo(50.0, 25.0), DVec2::new(20.0, 25.0));
    }

    #[test]
    fn test_unit_square_scenario() {
        let m = mapper(DVec2::ZERO, 100, 100, GeoBounds::from_corners([0.0, 0.0], [1.0, 1.0]));
        let geo = m.pixel_to_geo(50.0, 50.0);
        assert!((geo.x - 0.5).abs() < 1e-12);
        assert!((geo.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_with_offset_origin() {
        let bounds = GeoBounds::from_corners([-179.5, -60.25], [45.0, 72.5]);
        let m = mapper(DVec2::new(13.0, 7.0), 1280, 720, bounds);
        for &(lon, lat) in &[(-179.5, 72.5), (0.0, 0.0), (12.34, -45.6), (44.99, -60.0)] {
            let p = m.geo_to_pixel(lon, lat);
            let back = m.pixel_to_geo(p.x, p.y);
            assert!((back.x - lon).abs() < 1e-9, "lon {} -> {}", lon, back.x);
            assert!((back.y - lat).abs() < 1e-9, "lat {} -> {}", lat, back.y);
        }
    }

    #[test]
    fn test_contains_pixel_is_half_open() {
        let m = mapper(DVec2::ZERO, 10, 10, GeoBounds::from_corners([0.0, 0.0], [1.0, 1.0]));
        assert!(m.contains_pixel(DVec2::new(0.0, 0.0)));
        assert!(m.contains_pixel(DVec2::new(9.99, 9.99)));
        assert!(!m.contains_pixel(DVec2::new(10.0, 5.0)));
        assert!(!m.contains_pixel(DVec2::new(-0.01, 5.0)));
    }

    #[test]
    fn test_degrees_per_pixel() {
        let m = mapper(DVec2::ZERO, 200, 100, GeoBounds::from_corners([0.0, 0.0], [10.0, 10.0]));
        assert_eq!(m.degrees_per_pixel(), DVec2::new(0.05, 0.1));
    }
}
