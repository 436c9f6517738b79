//! Minimal pan/zoom map used to drive the overlay.
//!
//! Plate carrée at web-map scale: zoom `z` shows `360 / (256 * 2^z)` degrees
//! per pixel on both axes. There are no tiles; the view only exists to
//! report [`ViewportSnapshot`]s the way a real map widget would.

use glam::DVec2;

use crate::viewport::{GeoBounds, ViewportSnapshot};

const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 10.0;
const MAX_LATITUDE: f64 = 85.0;

/// Center, zoom and pixel size of the demo map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    /// `(lon, lat)` at the middle of the window.
    center: DVec2,
    zoom: f64,
    width: u32,
    height: u32,
}

impl MapView {
    pub fn new(center: DVec2, zoom: f64, width: u32, height: u32) -> Self {
        let mut view = Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        };
        view.clamp_center();
        view
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.center
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn degrees_per_pixel(&self) -> f64 {
        360.0 / (TILE_SIZE * 2f64.powf(self.zoom))
    }

    /// Geographic box currently in view.
    pub fn bounds(&self) -> GeoBounds {
        let dpp = self.degrees_per_pixel();
        let half = DVec2::new(self.width as f64, self.height as f64) * 0.5 * dpp;
        GeoBounds {
            west: self.center.x - half.x,
            south: self.center.y - half.y,
            east: self.center.x + half.x,
            north: self.center.y + half.y,
        }
    }

    /// What a map widget would report after a `move`, `zoom` or `resize`.
    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot::new(self.width, self.height, self.bounds(), self.zoom)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Drag the map by a pixel offset (content follows the cursor).
    pub fn pan_pixels(&mut self, delta: DVec2) {
        let dpp = self.degrees_per_pixel();
        self.center += DVec2::new(-delta.x, delta.y) * dpp;
        self.clamp_center();
    }

    /// Zoom by `steps`, keeping the point under `cursor` fixed.
    pub fn zoom_at(&mut self, steps: f64, cursor: DVec2) {
        let half = DVec2::new(self.width as f64, self.height as f64) * 0.5;
        let offset = (cursor - half) * DVec2::new(1.0, -1.0);
        let anchor = self.center + offset * self.degrees_per_pixel();
        self.zoom = (self.zoom + steps).clamp(MIN_ZOOM, MAX_ZOOM);
        self.center = anchor - offset * self.degrees_per_pixel();
        self.clamp_center();
    }

    fn clamp_center(&mut self) {
        self.center.y = self.center.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        if self.center.x > 180.0 || self.center.x < -180.0 {
            self.center.x = (self.center.x + 180.0).rem_euclid(360.0) - 180.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_centered() {
        let view = MapView::new(DVec2::new(69.3451, 30.3753), 5.0, 512, 256);
        let b = view.bounds();
        let dpp = 360.0 / 8192.0;
        assert!((b.width() - 512.0 * dpp).abs() < 1e-9);
        assert!((b.height() - 256.0 * dpp).abs() < 1e-9);
        assert!(((b.west + b.east) / 2.0 - 69.3451).abs() < 1e-9);
        assert!(view.snapshot().validate().is_ok());
    }

    #[test]
    fn test_pan_follows_cursor() {
        let mut view = MapView::new(DVec2::new(0.0, 0.0), 2.0, 400, 400);
        let dpp = view.degrees_per_pixel();
        view.pan_pixels(DVec2::new(10.0, 0.0));
        assert!((view.center().x + 10.0 * dpp).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_keeps_anchor() {
        let mut view = MapView::new(DVec2::new(20.0, 10.0), 4.0, 800, 600);
        let cursor = DVec2::new(100.0, 500.0);
        let before = view.bounds();
        let geo_x = before.west + cursor.x * view.degrees_per_pixel();
        view.zoom_at(1.0, cursor);
        let after = view.bounds();
        let geo_x_after = after.west + cursor.x * view.degrees_per_pixel();
        assert_eq!(view.zoom(), 5.0);
        assert!((geo_x - geo_x_after).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = MapView::new(DVec2::ZERO, 5.0, 100, 100);
        view.zoom_at(100.0, DVec2::new(50.0, 50.0));
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.zoom_at(-100.0, DVec2::new(50.0, 50.0));
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_longitude_wraps() {
        let mut view = MapView::new(DVec2::new(179.0, 0.0), 1.0, 100, 100);
        view.pan_pixels(DVec2::new(-100.0, 0.0));
        assert!(view.center().x >= -180.0 && view.center().x <= 180.0);
    }
}
