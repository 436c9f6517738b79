//! Viewport snapshots delivered by the map collaborator.
//!
//! The map widget reports its state as a [`ViewportSnapshot`] on every
//! `load`, `resize`, `move` and `zoom` event. Bounds may be missing while the
//! map is still settling, so they are optional until [`ViewportSnapshot::validate`]
//! turns the snapshot into a [`Viewport`] the renderer can use.

use glam::DVec2;

use crate::error::ViewportError;

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Western longitude.
    pub west: f64,
    /// Southern latitude.
    pub south: f64,
    /// Eastern longitude.
    pub east: f64,
    /// Northern latitude.
    pub north: f64,
}

impl GeoBounds {
    /// Create bounds from the `[[west, south], [east, north]]` corner pair.
    pub fn from_corners(south_west: [f64; 2], north_east: [f64; 2]) -> Self {
        Self {
            west: south_west[0],
            south: south_west[1],
            east: north_east[0],
            north: north_east[1],
        }
    }

    /// Longitude span in degrees.
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Enclosed area in square degrees.
    pub fn area(&self) -> f64 {
        (self.width() * self.height()).abs()
    }

    /// Whether `(lon, lat)` lies inside, edges included.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west.min(self.east)
            && lon <= self.west.max(self.east)
            && lat >= self.south.min(self.north)
            && lat <= self.south.max(self.north)
    }
}

/// A validated mapping between a pixel rectangle and a geographic box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left pixel of the rectangle.
    pub origin: DVec2,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Geographic bounds shown in the rectangle.
    pub bounds: GeoBounds,
}

impl Viewport {
    /// Build a viewport, rejecting empty extents and degenerate bounds.
    pub fn new(origin: DVec2, width: u32, height: u32, bounds: GeoBounds) -> Result<Self, ViewportError> {
        for (name, value) in [
            ("west", bounds.west),
            ("south", bounds.south),
            ("east", bounds.east),
            ("north", bounds.north),
        ] {
            if !value.is_finite() {
                return Err(ViewportError::UndefinedBound(name));
            }
        }
        if !origin.is_finite() {
            return Err(ViewportError::EmptyExtent);
        }
        if width == 0 || height == 0 {
            return Err(ViewportError::EmptyExtent);
        }
        if bounds.width() == 0.0 || bounds.height() == 0.0 {
            return Err(ViewportError::DegenerateBounds);
        }
        Ok(Self {
            origin,
            width,
            height,
            bounds,
        })
    }

    /// Pixel area of the rectangle.
    pub fn pixel_area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Bottom-right pixel corner (exclusive).
    pub fn max_pixel(&self) -> DVec2 {
        self.origin + DVec2::new(self.width as f64, self.height as f64)
    }
}

/// Raw viewport state as reported by the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSnapshot {
    /// Canvas width in pixels.
    pub pixel_width: u32,
    /// Canvas height in pixels.
    pub pixel_height: u32,
    /// Northern latitude, if the map has one yet.
    pub north: Option<f64>,
    /// Southern latitude.
    pub south: Option<f64>,
    /// Eastern longitude.
    pub east: Option<f64>,
    /// Western longitude.
    pub west: Option<f64>,
    /// Current map zoom level.
    pub zoom: f64,
}

impl ViewportSnapshot {
    /// Snapshot with every bound defined.
    pub fn new(pixel_width: u32, pixel_height: u32, bounds: GeoBounds, zoom: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
            north: Some(bounds.north),
            south: Some(bounds.south),
            east: Some(bounds.east),
            west: Some(bounds.west),
            zoom,
        }
    }

    /// Geographic bounds, or the first undefined bound.
    pub fn bounds(&self) -> Result<GeoBounds, ViewportError> {
        let get = |name: &'static str, value: Option<f64>| {
            value
                .filter(|v| v.is_finite())
                .ok_or(ViewportError::UndefinedBound(name))
        };
        Ok(GeoBounds {
            north: get("north", self.north)?,
            south: get("south", self.south)?,
            east: get("east", self.east)?,
            west: get("west", self.west)?,
        })
    }

    /// Convert into a viewport anchored at pixel `(0, 0)`.
    pub fn validate(&self) -> Result<Viewport, ViewportError> {
        Viewport::new(DVec2::ZERO, self.pixel_width, self.pixel_height, self.bounds()?)
    }
}
