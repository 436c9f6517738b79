//! Generated wind fields for demos, tests and benchmarks.

use glam::DVec2;

use crate::error::GridError;
use crate::grid::VectorGrid;
use crate::viewport::GeoBounds;

/// Shape of a generated cyclone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cyclone {
    /// `(lon, lat)` of the eye.
    pub center: DVec2,
    /// Half the covered extent in degrees, per axis.
    pub half_extent: DVec2,
    /// Degrees between grid points.
    pub spacing: f64,
    /// Peak tangential wind (m/s).
    pub max_wind: f64,
    /// Distance of peak wind from the eye, in degrees.
    pub radius_of_max_wind: f64,
    /// Uniform eastward drift (m/s).
    pub background: f64,
}

impl Cyclone {
    /// A cyclone centred on `center` with defaults sized for a regional map.
    pub fn at(center: DVec2) -> Self {
        Self {
            center,
            half_extent: DVec2::new(40.0, 25.0),
            spacing: 1.0,
            max_wind: 25.0,
            radius_of_max_wind: 4.0,
            background: 4.0,
        }
    }

    /// Wind at `(lon, lat)`: a Rankine vortex turning counter-clockwise with
    /// slight inflow, over a westerly drift.
    pub fn wind_at(&self, lon: f64, lat: f64) -> DVec2 {
        let d = DVec2::new(lon, lat) - self.center;
        let r = d.length();
        if r < 1e-9 {
            return DVec2::new(self.background, 0.0);
        }
        let rm = self.radius_of_max_wind;
        let speed = if r < rm { self.max_wind * r / rm } else { self.max_wind * rm / r };
        let radial = d / r;
        let tangential = DVec2::new(-radial.y, radial.x);
        (tangential - radial * 0.2) * speed + DVec2::new(self.background, 0.0)
    }

    /// Sample the cyclone onto a grid.
    pub fn to_grid(&self) -> Result<VectorGrid, GridError> {
        if !(self.spacing > 0.0) {
            return Err(GridError::InvalidSpacing);
        }
        let bounds = GeoBounds {
            west: self.center.x - self.half_extent.x,
            south: self.center.y - self.half_extent.y,
            east: self.center.x + self.half_extent.x,
            north: self.center.y + self.half_extent.y,
        };
        let width = (bounds.width() / self.spacing).round() as usize + 1;
        let height = (bounds.height() / self.spacing).round() as usize + 1;
        let bounds = GeoBounds {
            east: bounds.west + (width - 1) as f64 * self.spacing,
            south: bounds.north - (height - 1) as f64 * self.spacing,
            ..bounds
        };

        let mut u = Vec::with_capacity(width * height);
        let mut v = Vec::with_capacity(width * height);
        for row in 0..height {
            let lat = bounds.north - row as f64 * self.spacing;
            for col in 0..width {
                let lon = bounds.west + col as f64 * self.spacing;
                let w = self.wind_at(lon, lat);
                u.push(w.x as f32);
                v.push(w.y as f32);
            }
        }
        VectorGrid::new(width, height, bounds, u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_covers_extent() {
        let grid = Cyclone::at(DVec2::new(69.3451, 30.3753)).to_grid().unwrap();
        assert_eq!(grid.dimensions(), (81, 51));
        assert!(grid.sample(69.3451, 30.3753).wind().is_some());
        assert!(grid.sample(0.0, 0.0).is_no_data());
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let c = Cyclone {
            background: 0.0,
            ..Cyclone::at(DVec2::ZERO)
        };
        // East of the eye the wind blows north.
        let w = c.wind_at(2.0, 0.0);
        assert!(w.y > 0.0);
        // Peak wind at the radius of maximum wind.
        assert!(c.wind_at(4.0, 0.0).length() > c.wind_at(10.0, 0.0).length());
        assert!(c.wind_at(4.0, 0.0).length() > c.wind_at(1.0, 0.0).length());
    }

    #[test]
    fn test_invalid_spacing() {
        let c = Cyclone {
            spacing: 0.0,
            ..Cyclone::at(DVec2::ZERO)
        };
        assert!(matches!(c.to_grid(), Err(GridError::InvalidSpacing)));
    }
}
