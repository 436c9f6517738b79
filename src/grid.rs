//! Gridded wind fields with bilinear sampling.
//!
//! A [`VectorGrid`] holds the `u` (eastward) and `v` (northward) wind
//! components on a regular lat/lon grid. Row 0 is the northern edge and
//! column 0 the western edge, matching the scan order of GRIB-derived JSON.
//!
//! # Missing Data
//!
//! Cells without a valid vector hold `NaN` in either component. They never
//! take part in interpolation or in the magnitude range used for coloring.
//! Queries that touch a missing cell, or that fall outside the grid, return
//! [`Sample::NoData`]. This is the normal result whenever the viewport
//! extends past the data coverage, so it is a value, not an error.
//!
//! # Loading
//!
//! ```ignore
//! let grid = VectorGrid::load("data/gfs.json")?;
//! match grid.sample(69.3, 30.4) {
//!     Sample::Wind(uv) => println!("{} m/s", uv.length()),
//!     Sample::NoData => {}
//! }
//! ```
//!
//! The payload is the two-record array produced by grib2json: one record for
//! U-component (`parameterCategory` 2, `parameterNumber` 2) and one for
//! V-component (`parameterNumber` 3).

use std::io::Read;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::error::GridError;
use crate::viewport::GeoBounds;

/// Result of sampling a [`VectorGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// Interpolated `(u, v)` wind vector.
    Wind(Vec2),
    /// No valid vector at this location.
    NoData,
}

impl Sample {
    /// The wind vector, if any.
    #[inline]
    pub fn wind(self) -> Option<Vec2> {
        match self {
            Sample::Wind(uv) => Some(uv),
            Sample::NoData => None,
        }
    }

    /// Whether this is [`Sample::NoData`].
    #[inline]
    pub fn is_no_data(self) -> bool {
        matches!(self, Sample::NoData)
    }
}

/// Immutable wind vector grid.
#[derive(Debug, Clone)]
pub struct VectorGrid {
    width: usize,
    height: usize,
    /// Bounds through the outermost cell centres.
    bounds: GeoBounds,
    /// Degrees between columns.
    dx: f64,
    /// Degrees between rows.
    dy: f64,
    /// Longitudes wrap around the globe.
    continuous: bool,
    u: Vec<f32>,
    v: Vec<f32>,
    magnitude_range: (f32, f32),
}

impl VectorGrid {
    /// Create a grid from row-major component arrays.
    ///
    /// `bounds` passes through the outermost cell centres: column 0 sits at
    /// `west`, column `width - 1` at `east`, row 0 at `north` and row
    /// `height - 1` at `south`. Use `f32::NAN` for missing cells.
    pub fn new(width: usize, height: usize, bounds: GeoBounds, u: Vec<f32>, v: Vec<f32>) -> Result<Self, GridError> {
        let dx = if width > 1 { bounds.width() / (width - 1) as f64 } else { 0.0 };
        let dy = if height > 1 { bounds.height() / (height - 1) as f64 } else { 0.0 };
        if (width > 1 && !(dx > 0.0)) || (height > 1 && !(dy > 0.0)) {
            return Err(GridError::InvalidSpacing);
        }
        Self::build(width, height, bounds, dx, dy, u, v)
    }

    /// Parse a GRIB-JSON payload.
    pub fn from_json_str(json: &str) -> Result<Self, GridError> {
        let records: Vec<GribRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Read a GRIB-JSON payload from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GridError> {
        let records: Vec<GribRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    /// Load a GRIB-JSON payload from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn from_records(records: Vec<GribRecord>) -> Result<Self, GridError> {
        let mut u_record = None;
        let mut v_record = None;
        for record in records {
            match (record.header.parameter_category, record.header.parameter_number) {
                (2, 2) => u_record = Some(record),
                (2, 3) => v_record = Some(record),
                _ => {}
            }
        }
        let u_record = u_record.ok_or(GridError::MissingComponent("u"))?;
        let v_record = v_record.ok_or(GridError::MissingComponent("v"))?;

        u_record.header.check_same_grid(&v_record.header)?;

        let h = &u_record.header;
        if !(h.dx > 0.0 && h.dx.is_finite() && h.dy > 0.0 && h.dy.is_finite()) {
            return Err(GridError::InvalidSpacing);
        }
        let bounds = GeoBounds {
            west: h.lo1,
            north: h.la1,
            east: h.lo1 + h.nx.saturating_sub(1) as f64 * h.dx,
            south: h.la1 - h.ny.saturating_sub(1) as f64 * h.dy,
        };
        let (width, height, dx, dy) = (h.nx, h.ny, h.dx, h.dy);
        let u = u_record.values();
        let v = v_record.values();
        Self::build(width, height, bounds, dx, dy, u, v)
    }

    fn build(
        width: usize,
        height: usize,
        bounds: GeoBounds,
        dx: f64,
        dy: f64,
        u: Vec<f32>,
        v: Vec<f32>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        let expected = width
            .checked_mul(height)
            .ok_or(GridError::TooLarge { width, height })?;
        for actual in [u.len(), v.len()] {
            if actual != expected {
                return Err(GridError::DimensionMismatch { expected, actual });
            }
        }

        let mut range: Option<(f32, f32)> = None;
        for (a, b) in u.iter().zip(&v) {
            if !(a.is_finite() && b.is_finite()) {
                continue;
            }
            let m = Vec2::new(*a, *b).length();
            range = Some(match range {
                Some((lo, hi)) => (lo.min(m), hi.max(m)),
                None => (m, m),
            });
        }

        Ok(Self {
            width,
            height,
            bounds,
            dx,
            dy,
            continuous: dx > 0.0 && (width as f64 * dx).floor() >= 360.0,
            u,
            v,
            magnitude_range: range.unwrap_or((0.0, 0.0)),
        })
    }

    /// Grid size as `(columns, rows)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Bounds through the outermost cell centres.
    #[inline]
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Whether longitudes wrap around the globe.
    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// `[min, max]` wind speed over all valid cells.
    #[inline]
    pub fn magnitude_range(&self) -> (f32, f32) {
        self.magnitude_range
    }

    /// The raw `(u, v)` at a cell, or `None` if missing or out of range.
    pub fn cell(&self, column: usize, row: usize) -> Option<Vec2> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let i = row * self.width + column;
        let (u, v) = (self.u[i], self.v[i]);
        (u.is_finite() && v.is_finite()).then(|| Vec2::new(u, v))
    }

    /// Bilinearly interpolated wind at `(lon, lat)`.
    pub fn sample(&self, lon: f64, lat: f64) -> Sample {
        let (Some((c0, c1, fx)), Some((r0, r1, fy))) = (self.column_of(lon), self.row_of(lat)) else {
            return Sample::NoData;
        };
        let (Some(g00), Some(g10), Some(g01), Some(g11)) = (
            self.cell(c0, r0),
            self.cell(c1, r0),
            self.cell(c0, r1),
            self.cell(c1, r1),
        ) else {
            return Sample::NoData;
        };

        let (x, y) = (fx as f32, fy as f32);
        let (rx, ry) = (1.0 - x, 1.0 - y);
        let uv = g00 * (rx * ry) + g10 * (x * ry) + g01 * (rx * y) + g11 * (x * y);
        if uv.is_finite() {
            Sample::Wind(uv)
        } else {
            Sample::NoData
        }
    }

    /// Bracketing columns and fraction for a longitude.
    fn column_of(&self, lon: f64) -> Option<(usize, usize, f64)> {
        if !lon.is_finite() {
            return None;
        }
        if self.continuous {
            let fi = (lon - self.bounds.west).rem_euclid(360.0) / self.dx;
            let c0 = (fi.floor() as usize).min(self.width - 1);
            let c1 = (c0 + 1) % self.width;
            return Some((c0, c1, (fi - c0 as f64).clamp(0.0, 1.0)));
        }
        fractional_index(lon - self.bounds.west, self.dx, self.width)
    }

    /// Bracketing rows and fraction for a latitude.
    fn row_of(&self, lat: f64) -> Option<(usize, usize, f64)> {
        if !lat.is_finite() {
            return None;
        }
        fractional_index(self.bounds.north - lat, self.dy, self.height)
    }
}

/// Split an offset along one axis into `(lower, upper, fraction)` cell
/// indices, or `None` when it falls outside `[0, (len - 1) * spacing]`.
fn fractional_index(offset: f64, spacing: f64, len: usize) -> Option<(usize, usize, f64)> {
    if len == 1 || spacing == 0.0 {
        return (offset == 0.0).then_some((0, 0, 0.0));
    }
    let f = offset / spacing;
    let last = (len - 1) as f64;
    if !(0.0..=last).contains(&f) {
        return None;
    }
    let lower = (f.floor() as usize).min(len - 2);
    Some((lower, lower + 1, f - lower as f64))
}

#[derive(Debug, Deserialize)]
struct GribRecord {
    header: GribHeader,
    data: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GribHeader {
    #[serde(default)]
    parameter_category: u32,
    #[serde(default)]
    parameter_number: u32,
    nx: usize,
    ny: usize,
    lo1: f64,
    la1: f64,
    dx: f64,
    dy: f64,
    #[serde(default)]
    missing_value: Option<f64>,
}

impl GribHeader {
    /// Both records must share one lattice for u and v to pair cell by cell.
    fn check_same_grid(&self, other: &GribHeader) -> Result<(), GridError> {
        const TOLERANCE: f64 = 1e-6;
        if self.nx != other.nx {
            return Err(GridError::HeaderMismatch("nx"));
        }
        if self.ny != other.ny {
            return Err(GridError::HeaderMismatch("ny"));
        }
        for (field, a, b) in [
            ("lo1", self.lo1, other.lo1),
            ("la1", self.la1, other.la1),
            ("dx", self.dx, other.dx),
            ("dy", self.dy, other.dy),
        ] {
            if !((a - b).abs() <= TOLERANCE) {
                return Err(GridError::HeaderMismatch(field));
            }
        }
        Ok(())
    }
}

impl GribRecord {
    /// Component values with nulls and the declared missing value as `NaN`.
    fn values(&self) -> Vec<f32> {
        let missing = self.header.missing_value;
        self.data
            .iter()
            .map(|value| match value {
                Some(x) if Some(*x) != missing => *x as f32,
                _ => f32::NAN,
            })
            .collect()
    }
}
