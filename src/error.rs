//! Error types for windtrail.
//!
//! This module provides error types for grid loading, viewport validation,
//! configuration files, canvas snapshots and the viewer window.

use std::fmt;

/// Errors that can occur while loading a [`VectorGrid`](crate::VectorGrid).
#[derive(Debug)]
pub enum GridError {
    /// Failed to read the payload from disk.
    Io(std::io::Error),
    /// Payload is not valid GRIB-JSON.
    Json(serde_json::Error),
    /// No record for the named component (`"u"` or `"v"`) was found.
    MissingComponent(&'static str),
    /// Grid has zero columns or rows.
    EmptyGrid,
    /// Component array length does not equal `width * height`.
    DimensionMismatch {
        /// Expected number of cells.
        expected: usize,
        /// Actual array length.
        actual: usize,
    },
    /// Grid spacing is zero, negative or not finite.
    InvalidSpacing,
    /// The u and v records describe different grids.
    HeaderMismatch(&'static str),
    /// `width * height` does not fit in memory.
    TooLarge {
        /// Declared columns.
        width: usize,
        /// Declared rows.
        height: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Io(e) => write!(f, "Failed to read grid file: {}", e),
            GridError::Json(e) => write!(f, "Failed to parse grid payload: {}", e),
            GridError::MissingComponent(c) => write!(f, "Grid payload has no {}-component record", c),
            GridError::EmptyGrid => write!(f, "Grid must have at least one column and one row"),
            GridError::DimensionMismatch { expected, actual } => write!(
                f,
                "Grid component has {} values, expected {} (width * height)",
                actual, expected
            ),
            GridError::InvalidSpacing => write!(f, "Grid spacing must be positive and finite"),
            GridError::HeaderMismatch(field) => {
                write!(f, "U and V records disagree on '{}'", field)
            }
            GridError::TooLarge { width, height } => {
                write!(f, "Grid of {}x{} cells is too large", width, height)
            }
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::Io(e) => Some(e),
            GridError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GridError {
    fn from(e: std::io::Error) -> Self {
        GridError::Io(e)
    }
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        GridError::Json(e)
    }
}

/// Reasons a viewport snapshot cannot drive the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportError {
    /// A geographic bound is missing or not finite.
    UndefinedBound(&'static str),
    /// Pixel width or height is zero.
    EmptyExtent,
    /// North equals south or east equals west.
    DegenerateBounds,
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportError::UndefinedBound(name) => write!(f, "Viewport bound '{}' is undefined", name),
            ViewportError::EmptyExtent => write!(f, "Viewport has an empty pixel extent"),
            ViewportError::DegenerateBounds => write!(f, "Viewport bounds enclose no area"),
        }
    }
}

impl std::error::Error for ViewportError {}

/// Errors that can occur when reading or writing a renderer configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the file.
    Io(std::io::Error),
    /// File contents are not a valid configuration.
    Json(serde_json::Error),
    /// A field is outside its accepted range.
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Accepted range, for the message.
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Invalid config: {}", e),
            ConfigError::OutOfRange { field, expected } => {
                write!(f, "Config field '{}' must be {}", field, expected)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::OutOfRange { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur when exporting the canvas as an image.
#[derive(Debug)]
pub enum SnapshotError {
    /// Failed to encode or write the image.
    Image(image::ImageError),
    /// Canvas has no pixels to export.
    EmptyCanvas,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Image(e) => write!(f, "Failed to write snapshot: {}", e),
            SnapshotError::EmptyCanvas => write!(f, "Canvas is empty; nothing to export"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Image(e) => Some(e),
            SnapshotError::EmptyCanvas => None,
        }
    }
}

impl From<image::ImageError> for SnapshotError {
    fn from(e: image::ImageError) -> Self {
        SnapshotError::Image(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the viewer.
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

impl From<GpuError> for ViewerError {
    fn from(e: GpuError) -> Self {
        ViewerError::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_viewport_error_names_bound() {
        let msg = ViewportError::UndefinedBound("north").to_string();
        assert!(msg.contains("north"));
    }

    #[test]
    fn test_grid_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = GridError::from(io);
        assert!(err.source().is_some());
        assert!(GridError::EmptyGrid.source().is_none());
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = GridError::DimensionMismatch { expected: 4, actual: 3 };
        let msg = err.to_string();
        assert!(msg.contains('4') && msg.contains('3'));
    }
}
