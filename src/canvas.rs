//! Software drawing surface for particle trails.
//!
//! The [`Canvas`] is an RGBA8 buffer with straight (non-premultiplied) alpha.
//! It supports exactly what the trail renderer needs:
//!
//! - [`Canvas::fade`] multiplies every pixel's alpha, so older strokes dim
//!   a little each frame and leave streaks behind moving particles
//! - [`Canvas::stroke_segment`] draws an anti-aliased line with source-over
//!   blending
//!
//! The pixels can be uploaded to a texture (see [`Canvas::as_bytes`]) or
//! exported as a PNG.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{DVec2, Vec4};

use crate::error::SnapshotError;

/// One RGBA8 pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32) / 255.0
    }

    fn from_vec4(c: Vec4) -> Self {
        let c = (c.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        Self::new(c.x as u8, c.y as u8, c.z as u8, c.w as u8)
    }

    /// Composite `src` over `self` with `coverage` scaling the source alpha.
    fn blend(self, src: Rgba, coverage: f32) -> Rgba {
        let s = src.to_vec4();
        let d = self.to_vec4();
        let sa = s.w * coverage;
        let da = d.w * (1.0 - sa);
        let out_a = sa + da;
        if out_a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let rgb = (s.truncate() * sa + d.truncate() * da) / out_a;
        Rgba::from_vec4(rgb.extend(out_a))
    }
}

/// RGBA8 drawing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Create a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize and clear. Keeps the allocation when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            self.clear();
            return;
        }
        *self = Canvas::new(width, height);
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    /// Pixel at `(x, y)`, if inside.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[(y * self.width + x) as usize])
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, suitable for a texture upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Multiply every alpha by `opacity`.
    ///
    /// Alpha is rounded down, so repeated fading always reaches zero.
    pub fn fade(&mut self, opacity: f32) {
        let keep = opacity.clamp(0.0, 1.0);
        for p in &mut self.pixels {
            if p.a == 0 {
                continue;
            }
            let a = (p.a as f32 * keep).floor() as u8;
            *p = if a == 0 { Rgba::TRANSPARENT } else { Rgba { a, ..*p } };
        }
    }

    /// Stroke an anti-aliased segment from `from` to `to`.
    ///
    /// Lines thinner than one pixel are drawn one pixel wide with their
    /// alpha scaled by `width`.
    pub fn stroke_segment(&mut self, from: DVec2, to: DVec2, color: Rgba, width: f32) {
        if !(from.is_finite() && to.is_finite()) || width <= 0.0 || color.a == 0 {
            return;
        }
        let half = (width.max(1.0) / 2.0) as f64;
        let thinness = width.min(1.0);
        let reach = half + 1.0;

        let min = from.min(to) - DVec2::splat(reach);
        let max = from.max(to) + DVec2::splat(reach);
        let x0 = min.x.floor().max(0.0) as i64;
        let y0 = min.y.floor().max(0.0) as i64;
        let x1 = (max.x.ceil() as i64).min(self.width as i64 - 1);
        let y1 = (max.y.ceil() as i64).min(self.height as i64 - 1);

        let seg = to - from;
        let len_sq = seg.length_squared();
        let band = reach * len_sq.sqrt();
        for y in y0..=y1 {
            // Pixels farther than `reach` from the infinite line cannot be
            // covered, so each row only scans the band around it.
            let (row_x0, row_x1) = if seg.y != 0.0 {
                let along = from.x + (y as f64 + 0.5 - from.y) * seg.x / seg.y;
                let spread = (band / seg.y).abs();
                (
                    ((along - spread - 0.5).floor() as i64).max(x0),
                    ((along + spread - 0.5).ceil() as i64).min(x1),
                )
            } else {
                (x0, x1)
            };
            for x in row_x0..=row_x1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    ((center - from).dot(seg) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let dist = center.distance(from + seg * t);
                let coverage = ((half + 0.5 - dist).clamp(0.0, 1.0) as f32) * thinness;
                if coverage <= 0.0 {
                    continue;
                }
                let i = (y as u32 * self.width + x as u32) as usize;
                self.pixels[i] = self.pixels[i].blend(color, coverage);
            }
        }
    }

    /// Copy into an `image` buffer.
    pub fn to_image(&self) -> Result<image::RgbaImage, SnapshotError> {
        image::RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
            .filter(|_| !self.pixels.is_empty())
            .ok_or(SnapshotError::EmptyCanvas)
    }

    /// Composite onto an opaque background color.
    pub fn to_image_over(&self, background: Rgba) -> Result<image::RgbaImage, SnapshotError> {
        let mut image = self.to_image()?;
        let bg = Rgba { a: 255, ..background };
        for px in image.pixels_mut() {
            let src = Rgba::new(px[0], px[1], px[2], px[3]);
            let out = bg.blend(src, 1.0);
            *px = image::Rgba([out.r, out.g, out.b, out.a]);
        }
        Ok(image)
    }

    /// Write the canvas to a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P, background: Option<Rgba>) -> Result<(), SnapshotError> {
        let image = match background {
            Some(bg) => self.to_image_over(bg)?,
            None => self.to_image()?,
        };
        image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::new(255, 0, 0, 255);

    #[test]
    fn test_new_is_transparent() {
        let canvas = Canvas::new(4, 3);
        assert_eq!(canvas.pixels().len(), 12);
        assert!(canvas.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
        assert_eq!(canvas.as_bytes().len(), 48);
    }

    #[test]
    fn test_stroke_horizontal() {
        let mut canvas = Canvas::new(10, 10);
        canvas.stroke_segment(DVec2::new(1.0, 5.5), DVec2::new(8.0, 5.5), RED, 1.0);
        let on = canvas.pixel(4, 5).unwrap();
        assert_eq!(on, RED);
        assert_eq!(canvas.pixel(4, 1).unwrap(), Rgba::TRANSPARENT);
        assert_eq!(canvas.pixel(4, 9).unwrap(), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_diagonal_stroke_matches_full_scan() {
        let (from, to) = (DVec2::new(3.2, 60.7), DVec2::new(58.9, 4.1));
        let mut canvas = Canvas::new(64, 64);
        canvas.stroke_segment(from, to, RED, 2.0);

        // Every pixel within reach of the segment is painted, none beyond it.
        let seg = to - from;
        for y in 0..64u32 {
            for x in 0..64u32 {
                let c = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = ((c - from).dot(seg) / seg.length_squared()).clamp(0.0, 1.0);
                let dist = c.distance(from + seg * t);
                let a = canvas.pixel(x, y).unwrap().a;
                if dist < 1.4 {
                    assert!(a > 0, "({}, {}) at {:.2} left empty", x, y, dist);
                } else if dist > 1.5 {
                    assert_eq!(a, 0, "({}, {}) at {:.2} painted", x, y, dist);
                }
            }
        }
    }

    #[test]
    fn test_thin_stroke_is_translucent() {
        let mut canvas = Canvas::new(10, 10);
        canvas.stroke_segment(DVec2::new(1.0, 5.5), DVec2::new(8.0, 5.5), RED, 0.2);
        let px = canvas.pixel(4, 5).unwrap();
        assert!(px.a > 0 && px.a < 128, "alpha {}", px.a);
        assert_eq!(px.r, 255);
    }

    #[test]
    fn test_stroke_clips_to_canvas() {
        let mut canvas = Canvas::new(5, 5);
        canvas.stroke_segment(DVec2::new(-20.0, -20.0), DVec2::new(40.0, 40.0), RED, 3.0);
        assert!(canvas.pixel(2, 2).unwrap().a > 0);
    }

    #[test]
    fn test_non_finite_stroke_ignored() {
        let mut canvas = Canvas::new(5, 5);
        canvas.stroke_segment(DVec2::new(f64::NAN, 1.0), DVec2::new(3.0, 3.0), RED, 1.0);
        assert!(canvas.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_fade_is_monotonic_and_reaches_zero() {
        let mut canvas = Canvas::new(3, 3);
        canvas.stroke_segment(DVec2::new(0.0, 1.5), DVec2::new(3.0, 1.5), RED, 1.0);
        let mut last = canvas.pixel(1, 1).unwrap().a;
        assert_eq!(last, 255);
        for _ in 0..400 {
            canvas.fade(0.97);
            let a = canvas.pixel(1, 1).unwrap().a;
            assert!(a < last || a == 0);
            last = a;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_blend_over_translucent() {
        let dst = Rgba::new(0, 0, 255, 128);
        let out = dst.blend(Rgba::new(255, 0, 0, 128), 1.0);
        assert!(out.a > 128);
        assert!(out.r > out.b);
    }

    #[test]
    fn test_resize_clears() {
        let mut canvas = Canvas::new(4, 4);
        canvas.stroke_segment(DVec2::new(0.0, 2.0), DVec2::new(4.0, 2.0), RED, 2.0);
        canvas.resize(4, 4);
        assert!(canvas.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
        canvas.resize(8, 2);
        assert_eq!((canvas.width(), canvas.height()), (8, 2));
        assert_eq!(canvas.pixels().len(), 16);
    }

    #[test]
    fn test_to_image_over_background() {
        let canvas = Canvas::new(2, 2);
        let image = canvas.to_image_over(Rgba::new(10, 20, 30, 0)).unwrap();
        assert_eq!(image.get_pixel(1, 1).0, [10, 20, 30, 255]);
        assert!(matches!(Canvas::new(0, 0).to_image(), Err(SnapshotError::EmptyCanvas)));
    }
}
