//! Surface textures for spatially varying albedo.
//!
//! The path tracer only needs a `uv -> rgb` lookup, expressed by the
//! [`SurfaceTexture`] trait. Image-backed [`Texture`]s are loaded with the
//! `image` crate and stored as linear floats; [`Checker`] is a procedural
//! stand-in when no image is configured.

use std::path::Path;

use lumen_math::{Vec2, Vec4};
use thiserror::Error;

use crate::Color;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Cube map face {face} is {width}x{height}, expected {expected}x{expected}")]
    FaceSize {
        face: &'static str,
        width: u32,
        height: u32,
        expected: u32,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Albedo lookup by surface UV.
pub trait SurfaceTexture: Send + Sync {
    /// Linear RGB albedo at `uv`.
    fn albedo(&self, uv: Vec2) -> Color;
}

impl<F> SurfaceTexture for F
where
    F: Fn(Vec2) -> Color + Send + Sync,
{
    fn albedo(&self, uv: Vec2) -> Color {
        self(uv)
    }
}

/// A loaded texture with pixel data.
///
/// Stores pixels in linear RGBA float format. Row 0 is the top row of the
/// source image and is addressed by `v = 0`.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data in RGBA format (linear, 0-1 range)
    /// Stored as [R, G, B, A] per pixel, row-major order
    pub pixels: Vec<[f32; 4]>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Load a texture from a file path, decoding sRGB to linear.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<[f32; 4]> = rgba
            .pixels()
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                    p[3] as f32 / 255.0, // Alpha is linear
                ]
            })
            .collect();

        let texture = Texture::new(width, height, pixels, path.to_string_lossy().to_string());
        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            texture.path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );
        Ok(texture)
    }

    /// Sample RGBA at UV coordinates with bilinear filtering.
    ///
    /// Coordinates are clamped to [0, 1] (clamp-to-edge addressing).
    pub fn sample_rgba(&self, u: f32, v: f32) -> Vec4 {
        if self.width == 0 || self.height == 0 {
            return Vec4::new(0.0, 0.0, 0.0, 1.0);
        }

        let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

        // Convert to pixel coordinates
        let x = u * (self.width as f32 - 1.0);
        let y = v * (self.height as f32 - 1.0);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let p00 = Vec4::from_array(self.get_pixel(x0, y0));
        let p10 = Vec4::from_array(self.get_pixel(x1, y0));
        let p01 = Vec4::from_array(self.get_pixel(x0, y1));
        let p11 = Vec4::from_array(self.get_pixel(x1, y1));

        let top = p00.lerp(p10, fx);
        let bottom = p01.lerp(p11, fx);
        top.lerp(bottom, fy)
    }

    /// Sample RGB at UV coordinates (bilinear filtering).
    pub fn sample(&self, u: f32, v: f32) -> Color {
        self.sample_rgba(u, v).truncate()
    }

    /// Get pixel at integer coordinates.
    fn get_pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0, 1.0])
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

impl SurfaceTexture for Texture {
    fn albedo(&self, uv: Vec2) -> Color {
        self.sample(uv.x, uv.y)
    }
}

/// Procedural two-color checkerboard in UV space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checker {
    pub even: Color,
    pub odd: Color,
    /// Number of squares along each UV axis
    pub squares: Vec2,
}

impl Checker {
    pub fn new(even: Color, odd: Color, squares: Vec2) -> Self {
        Self { even, odd, squares }
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self {
            even: Color::new(0.55, 0.4, 0.25),
            odd: Color::new(0.3, 0.2, 0.12),
            squares: Vec2::new(16.0, 8.0),
        }
    }
}

impl SurfaceTexture for Checker {
    fn albedo(&self, uv: Vec2) -> Color {
        let cell = (uv * self.squares).floor();
        if (cell.x + cell.y).rem_euclid(2.0) < 1.0 {
            self.even
        } else {
            self.odd
        }
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Write a small RGBA PNG for tests.
#[cfg(test)]
pub(crate) fn write_test_png(path: &Path, width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| image::Rgba(pixel(x, y)));
    img.save(path).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec3;

    fn solid(color: Vec3) -> Texture {
        Texture::new(1, 1, vec![[color.x, color.y, color.z, 1.0]], "<solid>")
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = solid(Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);

        let sample = tex.sample(0.5, 0.5);
        assert!((sample.x - 1.0).abs() < 0.001);
        assert!((sample.y - 0.5).abs() < 0.001);
        assert!((sample.z - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_is_top_left_origin_and_clamped() {
        // 2x2: top row red/green, bottom row blue/white
        let tex = Texture::new(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
            ],
            "<test>",
        );

        assert_eq!(tex.sample(0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.sample(1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(tex.sample(0.0, 1.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(tex.sample(-3.0, 7.0), Vec3::new(0.0, 0.0, 1.0));

        let center = tex.sample(0.5, 0.5);
        assert!((center - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_non_finite_uv_does_not_panic() {
        let tex = solid(Vec3::ONE);
        assert_eq!(tex.sample(f32::NAN, f32::INFINITY), Vec3::ONE);
    }

    #[test]
    fn test_surface_texture_impls() {
        let tex = solid(Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(tex.albedo(Vec2::new(0.3, 0.3)), tex.sample(0.3, 0.3));

        let closure = |uv: Vec2| Vec3::new(uv.x, uv.y, 0.0);
        assert_eq!(closure.albedo(Vec2::new(0.25, 0.75)), Vec3::new(0.25, 0.75, 0.0));
    }

    #[test]
    fn test_checker_alternates() {
        let checker = Checker::new(Vec3::ONE, Vec3::ZERO, Vec2::new(2.0, 2.0));
        assert_eq!(checker.albedo(Vec2::new(0.1, 0.1)), Vec3::ONE);
        assert_eq!(checker.albedo(Vec2::new(0.6, 0.1)), Vec3::ZERO);
        assert_eq!(checker.albedo(Vec2::new(0.6, 0.6)), Vec3::ONE);
        assert_eq!(checker.albedo(Vec2::new(0.1, 0.6)), Vec3::ZERO);
    }

    #[test]
    fn test_load_png() {
        let path = std::env::temp_dir().join(format!("lumen_texture_{}.png", std::process::id()));
        write_test_png(&path, 4, 2, |x, _| if x < 2 { [255, 255, 255, 255] } else { [0, 0, 0, 128] });

        let tex = Texture::load(&path).unwrap();
        assert_eq!(tex.width, 4);
        assert_eq!(tex.height, 2);
        assert!((tex.sample(0.0, 0.5) - Vec3::ONE).length() < 1e-4);
        assert!(tex.sample(1.0, 0.5).length() < 1e-4);
        assert!((tex.sample_rgba(1.0, 0.0).w - 128.0 / 255.0).abs() < 1e-4);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let result = Texture::load("/nonexistent/lumen/soil.png");
        assert!(matches!(
            result,
            Err(TextureError::ImageError(image::ImageError::IoError(_)))
        ));
    }

    #[test]
    fn test_srgb_to_linear() {
        // Black stays black
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);

        // White stays white
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
