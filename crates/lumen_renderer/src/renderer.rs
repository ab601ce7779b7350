//! Frame rendering: per-pixel sampling, tone mapping and the parallel
//! bucket driver.
//!
//! Each pixel runs `samples_per_pixel` independent paths. Every sample is
//! seeded by (pixel, sample index, frame time), jittered inside the pixel,
//! pushed through the thin-lens camera, integrated, tone mapped and clamped.
//! The pixel is the average of the tone-mapped samples.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use lumen_core::{Color, Environment, Scene, SurfaceTexture};
use lumen_math::{Interval, Seed, Vec2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::camera::Camera;
use crate::integrator::radiance;
use crate::resolver::Resolver;
use crate::tonemap::{color_to_rgba, tonemap};

/// Seed lanes for the sub-pixel jitter and the lens position. Lanes below
/// these belong to the first bounce of the path.
const JITTER_LANE: u32 = 4;
const LENS_LANE: u32 = 6;

/// Bounce streams the noise source can keep independent.
const MAX_BOUNCES_LIMIT: u32 = lumen_math::noise::MAX_BOUNCE_STREAMS;

/// Errors from invalid render settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Image size must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Samples per pixel must be positive")]
    NoSamples,

    #[error("max_bounces must be in 1..={limit}, got {value}")]
    MaxBounces { value: u32, limit: u32 },

    #[error("min_bounces ({min}) exceeds max_bounces ({max})")]
    MinExceedsMax { min: u32, max: u32 },

    #[error("Ray window [{t_min}, {t_max}] is empty or not finite")]
    RayWindow { t_min: f32, t_max: f32 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("Exposure must be non-negative, got {0}")]
    NegativeExposure(f32),

    #[error("Bucket size must be non-zero")]
    EmptyBucket,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel
    pub samples_per_pixel: u32,
    /// Bounces before Russian roulette may end a path
    pub min_bounces: u32,
    /// Hard bounce limit
    pub max_bounces: u32,
    pub t_min: f32,
    pub t_max: f32,
    /// Scale applied to environment radiance
    pub exposure: f32,
    /// Luminance that maps to display white
    pub white_point: f32,
    pub gamma: f32,
    pub bucket_size: u32,
    /// Divide each sample by the sample count before tone mapping, on top of
    /// the final average
    pub legacy_sample_scaling: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples_per_pixel: 200,
            min_bounces: 7,
            max_bounces: 15,
            t_min: 0.001,
            t_max: 1000.0,
            exposure: 5.0,
            white_point: 2.0,
            gamma: 1.0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            legacy_sample_scaling: false,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, min_bounces: u32, max_bounces: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.min_bounces = min_bounces;
        self.max_bounces = max_bounces;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.max_bounces == 0 || self.max_bounces > MAX_BOUNCES_LIMIT {
            return Err(ConfigError::MaxBounces {
                value: self.max_bounces,
                limit: MAX_BOUNCES_LIMIT,
            });
        }
        if self.min_bounces > self.max_bounces {
            return Err(ConfigError::MinExceedsMax {
                min: self.min_bounces,
                max: self.max_bounces,
            });
        }
        let finite = self.t_min.is_finite() && self.t_max.is_finite();
        if !(finite && self.t_min >= 0.0) || self.ray_interval().is_empty() {
            return Err(ConfigError::RayWindow {
                t_min: self.t_min,
                t_max: self.t_max,
            });
        }
        for (name, value) in [("gamma", self.gamma), ("white_point", self.white_point)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !(self.exposure.is_finite() && self.exposure >= 0.0) {
            return Err(ConfigError::NegativeExposure(self.exposure));
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::EmptyBucket);
        }
        Ok(())
    }

    /// The fixed `[t_min, t_max]` window every segment is tested against.
    pub fn ray_interval(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }
}

/// Read-only inputs shared by every pixel of one frame.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub environment: &'a dyn Environment,
    pub texture: Option<&'a dyn SurfaceTexture>,
    /// Animation time, folded into every random seed
    pub time: f32,
}

impl<'a> Frame<'a> {
    pub fn new(scene: &'a Scene, camera: &'a Camera, environment: &'a dyn Environment, time: f32) -> Self {
        Self {
            scene,
            camera,
            environment,
            texture: None,
            time,
        }
    }

    /// Use `texture` for the albedo of textured objects.
    pub fn with_texture(mut self, texture: &'a dyn SurfaceTexture) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// Render a single pixel with multi-sampling. Row 0 is the top of the frame.
pub fn render_pixel(frame: &Frame, x: u32, y: u32, config: &RenderConfig) -> Color {
    let resolver = Resolver::new(frame.scene, frame.texture, config.ray_interval());
    let spp = config.samples_per_pixel.max(1);
    let pixel_seed = Seed::new(Vec2::new(x as f32, y as f32), frame.time);
    let size = Vec2::new(config.width as f32, config.height as f32);

    let mut pixel_color = Color::ZERO;
    for sample in 0..spp {
        let seed = pixel_seed.with_sample(sample);
        let jitter = seed.rand2(JITTER_LANE);
        let uv = Vec2::new(
            (x as f32 + jitter.x) / size.x,
            1.0 - (y as f32 + jitter.y) / size.y,
        );
        let ray = frame.camera.get_ray(uv, seed.rand2(LENS_LANE));

        let mut color = radiance(&resolver, frame.environment, ray, seed, config);
        if config.legacy_sample_scaling {
            color /= spp as f32;
        }
        pixel_color += tonemap(color, config.white_point, config.gamma);
    }

    pixel_color / spp as f32
}

/// Tone-mapped image in display range.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let i = i as u32;
            self.set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, *color);
        }
    }

    /// Convert to 8-bit RGBA, one entry per pixel.
    pub fn to_rgba8(&self) -> Vec<[u8; 4]> {
        self.pixels.iter().map(|c| color_to_rgba(*c)).collect()
    }

    /// Encode as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let rgba = self.to_rgba8();
        image::save_buffer(
            path,
            bytemuck::cast_slice(&rgba),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
    }
}

/// Render a frame on the rayon pool, one task per bucket.
///
/// `cancel` is checked before each bucket starts. If it is set at any point
/// the partial frame is dropped and `None` is returned.
pub fn render_frame(frame: &Frame, config: &RenderConfig, cancel: &AtomicBool) -> Option<ImageBuffer> {
    let start = Instant::now();
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);

    let results: Option<Vec<BucketResult>> = buckets
        .par_iter()
        .map(|bucket| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let pixels = render_bucket(bucket, frame, config);
            log::debug!("Bucket {} done ({} px)", bucket.index, pixels.len());
            Some(BucketResult::new(*bucket, pixels))
        })
        .collect();

    let results = match results {
        Some(results) if !cancel.load(Ordering::Relaxed) => results,
        _ => {
            log::info!("Frame at t={:.3} cancelled", frame.time);
            return None;
        }
    };

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!(
        "Rendered {}x{} @ {} spp in {} buckets, t={:.3} ({:.2?})",
        config.width,
        config.height,
        config.samples_per_pixel,
        results.len(),
        frame.time,
        start.elapsed()
    );
    Some(image)
}

/// Render the entire frame on the calling thread.
pub fn render(frame: &Frame, config: &RenderConfig) -> ImageBuffer {
    let mut image = ImageBuffer::new(config.width, config.height);

    for y in 0..config.height {
        for x in 0..config.width {
            let color = render_pixel(frame, x, y, config);
            image.set(x, y, color);
        }
    }

    image
}
