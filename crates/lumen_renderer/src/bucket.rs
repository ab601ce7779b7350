//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently on
//! the rayon pool, center first.

use lumen_core::Color;

use crate::renderer::{render_pixel, Frame, RenderConfig};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Squared distance from the bucket's center to (`cx`, `cy`).
    fn distance_sq(&self, cx: f32, cy: f32) -> f32 {
        let dx = self.x as f32 + self.width as f32 / 2.0 - cx;
        let dy = self.y as f32 + self.height as f32 / 2.0 - cy;
        dx * dx + dy * dy
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Tile a `width` x `height` image into buckets of at most `bucket_size`
/// pixels a side, ordered from the image center outward.
///
/// Edge buckets are clipped to the image. Equal distances keep row-major
/// order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width)
                .step_by(size as usize)
                .map(move |x| Bucket::new(x, y, size.min(width - x), size.min(height - y), 0))
        })
        .collect();

    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    buckets.sort_by(|a, b| a.distance_sq(cx, cy).total_cmp(&b.distance_sq(cx, cy)));

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }
    buckets
}

/// Render a single bucket. Returns pixels in row-major order within the
/// bucket.
pub fn render_bucket(bucket: &Bucket, frame: &Frame, config: &RenderConfig) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    for y in bucket.y..bucket.y + bucket.height {
        for x in bucket.x..bucket.x + bucket.width {
            pixels.push(render_pixel(frame, x, y, config));
        }
    }
    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}
