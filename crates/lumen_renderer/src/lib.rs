//! Lumen renderer - CPU path tracing for animated sphere scenes.
//!
//! Pipeline for one sample: [`camera`] builds a thin-lens ray, [`integrator`]
//! bounces it through the [`resolver`] (which uses [`intersect`] and
//! [`material`]) until it escapes or dies, and [`tonemap`] brings the result
//! into display range. [`renderer`] and [`bucket`] run that for every pixel
//! of a frame in parallel.
//!
//! All randomness comes from the stateless hash noise in `lumen_math`, so a
//! frame is a pure function of its scene, camera, configuration and time.

pub mod bucket;
pub mod camera;
pub mod integrator;
pub mod intersect;
pub mod material;
pub mod renderer;
pub mod resolver;
pub mod tonemap;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, CameraError, CameraSettings};
pub use integrator::{radiance, trace_path, PathOutcome, PathState};
pub use intersect::{intersect_sphere, Intersection};
pub use material::{sample_material, DielectricBranch, Scatter};
pub use renderer::{render, render_frame, render_pixel, ConfigError, Frame, ImageBuffer, RenderConfig};
pub use resolver::{trace_scene, Resolver, SceneTracer, SurfaceResponse};
pub use tonemap::{color_to_rgba, tonemap};

/// Re-export common types from lumen_core and lumen_math
pub use lumen_core::Color;
pub use lumen_math::{Ray, Vec3};
