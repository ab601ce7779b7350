//! Lumen Core - scene description and external lookups for the path tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `SceneDescription` (validated, time-independent),
//!   `Scene` (per-frame snapshot), `SceneObject`, `MaterialKind`, `Motion`
//! - **Lookups**: `SurfaceTexture` albedo textures and `Environment` radiance
//!   for rays that escape the scene
//! - **Frame clock**: monotonic animation time
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::scene::SceneDescription;
//!
//! let description = SceneDescription::from_file("scene.json")?;
//! let scene = description.at(1.25);
//! println!("{} objects at t=1.25", scene.len());
//! ```

pub mod clock;
pub mod environment;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use clock::FrameClock;
pub use environment::{CubeMap, CubeMapPaths, Environment, SkyGradient, UniformEnvironment};
pub use scene::{
    build_scene, MaterialKind, Motion, ObjectDescription, Scene, SceneDescription, SceneError,
    SceneObject,
};
pub use texture::{Checker, SurfaceTexture, Texture, TextureError, TextureResult};

/// Color type alias (linear RGB)
pub type Color = lumen_math::Vec3;
