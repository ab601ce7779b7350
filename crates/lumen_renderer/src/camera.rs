//! Thin-lens camera for ray generation.

use lumen_math::{Ray, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use thiserror::Error;

/// Tolerance for the orthonormal basis check.
const BASIS_EPSILON: f32 = 1e-3;

/// Errors from invalid camera settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Focal length must be positive, got {0}")]
    InvalidFocalLength(f32),

    #[error("Aperture must be non-negative, got {0}")]
    InvalidAperture(f32),

    #[error("Vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("Camera basis (right, up, forward) is not orthonormal")]
    NonOrthonormalBasis,

    #[error("Camera {0} is not finite")]
    NonFinite(&'static str),

    #[error("Image size {width}x{height} has no aspect ratio")]
    EmptyImage { width: u32, height: u32 },
}

/// Camera pose and lens, as read from settings.
///
/// `forward` is the viewing direction. `right`, `up` and `forward` must form
/// an orthonormal basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Distance to the plane of perfect focus
    pub focal_length: f32,
    /// Lens diameter; 0 is a pinhole
    pub aperture: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(-0.7, 0.0, 0.0),
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::NEG_Z,
            vfov: 30.0,
            focal_length: 10.0,
            aperture: 0.1,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set camera orientation.
    pub fn with_basis(mut self, right: Vec3, up: Vec3, forward: Vec3) -> Self {
        self.right = right;
        self.up = up;
        self.forward = forward;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, focal_length: f32, aperture: f32) -> Self {
        self.vfov = vfov;
        self.focal_length = focal_length;
        self.aperture = aperture;
        self
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        for (name, v) in [
            ("position", self.position),
            ("right", self.right),
            ("up", self.up),
            ("forward", self.forward),
        ] {
            if !v.is_finite() {
                return Err(CameraError::NonFinite(name));
            }
        }
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            return Err(CameraError::InvalidFocalLength(self.focal_length));
        }
        if !(self.aperture.is_finite() && self.aperture >= 0.0) {
            return Err(CameraError::InvalidAperture(self.aperture));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(CameraError::InvalidFieldOfView(self.vfov));
        }

        let unit = |v: Vec3| (v.length() - 1.0).abs() < BASIS_EPSILON;
        let orthogonal = |a: Vec3, b: Vec3| a.dot(b).abs() < BASIS_EPSILON;
        let (r, u, f) = (self.right, self.up, self.forward);
        if !(unit(r) && unit(u) && unit(f) && orthogonal(r, u) && orthogonal(r, f) && orthogonal(u, f)) {
            return Err(CameraError::NonOrthonormalBasis);
        }
        Ok(())
    }

    /// Gram-Schmidt the basis, keeping `forward` and then `up` fixed.
    ///
    /// `right` is recomputed as `forward x up`. Returns `None` when `forward`
    /// and `up` are degenerate or parallel.
    pub fn orthonormalized(&self) -> Option<Self> {
        let forward = self.forward.try_normalize()?;
        let up = (self.up - forward * self.up.dot(forward)).try_normalize()?;
        let right = forward.cross(up);
        Some(Self {
            right,
            up,
            forward,
            ..*self
        })
    }
}

/// Ray generator for one frame, built from [`CameraSettings`] and the image
/// aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Vec3,
    right: Vec3,
    up: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Validate `settings` and precompute the focal-plane rectangle.
    pub fn new(settings: &CameraSettings, width: u32, height: u32) -> Result<Self, CameraError> {
        settings.validate()?;
        if width == 0 || height == 0 {
            return Err(CameraError::EmptyImage { width, height });
        }

        let aspect = width as f32 / height as f32;
        let half_height = (settings.vfov.to_radians() / 2.0).tan();
        let half_width = aspect * half_height;
        let f = settings.focal_length;
        let (right, up, forward) = (settings.right, settings.up, settings.forward);

        Ok(Self {
            origin: settings.position,
            right,
            up,
            lower_left: settings.position - right * half_width * f - up * half_height * f + forward * f,
            horizontal: right * 2.0 * half_width * f,
            vertical: up * 2.0 * half_height * f,
            lens_radius: settings.aperture / 2.0,
        })
    }

    /// Ray through screen position `uv` (`[0, 1]²`, v up) from a lens
    /// position picked by `lens` (`[0, 1)²`).
    pub fn get_ray(&self, uv: Vec2, lens: Vec2) -> Ray {
        let disk = sample_disk(lens) * self.lens_radius;
        let origin = self.origin + self.right * disk.x + self.up * disk.y;
        let target = self.lower_left + self.horizontal * uv.x + self.vertical * uv.y;
        Ray::new(origin, target - origin)
    }
}

/// Map `[0, 1)²` to the unit disk: `r = sqrt(u)`, `theta = 2 pi v`.
fn sample_disk(xi: Vec2) -> Vec2 {
    let r = xi.x.sqrt();
    let theta = 2.0 * PI * xi.y;
    Vec2::new(theta.cos(), theta.sin()) * r
}
