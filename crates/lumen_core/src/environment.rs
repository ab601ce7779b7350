//! Radiance arriving from outside the scene.
//!
//! When a path escapes, the integrator asks an [`Environment`] for the RGBA
//! radiance in the ray's direction. The alpha channel scales the color, which
//! lets cube maps store a per-texel intensity.

use std::path::PathBuf;

use lumen_math::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::texture::{Texture, TextureError, TextureResult};
use crate::Color;

/// Direction to RGBA radiance lookup.
pub trait Environment: Send + Sync {
    /// Radiance arriving along `-direction`. `direction` is unit length.
    fn lookup(&self, direction: Vec3) -> Vec4;
}

impl<F> Environment for F
where
    F: Fn(Vec3) -> Vec4 + Send + Sync,
{
    fn lookup(&self, direction: Vec3) -> Vec4 {
        self(direction)
    }
}

/// Same radiance in every direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformEnvironment(pub Vec4);

impl UniformEnvironment {
    /// Opaque color with alpha 1.
    pub fn new(color: Color) -> Self {
        Self(color.extend(1.0))
    }

    /// No light from outside the scene.
    pub const BLACK: UniformEnvironment = UniformEnvironment(Vec4::new(0.0, 0.0, 0.0, 1.0));
}

impl Environment for UniformEnvironment {
    fn lookup(&self, _direction: Vec3) -> Vec4 {
        self.0
    }
}

/// Vertical blend from `horizon` (looking down) to `zenith` (looking up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyGradient {
    pub horizon: Color,
    pub zenith: Color,
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }
}

impl Environment for SkyGradient {
    fn lookup(&self, direction: Vec3) -> Vec4 {
        let a = 0.5 * (direction.normalize_or_zero().y + 1.0);
        (self.horizon * (1.0 - a) + self.zenith * a).extend(1.0)
    }
}

/// File paths of the six cube map faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeMapPaths {
    pub positive_x: PathBuf,
    pub negative_x: PathBuf,
    pub positive_y: PathBuf,
    pub negative_y: PathBuf,
    pub positive_z: PathBuf,
    pub negative_z: PathBuf,
}

impl CubeMapPaths {
    /// The conventional `px.png`, `nx.png`, ... layout inside `dir`.
    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            positive_x: dir.join("px.png"),
            negative_x: dir.join("nx.png"),
            positive_y: dir.join("py.png"),
            negative_y: dir.join("ny.png"),
            positive_z: dir.join("pz.png"),
            negative_z: dir.join("nz.png"),
        }
    }
}

/// Face order used by [`CubeMap`].
const FACE_NAMES: [&str; 6] = ["+x", "-x", "+y", "-y", "+z", "-z"];

/// Six square textures around the origin, addressed like an OpenGL cube map.
#[derive(Debug, Clone)]
pub struct CubeMap {
    /// +X, -X, +Y, -Y, +Z, -Z
    faces: [Texture; 6],
}

impl CubeMap {
    /// Build from faces in +X, -X, +Y, -Y, +Z, -Z order.
    ///
    /// All faces must be square and the same size.
    pub fn new(faces: [Texture; 6]) -> TextureResult<Self> {
        let expected = faces[0].width;
        for (face, name) in faces.iter().zip(FACE_NAMES) {
            if face.width != expected || face.height != expected || expected == 0 {
                return Err(TextureError::FaceSize {
                    face: name,
                    width: face.width,
                    height: face.height,
                    expected,
                });
            }
        }
        Ok(Self { faces })
    }

    /// Load all six faces from disk.
    pub fn load(paths: &CubeMapPaths) -> TextureResult<Self> {
        let faces = [
            Texture::load(&paths.positive_x)?,
            Texture::load(&paths.negative_x)?,
            Texture::load(&paths.positive_y)?,
            Texture::load(&paths.negative_y)?,
            Texture::load(&paths.positive_z)?,
            Texture::load(&paths.negative_z)?,
        ];
        let cube = Self::new(faces)?;
        log::info!("Loaded cube map ({0}x{0} faces)", cube.face_size());
        Ok(cube)
    }

    /// Edge length of each face in pixels.
    pub fn face_size(&self) -> u32 {
        self.faces[0].width
    }

    /// Select the face and face-local (s, t) coordinates for `direction`.
    ///
    /// Follows the OpenGL cube map convention; `t = 0` is the top row of the
    /// face image.
    fn face_coordinates(direction: Vec3) -> (usize, f32, f32) {
        let abs = direction.abs();
        let (face, sc, tc, ma) = if abs.x >= abs.y && abs.x >= abs.z {
            if direction.x > 0.0 {
                (0, -direction.z, -direction.y, abs.x)
            } else {
                (1, direction.z, -direction.y, abs.x)
            }
        } else if abs.y >= abs.z {
            if direction.y > 0.0 {
                (2, direction.x, direction.z, abs.y)
            } else {
                (3, direction.x, -direction.z, abs.y)
            }
        } else if direction.z > 0.0 {
            (4, direction.x, -direction.y, abs.z)
        } else {
            (5, -direction.x, -direction.y, abs.z)
        };

        if ma <= 0.0 {
            return (4, 0.5, 0.5);
        }
        (face, 0.5 * (sc / ma + 1.0), 0.5 * (tc / ma + 1.0))
    }
}

impl Environment for CubeMap {
    fn lookup(&self, direction: Vec3) -> Vec4 {
        let (face, s, t) = Self::face_coordinates(direction);
        self.faces[face].sample_rgba(s, t)
    }
}
