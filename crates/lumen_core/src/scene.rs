//! Scene types for Lumen.
//!
//! A [`SceneDescription`] is the time-independent definition of the world:
//! every object carries a [`Motion`] that turns the animation clock into a
//! position. Calling [`SceneDescription::at`] produces a [`Scene`], a fresh
//! read-only snapshot for one frame. Snapshots share nothing with each other,
//! so frames can be rendered independently.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Color;

/// Errors produced while loading or validating a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("object {index} ({name}): radius must be positive and finite, got {radius}")]
    InvalidRadius {
        index: usize,
        name: String,
        radius: f32,
    },

    #[error("object {index} ({name}): reflectance {value} is outside [0, 1]")]
    ReflectanceOutOfRange {
        index: usize,
        name: String,
        value: Vec3,
    },

    #[error("object {index} ({name}): emission {value} must be finite and non-negative")]
    InvalidEmission {
        index: usize,
        name: String,
        value: Vec3,
    },

    #[error("object {index} ({name}): {message}")]
    InvalidMaterial {
        index: usize,
        name: String,
        message: String,
    },

    #[error("object {index} ({name}): {field} is not finite")]
    NonFinite {
        index: usize,
        name: String,
        field: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// How a surface scatters light.
///
/// The set is closed, so it is a tagged enum carrying the one material
/// parameter each variant uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialKind {
    /// Pure emitter. Paths end here.
    Light,
    /// Outgoing direction uniform over the whole sphere, ignoring the normal.
    UniformSphereDiffuse,
    /// Cosine-weighted hemisphere around the normal.
    CosineDiffuse,
    /// Fuzzy mirror. `fuzz` in [0, 1]; 0 is a perfect mirror.
    Metal { fuzz: f32 },
    /// Mirror direction perturbed by a cosine-power lobe of `exponent`.
    PhongMetal { exponent: f32 },
    /// Glass-like interface with index of refraction `ior`.
    Dielectric { ior: f32 },
}

/// A sphere in one frame's snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialKind,
    /// Diffuse reflectance, each channel in [0, 1]
    pub albedo: Color,
    /// Emitted radiance, unbounded
    pub emission: Color,
    /// Take the albedo from the surface texture when one is supplied
    pub textured: bool,
}

impl SceneObject {
    /// Create a non-emissive, untextured sphere.
    pub fn new(center: Vec3, radius: f32, material: MaterialKind, albedo: Color) -> Self {
        Self {
            center,
            radius,
            material,
            albedo,
            emission: Color::ZERO,
            textured: false,
        }
    }

    /// Create an emissive sphere.
    pub fn light(center: Vec3, radius: f32, emission: Color) -> Self {
        Self {
            center,
            radius,
            material: MaterialKind::Light,
            albedo: Color::ZERO,
            emission,
            textured: false,
        }
    }

    /// Mark the sphere as textured.
    pub fn with_texture(mut self) -> Self {
        self.textured = true;
        self
    }

    /// Check the sphere against the physical constraints the integrator
    /// relies on. `index` and `name` only label the error.
    pub fn validate(&self, index: usize, name: &str) -> SceneResult<()> {
        let label = || name.to_string();

        if !self.center.is_finite() {
            return Err(SceneError::NonFinite {
                index,
                name: label(),
                field: "center",
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SceneError::InvalidRadius {
                index,
                name: label(),
                radius: self.radius,
            });
        }
        let albedo = self.albedo;
        if !(albedo.is_finite() && albedo.cmpge(Vec3::ZERO).all() && albedo.cmple(Vec3::ONE).all()) {
            return Err(SceneError::ReflectanceOutOfRange {
                index,
                name: label(),
                value: albedo,
            });
        }
        let emission = self.emission;
        if !(emission.is_finite() && emission.cmpge(Vec3::ZERO).all()) {
            return Err(SceneError::InvalidEmission {
                index,
                name: label(),
                value: emission,
            });
        }

        let invalid = |message: String| SceneError::InvalidMaterial {
            index,
            name: label(),
            message,
        };
        match self.material {
            MaterialKind::Metal { fuzz } if !(0.0..=1.0).contains(&fuzz) => {
                Err(invalid(format!("metal fuzz must be in [0, 1], got {fuzz}")))
            }
            MaterialKind::PhongMetal { exponent } if !(exponent.is_finite() && exponent >= 0.0) => {
                Err(invalid(format!("phong exponent must be finite and >= 0, got {exponent}")))
            }
            MaterialKind::Dielectric { ior } if !(ior.is_finite() && ior > 0.0) => {
                Err(invalid(format!("index of refraction must be positive, got {ior}")))
            }
            _ => Ok(()),
        }
    }
}

/// Per-axis sinusoidal motion: `base + amplitude * sin(frequency * t + phase)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Motion {
    pub amplitude: Vec3,
    pub frequency: Vec3,
    pub phase: Vec3,
}

impl Motion {
    /// No motion.
    pub const STATIC: Motion = Motion {
        amplitude: Vec3::ZERO,
        frequency: Vec3::ZERO,
        phase: Vec3::ZERO,
    };

    /// Offset from the base position at time `t`.
    pub fn offset(&self, t: f32) -> Vec3 {
        let angle = self.frequency * t + self.phase;
        self.amplitude * Vec3::new(angle.x.sin(), angle.y.sin(), angle.z.sin())
    }

    /// True if every term is finite.
    pub fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.frequency.is_finite() && self.phase.is_finite()
    }
}

fn default_radius() -> f32 {
    1.0
}

fn default_albedo() -> Color {
    Color::splat(0.5)
}

/// One object of a [`SceneDescription`]: a sphere template plus its motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    #[serde(default)]
    pub name: String,
    /// Position at rest; the motion offset is added to it.
    pub center: Vec3,
    #[serde(default = "default_radius")]
    pub radius: f32,
    pub material: MaterialKind,
    #[serde(default = "default_albedo")]
    pub albedo: Color,
    #[serde(default)]
    pub emission: Color,
    #[serde(default)]
    pub textured: bool,
    #[serde(default)]
    pub motion: Motion,
}

impl ObjectDescription {
    /// A static object with the given name.
    pub fn new(name: impl Into<String>, center: Vec3, radius: f32, material: MaterialKind, albedo: Color) -> Self {
        Self {
            name: name.into(),
            center,
            radius,
            material,
            albedo,
            emission: Color::ZERO,
            textured: false,
            motion: Motion::STATIC,
        }
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_texture(mut self) -> Self {
        self.textured = true;
        self
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    /// The object's sphere at time `t`.
    pub fn at(&self, t: f32) -> SceneObject {
        SceneObject {
            center: self.center + self.motion.offset(t),
            radius: self.radius,
            material: self.material,
            albedo: self.albedo,
            emission: self.emission,
            textured: self.textured,
        }
    }
}

/// The time-independent scene definition.
///
/// Validated once when built or loaded; [`SceneDescription::at`] then cannot
/// fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Create and validate a description.
    pub fn new(objects: Vec<ObjectDescription>) -> SceneResult<Self> {
        let description = Self { objects };
        description.validate()?;
        Ok(description)
    }

    /// Parse and validate a description from JSON text.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let description: SceneDescription = serde_json::from_str(json)?;
        description.validate()?;
        Ok(description)
    }

    /// Load and validate a description from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let description = Self::from_json_str(&text)?;
        log::info!(
            "Loaded scene {} ({} objects)",
            path.as_ref().display(),
            description.objects.len()
        );
        Ok(description)
    }

    /// The animated reference scene: a glass sphere, a fuzzy gold sphere, an
    /// orbiting lamp, a textured mirror, a textured diffuse sphere, and a
    /// large ground sphere.
    pub fn reference() -> Self {
        let objects = vec![
            ObjectDescription::new(
                "glass",
                Vec3::new(-0.8, 0.5, -10.0),
                1.0,
                MaterialKind::Dielectric { ior: 1.52 },
                Color::splat(0.9),
            )
            .with_motion(Motion {
                amplitude: Vec3::new(1.0, 0.5, 1.0),
                frequency: Vec3::new(0.8, 2.0, 1.5),
                phase: Vec3::ZERO,
            }),
            ObjectDescription::new(
                "gold",
                Vec3::new(1.5, 0.0, -12.0),
                1.0,
                MaterialKind::Metal { fuzz: 0.7 },
                Color::new(0.7, 0.7, 0.0),
            )
            .with_motion(Motion {
                amplitude: Vec3::new(0.0, 0.0, 1.5),
                frequency: Vec3::new(0.0, 0.0, 1.2),
                phase: Vec3::new(0.0, 0.0, 0.65 * PI),
            }),
            ObjectDescription::new("lamp", Vec3::new(-1.5, 1.0, -12.0), 1.0, MaterialKind::Light, Color::ZERO)
                .with_emission(Color::new(1.0, 1.0, 0.4) * 30.0)
                .with_motion(Motion {
                    amplitude: Vec3::new(0.6, 0.6, 0.0),
                    frequency: Vec3::new(3.0, 3.0, 0.0),
                    phase: Vec3::ZERO,
                }),
            ObjectDescription::new(
                "mirror",
                Vec3::new(-3.0, 0.0, -12.0),
                1.0,
                MaterialKind::Metal { fuzz: 0.0 },
                Color::splat(0.8),
            )
            .with_texture()
            .with_motion(Motion {
                amplitude: Vec3::new(0.5, 0.0, 0.3),
                frequency: Vec3::new(0.5, 0.0, 0.5),
                phase: Vec3::ZERO,
            }),
            ObjectDescription::new(
                "soil",
                Vec3::new(3.5, 0.0, -12.0),
                1.0,
                MaterialKind::CosineDiffuse,
                Color::new(0.6, 0.45, 0.3),
            )
            .with_texture(),
            ObjectDescription::new(
                "ground",
                Vec3::new(-1.5, -1001.0, -12.0),
                1000.0,
                MaterialKind::CosineDiffuse,
                Color::new(0.5, 0.2, 0.2),
            ),
        ];

        Self { objects }
    }

    /// Check every object, reporting the first failure.
    pub fn validate(&self) -> SceneResult<()> {
        for (index, object) in self.objects.iter().enumerate() {
            if !object.motion.is_finite() {
                return Err(SceneError::NonFinite {
                    index,
                    name: object.name.clone(),
                    field: "motion",
                });
            }
            object.at(0.0).validate(index, &object.name)?;
        }
        Ok(())
    }

    /// The snapshot of the scene at animation time `t`.
    pub fn at(&self, t: f32) -> Scene {
        Scene {
            objects: self.objects.iter().map(|o| o.at(t)).collect(),
        }
    }

    pub fn objects(&self) -> &[ObjectDescription] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self::reference()
    }
}

/// The reference scene at animation time `t`.
pub fn build_scene(t: f32) -> Scene {
    SceneDescription::reference().at(t)
}

/// One frame's read-only list of spheres, in scene order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create a validated scene from explicit objects.
    pub fn new(objects: Vec<SceneObject>) -> SceneResult<Self> {
        for (index, object) in objects.iter().enumerate() {
            object.validate(index, "<unnamed>")?;
        }
        Ok(Self { objects })
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of emissive objects.
    pub fn light_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| o.emission.max_element() > 0.0)
            .count()
    }
}
