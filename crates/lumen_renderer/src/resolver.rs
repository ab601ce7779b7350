//! Nearest-hit resolution against one frame's scene snapshot.
//!
//! Objects are not tested in depth order. They are ordered by the distance
//! from the ray origin to their centers and the first one that reports a hit
//! inside the fixed ray window wins. For spheres of very different sizes this
//! can pick a hit that is farther away than the true nearest one.

use lumen_core::{Color, Scene, SceneObject, SurfaceTexture};
use lumen_math::{Interval, Ray, Seed, Vec3};

use crate::intersect::{intersect_sphere, Intersection};
use crate::material::{sample_material, DielectricBranch};

/// What a surface does to a path at one bounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceResponse {
    /// Multiplies the path throughput
    pub diffuse: Color,
    /// Added to the path radiance, scaled by the current throughput
    pub emission: Color,
    /// Continuation ray; `None` ends the path
    pub scattered: Option<Ray>,
    /// Set when a dielectric chose between reflection and refraction
    pub branch: Option<DielectricBranch>,
}

/// Traces one ray segment into a scene.
///
/// The integrator only talks to this trait, so it can be driven by
/// deterministic tracers in tests.
pub trait SceneTracer: Send + Sync {
    /// Resolve `ray` against the scene. `None` means the ray escaped.
    fn trace(&self, ray: &Ray, seed: &Seed) -> Option<SurfaceResponse>;
}

/// [`SceneTracer`] over a [`Scene`] snapshot.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    scene: &'a Scene,
    texture: Option<&'a dyn SurfaceTexture>,
    ray_t: Interval,
}

impl<'a> Resolver<'a> {
    pub fn new(scene: &'a Scene, texture: Option<&'a dyn SurfaceTexture>, ray_t: Interval) -> Self {
        Self { scene, texture, ray_t }
    }
}

impl SceneTracer for Resolver<'_> {
    fn trace(&self, ray: &Ray, seed: &Seed) -> Option<SurfaceResponse> {
        trace_scene(self.scene, self.texture, ray, seed, self.ray_t)
    }
}

/// Indices of `objects` sorted by ascending distance from `origin` to each
/// center. Insertion sort, so ties keep scene order.
pub fn order_by_center_distance(objects: &[SceneObject], origin: Vec3) -> Vec<usize> {
    let distances: Vec<f32> = objects.iter().map(|o| o.center.distance(origin)).collect();
    let mut order: Vec<usize> = (0..objects.len()).collect();

    for i in 1..order.len() {
        let current = order[i];
        let mut j = i;
        while j > 0 && distances[order[j - 1]] > distances[current] {
            order[j] = order[j - 1];
            j -= 1;
        }
        order[j] = current;
    }
    order
}

/// First object in center-distance order that `ray` hits inside `ray_t`.
pub fn first_hit(scene: &Scene, ray: &Ray, ray_t: Interval) -> Option<(usize, Intersection)> {
    let objects = scene.objects();
    order_by_center_distance(objects, ray.origin)
        .into_iter()
        .find_map(|index| {
            let object = &objects[index];
            intersect_sphere(ray, object.center, object.radius, ray_t).map(|hit| (index, hit))
        })
}

/// Resolve `ray` against `scene` and sample the hit material.
///
/// Textured objects take their diffuse color from `texture` at the hit UV
/// when a texture is supplied.
pub fn trace_scene(
    scene: &Scene,
    texture: Option<&dyn SurfaceTexture>,
    ray: &Ray,
    seed: &Seed,
    ray_t: Interval,
) -> Option<SurfaceResponse> {
    let (index, hit) = first_hit(scene, ray, ray_t)?;
    let object = &scene.objects()[index];

    let diffuse = match texture {
        Some(texture) if object.textured => texture.albedo(hit.uv),
        _ => object.albedo,
    };

    let scatter = sample_material(object.material, ray.direction, hit.normal, seed);
    Some(SurfaceResponse {
        diffuse,
        emission: object.emission,
        scattered: scatter.map(|s| Ray::new(hit.point, s.direction)),
        branch: scatter.and_then(|s| s.branch),
    })
}
