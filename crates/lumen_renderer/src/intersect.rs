//! Analytic ray-sphere intersection.

use lumen_math::{Interval, Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// Where a ray meets a sphere. Lives for one bounce only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Hit point
    pub point: Vec3,
    /// Outward unit normal
    pub normal: Vec3,
    /// `cross(+Y, normal)`; zero length at the poles
    pub tangent: Vec3,
    /// Spherical surface coordinates in [0, 1]
    pub uv: Vec2,
    /// Ray parameter of the hit
    pub distance: f32,
}

/// Intersect `ray` with the sphere (`center`, `radius`), accepting roots
/// strictly inside `ray_t`.
///
/// The near root is tried first, then the far root, so a ray starting inside
/// the sphere reports the exit point.
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32, ray_t: Interval) -> Option<Intersection> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;

    let discriminant = b * b - a * c;
    if discriminant <= 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let mut root = (-b - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (-b + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    let point = ray.at(root);
    let normal = (point - center) / radius;
    Some(Intersection {
        point,
        normal,
        tangent: Vec3::Y.cross(normal),
        uv: sphere_uv(normal),
        distance: root,
    })
}

/// UV for a unit normal: `u` wraps around +Y starting at -X, `v` runs from
/// the north pole (0) to the south pole (1).
fn sphere_uv(n: Vec3) -> Vec2 {
    let u = 0.5 + n.z.atan2(n.x) / (2.0 * PI);
    let v = n.y.clamp(-1.0, 1.0).acos() / PI;
    Vec2::new(u, v)
}
