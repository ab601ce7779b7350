// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod interval;
pub mod noise;
mod ray;

pub use interval::Interval;
pub use noise::Seed;
pub use ray::Ray;

/// Luminance weights (Rec. 709) used by the tone mapper.
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Reflect `v` about the normal `n`: `v - 2 dot(n, v) n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * n.dot(v) * n
}

/// Build an orthonormal basis `(u, v, w)` with `w` along `axis`.
///
/// The helper axis is +Y when `|w.x| > 0.1`, otherwise +X, so it is never
/// parallel to `w`. `axis` must be non-zero.
#[inline]
pub fn orthonormal_basis(axis: Vec3) -> (Vec3, Vec3, Vec3) {
    let w = axis.normalize();
    let helper = if w.x.abs() > 0.1 { Vec3::Y } else { Vec3::X };
    let u = helper.cross(w).normalize();
    let v = w.cross(u);
    (u, v, w)
}
