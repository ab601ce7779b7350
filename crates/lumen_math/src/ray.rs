use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// The direction is not required to be unit length; materials that need a
/// unit vector normalize it themselves. Rays are plain values: the path
/// integrator builds a fresh one for every bounce.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// `origin + t * direction`
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_walks_along_direction() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y);
        assert_eq!(ray.at(0.0), ray.origin);
        assert_eq!(ray.at(2.5), Vec3::new(1.0, 4.5, 3.0));
        assert_eq!(ray.at(-1.0), Vec3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn test_at_scales_with_direction_length() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let ray = Ray::default();
        assert_eq!(ray.origin, Vec3::ZERO);
        assert_eq!(ray.direction, Vec3::NEG_Z);
    }
}
