//! BSDF sampling for the closed set of sphere materials.
//!
//! Every sampler is a pure function of the incoming direction, the surface
//! normal, the material parameter and uniform random numbers in `[0, 1)`.
//! [`sample_material`] pulls those numbers from a [`Seed`] and dispatches on
//! [`MaterialKind`].

use lumen_core::MaterialKind;
use lumen_math::{orthonormal_basis, reflect, Seed, Vec2, Vec3};
use std::f32::consts::PI;

/// Seed lanes consumed by material sampling.
const DIRECTION_LANE: u32 = 0;
const BRANCH_LANE: u32 = 2;

/// Which way a dielectric sent the ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DielectricBranch {
    Reflected,
    Refracted,
}

/// Outgoing direction chosen by a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    /// Unit outgoing direction
    pub direction: Vec3,
    /// Set for dielectrics only
    pub branch: Option<DielectricBranch>,
}

impl Scatter {
    fn new(direction: Vec3) -> Self {
        Self {
            direction,
            branch: None,
        }
    }
}

/// Sample an outgoing direction for `material`.
///
/// Returns `None` for lights, which end the path.
pub fn sample_material(material: MaterialKind, direction: Vec3, normal: Vec3, seed: &Seed) -> Option<Scatter> {
    let xi = seed.rand2(DIRECTION_LANE);
    let scatter = match material {
        MaterialKind::Light => return None,
        MaterialKind::UniformSphereDiffuse => Scatter::new(sample_uniform_sphere(xi)),
        MaterialKind::CosineDiffuse => Scatter::new(sample_cosine_hemisphere(normal, xi)),
        MaterialKind::Metal { fuzz } => Scatter::new(sample_metal(direction, normal, fuzz, xi)),
        MaterialKind::PhongMetal { exponent } => Scatter::new(sample_phong(direction, normal, exponent, xi)),
        MaterialKind::Dielectric { ior } => {
            let (dir, branch) = sample_dielectric(direction, normal, ior, seed.rand(BRANCH_LANE));
            Scatter {
                direction: dir,
                branch: Some(branch),
            }
        }
    };
    Some(scatter)
}

/// Uniform direction over the whole sphere.
pub fn sample_uniform_sphere(xi: Vec2) -> Vec3 {
    let cos_phi = 2.0 * xi.x - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let theta = 2.0 * PI * xi.y;
    Vec3::new(sin_phi * theta.sin(), cos_phi, sin_phi * theta.cos())
}

/// Cosine-weighted direction in the hemisphere around `normal`.
pub fn sample_cosine_hemisphere(normal: Vec3, xi: Vec2) -> Vec3 {
    let (u, v, w) = orthonormal_basis(normal);
    let phi = 2.0 * PI * xi.x;
    let r = xi.y.sqrt();
    (u * phi.cos() * r + v * phi.sin() * r + w * (1.0 - xi.y).sqrt()).normalize()
}

/// Mirror reflection perturbed by `fuzz` times a uniform sphere sample.
pub fn sample_metal(direction: Vec3, normal: Vec3, fuzz: f32, xi: Vec2) -> Vec3 {
    let reflected = reflect(direction, normal).normalize();
    (reflected + fuzz * sample_uniform_sphere(xi))
        .try_normalize()
        .unwrap_or(reflected)
}

/// Cosine-power lobe of `exponent` around the mirror direction.
pub fn sample_phong(direction: Vec3, normal: Vec3, exponent: f32, xi: Vec2) -> Vec3 {
    let (u, v, w) = orthonormal_basis(reflect(direction, normal));
    let cos_theta = (1.0 - xi.x).powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * xi.y;
    (u * phi.cos() * sin_theta + v * phi.sin() * sin_theta + w * cos_theta).normalize()
}

/// Schlick's approximation of Fresnel reflectance.
pub fn schlick(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Snell refraction of `v` through a surface with normal `n` facing the
/// incoming side. `None` on total internal reflection.
pub fn refract(v: Vec3, n: Vec3, ratio: f32) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ratio * ratio * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some((uv - n * dt) * ratio - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Reflect or refract through a dielectric of index `ior`, choosing
/// reflection with the Schlick probability. `xi` picks the branch.
pub fn sample_dielectric(direction: Vec3, normal: Vec3, ior: f32, xi: f32) -> (Vec3, DielectricBranch) {
    let d = direction.dot(normal);
    let length = direction.length();

    let (outward, ratio, cosine) = if d > 0.0 {
        // Leaving the medium
        let c = d / length;
        (-normal, ior, (1.0 - ior * ior * (1.0 - c * c)).max(0.0).sqrt())
    } else {
        (normal, 1.0 / ior, -d / length)
    };

    let refracted = refract(direction, outward, ratio);
    let reflect_probability = match refracted {
        Some(_) => schlick(cosine, ior),
        None => 1.0,
    };

    match refracted {
        Some(refracted) if xi >= reflect_probability => (refracted.normalize(), DielectricBranch::Refracted),
        _ => (reflect(direction, normal).normalize(), DielectricBranch::Reflected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_xi(rng: &mut StdRng) -> Vec2 {
        Vec2::new(rng.gen(), rng.gen())
    }

    #[test]
    fn test_uniform_sphere_is_unit_and_unbiased() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mut mean = Vec3::ZERO;
        for _ in 0..n {
            let d = sample_uniform_sphere(random_xi(&mut rng));
            assert!((d.length() - 1.0).abs() < 1e-4);
            mean += d;
        }
        mean /= n as f32;
        assert!(mean.length() < 0.03, "mean={mean}");
    }

    #[test]
    fn test_cosine_hemisphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(0.3, 0.9, -0.2).normalize();
        let n = 20_000;
        let mut mean_cos = 0.0;
        for _ in 0..n {
            let d = sample_cosine_hemisphere(normal, random_xi(&mut rng));
            assert!((d.length() - 1.0).abs() < 1e-4);
            let cos = d.dot(normal);
            assert!(cos >= -1e-4);
            mean_cos += cos;
        }
        // E[cos] for a cosine-weighted lobe is 2/3
        mean_cos /= n as f32;
        assert!((mean_cos - 2.0 / 3.0).abs() < 0.01, "mean_cos={mean_cos}");
    }

    #[test]
    fn test_metal_without_fuzz_is_mirror() {
        let incoming = Vec3::new(1.0, -1.0, 0.0);
        let d = sample_metal(incoming, Vec3::Y, 0.0, Vec2::new(0.3, 0.7));
        assert!((d - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_metal_fuzz_spreads_around_mirror() {
        let mut rng = StdRng::seed_from_u64(42);
        let incoming = Vec3::new(0.0, -1.0, 0.0);
        for _ in 0..1000 {
            let d = sample_metal(incoming, Vec3::Y, 0.3, random_xi(&mut rng));
            assert!((d.length() - 1.0).abs() < 1e-4);
            // |fuzz| < 1 keeps the sample within asin(0.3) of the mirror direction
            assert!(d.dot(Vec3::Y) > 0.95 - 1e-4);
        }
    }

    #[test]
    fn test_phong_concentrates_with_exponent() {
        let mut rng = StdRng::seed_from_u64(42);
        let incoming = Vec3::new(1.0, -1.0, 0.0).normalize();
        let mirror = reflect(incoming, Vec3::Y);

        let mean_cos = |exponent: f32, rng: &mut StdRng| {
            let n = 5000;
            let mut total = 0.0;
            for _ in 0..n {
                let d = sample_phong(incoming, Vec3::Y, exponent, random_xi(rng));
                assert!((d.length() - 1.0).abs() < 1e-4);
                total += d.dot(mirror);
            }
            total / n as f32
        };

        // E[cos] = (e + 1) / (e + 2)
        let low = mean_cos(1.0, &mut rng);
        let high = mean_cos(100.0, &mut rng);
        assert!((low - 2.0 / 3.0).abs() < 0.02, "low={low}");
        assert!((high - 101.0 / 102.0).abs() < 0.005, "high={high}");
    }

    #[test]
    fn test_schlick() {
        // Normal incidence on glass reflects about 4%
        assert!((schlick(1.0, 1.5) - 0.04).abs() < 1e-6);
        // Grazing incidence reflects everything
        assert!((schlick(0.0, 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_refract_straight_through() {
        let r = refract(Vec3::NEG_Y, Vec3::Y, 1.0 / 1.5).unwrap();
        assert!((r - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Shallow exit from glass
        let incoming = Vec3::new(1.0, 0.2, 0.0);
        assert!(refract(incoming, Vec3::NEG_Y, 1.5).is_none());

        // Every draw reflects, even xi close to 1
        let (d, branch) = sample_dielectric(incoming, Vec3::Y, 1.5, 0.999);
        assert_eq!(branch, DielectricBranch::Reflected);
        assert!((d - Vec3::new(1.0, -0.2, 0.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_dielectric_branches() {
        let incoming = Vec3::new(0.0, -1.0, 0.0);
        let (d, branch) = sample_dielectric(incoming, Vec3::Y, 1.5, 0.01);
        assert_eq!(branch, DielectricBranch::Reflected);
        assert!((d - Vec3::Y).length() < 1e-5);

        let (d, branch) = sample_dielectric(incoming, Vec3::Y, 1.5, 0.5);
        assert_eq!(branch, DielectricBranch::Refracted);
        assert!((d - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_dielectric_reflection_frequency_matches_schlick() {
        let mut rng = StdRng::seed_from_u64(42);
        let cosine: f32 = 0.3;
        let incoming = Vec3::new((1.0 - cosine * cosine).sqrt(), -cosine, 0.0);
        let expected = schlick(cosine, 1.5);

        let trials = 20_000;
        let reflected = (0..trials)
            .filter(|_| {
                let (_, branch) = sample_dielectric(incoming, Vec3::Y, 1.5, rng.gen());
                branch == DielectricBranch::Reflected
            })
            .count();
        let frequency = reflected as f32 / trials as f32;
        assert!(
            (frequency - expected).abs() < 0.015,
            "frequency={frequency} expected={expected}"
        );
    }

    #[test]
    fn test_dielectric_frequency_with_seed_lanes() {
        let cosine: f32 = 0.3;
        let incoming = Vec3::new((1.0 - cosine * cosine).sqrt(), -cosine, 0.0);
        let expected = schlick(cosine, 1.5);
        let material = MaterialKind::Dielectric { ior: 1.5 };

        let mut reflected = 0;
        let mut total = 0;
        for y in 0..100 {
            for x in 0..100 {
                let seed = Seed::new(Vec2::new(x as f32, y as f32), 1.7);
                let scatter = sample_material(material, incoming, Vec3::Y, &seed).unwrap();
                if scatter.branch == Some(DielectricBranch::Reflected) {
                    reflected += 1;
                }
                total += 1;
            }
        }
        let frequency = reflected as f32 / total as f32;
        assert!(
            (frequency - expected).abs() < 0.02,
            "frequency={frequency} expected={expected}"
        );
    }

    #[test]
    fn test_sample_material_dispatch() {
        let seed = Seed::new(Vec2::new(3.0, 4.0), 0.5);
        assert!(sample_material(MaterialKind::Light, Vec3::NEG_Y, Vec3::Y, &seed).is_none());

        let diffuse = sample_material(MaterialKind::CosineDiffuse, Vec3::NEG_Y, Vec3::Y, &seed).unwrap();
        assert!(diffuse.direction.dot(Vec3::Y) >= 0.0);
        assert_eq!(diffuse.branch, None);

        let mirror = sample_material(MaterialKind::Metal { fuzz: 0.0 }, Vec3::NEG_Y, Vec3::Y, &seed).unwrap();
        assert!((mirror.direction - Vec3::Y).length() < 1e-5);

        let glass = sample_material(MaterialKind::Dielectric { ior: 1.5 }, Vec3::NEG_Y, Vec3::Y, &seed).unwrap();
        assert!(glass.branch.is_some());
    }
}
