//! Subsurface scattering materials for waxy and translucent surfaces.
//!
//! [`SubsurfaceSimple`] fakes light re-emerging near the entry point by
//! jittering the exit position. [`SubsurfaceVolumetric`] runs a random walk
//! through a homogeneous medium with a Henyey-Greenstein phase function.

use std::f32::consts::PI;

use ember_math::{unit_vector, Color, Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::material::{diffuse_direction, Material, ScatterResult};
use crate::sampling::{gen_f32, random_unit_vector};

/// Walk steps before a path is given up as absorbed.
pub const DEFAULT_MAX_BOUNCES: u32 = 64;

/// How far below the surface the walk starts.
const ENTRY_OFFSET: f32 = 0.001;

/// Anisotropy below which the phase function is treated as isotropic.
const ISOTROPIC_THRESHOLD: f32 = 1e-3;

/// Cheap subsurface look: half the bounces leave from a displaced point.
#[derive(Debug, Clone)]
pub struct SubsurfaceSimple {
    albedo: Color,
    scatter_distance: f32,
}

impl SubsurfaceSimple {
    pub fn new(albedo: Color, scatter_distance: f32) -> Self {
        Self {
            albedo,
            scatter_distance,
        }
    }
}

impl Material for SubsurfaceSimple {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let exit_point = if gen_f32(rng) < 0.5 {
            rec.p
        } else {
            let displacement = random_unit_vector(rng) * self.scatter_distance * gen_f32(rng);
            rec.p + displacement
        };
        let direction = diffuse_direction(rec.normal, rng);

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(exit_point, direction, ray_in.time()),
        })
    }
}

/// Random-walk subsurface scattering through a homogeneous medium.
///
/// The walk has no access to the geometry, so leaving the medium is decided
/// by chance: after each step the walk exits with probability
/// `1 - exp(-0.5 * d)`, where `d` is the distance from the entry point.
#[derive(Debug, Clone)]
pub struct SubsurfaceVolumetric {
    albedo: Color,
    /// Scattering coefficient
    sigma_s: f32,
    /// Absorption coefficient
    sigma_a: f32,
    /// Extinction coefficient, `sigma_s + sigma_a`
    sigma_t: f32,
    /// Henyey-Greenstein anisotropy: > 0 forward, < 0 backward
    g: f32,
    max_bounces: u32,
}

impl SubsurfaceVolumetric {
    pub fn new(albedo: Color, scatter_coeff: f32, absorb_coeff: f32, g: f32) -> Self {
        Self {
            albedo,
            sigma_s: scatter_coeff,
            sigma_a: absorb_coeff,
            sigma_t: scatter_coeff + absorb_coeff,
            g,
            max_bounces: DEFAULT_MAX_BOUNCES,
        }
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    pub fn sigma_s(&self) -> f32 {
        self.sigma_s
    }

    pub fn sigma_t(&self) -> f32 {
        self.sigma_t
    }
}

impl Material for SubsurfaceVolumetric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut position = rec.p - rec.normal * ENTRY_OFFSET;
        let mut direction = unit_vector(ray_in.direction());
        let mut throughput = Color::ONE;

        for _ in 0..self.max_bounces {
            // Free-flight distance, exponentially distributed
            let t = -gen_f32(rng).max(1e-10).ln() / self.sigma_t;
            position += direction * t;

            let distance_from_entry = (position - rec.p).length();
            let exit_probability = 1.0 - (-distance_from_entry * 0.5).exp();

            if gen_f32(rng) < exit_probability {
                let exit_direction = diffuse_direction(rec.normal, rng);
                return Some(ScatterResult {
                    attenuation: throughput * self.albedo,
                    scattered: Ray::new(position, exit_direction, ray_in.time()),
                });
            }

            if gen_f32(rng) < self.sigma_a / self.sigma_t {
                return None;
            }

            direction = sample_henyey_greenstein(direction, self.g, rng);
            throughput *= self.albedo;
        }

        None
    }
}

/// Sample a new direction around `incident` from the Henyey-Greenstein
/// phase function with anisotropy `g`.
///
/// Falls back to a uniform direction when `|g|` is tiny, where the closed
/// form divides by `g`.
pub fn sample_henyey_greenstein(incident: Vec3, g: f32, rng: &mut dyn RngCore) -> Vec3 {
    if g.abs() < ISOTROPIC_THRESHOLD {
        return random_unit_vector(rng);
    }

    let sqr_term = (1.0 - g * g) / (1.0 - g + 2.0 * g * gen_f32(rng));
    let cos_theta = ((1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)).clamp(-1.0, 1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);

    let (u, v, w) = orthonormal_basis(incident);
    let direction = u * (phi.cos() * sin_theta) + v * (phi.sin() * sin_theta) + w * cos_theta;
    unit_vector(direction)
}

/// Right-handed basis `(u, v, w)` with `w` along `dir`.
fn orthonormal_basis(dir: Vec3) -> (Vec3, Vec3, Vec3) {
    let w = unit_vector(dir);
    // Helper axis must not be parallel to w
    let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
    let v = unit_vector(w.cross(a));
    let u = w.cross(v);
    (u, v, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn incoming() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z, 0.5)
    }

    #[test]
    fn test_simple_exit_point_stays_near_surface() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = SubsurfaceSimple::new(Color::new(0.9, 0.8, 0.7), 0.2);
        let ray = incoming();
        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, &material, (0.0, 0.0));

        let mut displaced = 0;
        for _ in 0..200 {
            let result = material.scatter(&ray, &rec, &mut rng).unwrap();
            let offset = (result.scattered.origin() - rec.p).length();
            assert!(offset <= 0.2 + 1e-5);
            if offset > 0.0 {
                displaced += 1;
            }
            assert_eq!(result.attenuation, Color::new(0.9, 0.8, 0.7));
            assert_eq!(result.scattered.time(), 0.5);
        }

        // Roughly half the samples take the displaced branch
        assert!(displaced > 50 && displaced < 150);
    }

    #[test]
    fn test_hg_isotropic_fallback_is_unit() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let dir = sample_henyey_greenstein(Vec3::X, 0.0, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hg_forward_scattering_bias() {
        let mut rng = StdRng::seed_from_u64(5);
        let incident = Vec3::new(0.0, 0.0, -1.0);

        let n = 2000;
        let mean_cos: f32 = (0..n)
            .map(|_| sample_henyey_greenstein(incident, 0.8, &mut rng).dot(incident))
            .sum::<f32>()
            / n as f32;

        // The mean cosine of HG equals g
        assert!((mean_cos - 0.8).abs() < 0.05, "mean cos {}", mean_cos);
    }

    #[test]
    fn test_hg_backward_scattering_bias() {
        let mut rng = StdRng::seed_from_u64(6);
        let incident = Vec3::Y;

        let n = 2000;
        let mean_cos: f32 = (0..n)
            .map(|_| sample_henyey_greenstein(incident, -0.5, &mut rng).dot(incident))
            .sum::<f32>()
            / n as f32;

        assert!((mean_cos + 0.5).abs() < 0.05, "mean cos {}", mean_cos);
    }

    #[test]
    fn test_basis_along_x_is_orthonormal() {
        let (u, v, w) = orthonormal_basis(Vec3::X);
        assert!((w - Vec3::X).length() < 1e-6);
        assert!(u.dot(v).abs() < 1e-6);
        assert!(u.dot(w).abs() < 1e-6);
        assert!(v.dot(w).abs() < 1e-6);
        assert!((u.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pure_absorber_never_scatters() {
        let mut rng = StdRng::seed_from_u64(42);
        // No scattering: every interaction inside is an absorption
        let material = SubsurfaceVolumetric::new(Color::ONE, 0.0, 1000.0, 0.0);
        let ray = incoming();
        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, &material, (0.0, 0.0));

        let scattered = (0..200)
            .filter(|_| material.scatter(&ray, &rec, &mut rng).is_some())
            .count();

        // Steps are tiny, so the exit chance per step is close to zero
        assert!(scattered < 10);
    }

    #[test]
    fn test_volumetric_attenuation_is_albedo_power() {
        let mut rng = StdRng::seed_from_u64(9);
        let albedo = Color::new(0.9, 0.5, 0.1);
        let material = SubsurfaceVolumetric::new(albedo, 2.0, 0.1, 0.3);
        let ray = incoming();
        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, &material, (0.0, 0.0));

        let mut exits = 0;
        for _ in 0..200 {
            if let Some(result) = material.scatter(&ray, &rec, &mut rng) {
                exits += 1;
                // albedo^(k+1): colour channels keep their ordering
                let a = result.attenuation;
                assert!(a.x >= a.y && a.y >= a.z);
                assert!(a.x <= albedo.x + 1e-6);
                assert!(result.scattered.direction().dot(rec.normal) >= 0.0);
            }
        }
        assert!(exits > 0);
    }

    #[test]
    fn test_max_bounces_zero_absorbs() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = SubsurfaceVolumetric::new(Color::ONE, 1.0, 0.0, 0.0).with_max_bounces(0);
        let ray = incoming();
        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, &material, (0.0, 0.0));

        assert!(material.scatter(&ray, &rec, &mut rng).is_none());
    }
}
