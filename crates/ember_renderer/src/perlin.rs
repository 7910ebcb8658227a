//! Gradient (Perlin) noise.

use ember_math::{Point3, Vec3};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::sampling::random_vec3;

const POINT_COUNT: usize = 256;

/// Lattice gradient noise with hashed permutation tables.
pub struct Perlin {
    randvec: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        // Gradients are normalized, which bounds noise to [-1, 1]
        let randvec = (0..POINT_COUNT)
            .map(|_| random_vec3(rng, -1.0, 1.0).normalize_or_zero())
            .collect();

        Self {
            randvec,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Smooth noise in roughly `[-1, 1]`.
    pub fn noise(&self, p: Point3) -> f32 {
        let floor = p.floor();
        let frac = p - floor;

        let i = floor.x as i64;
        let j = floor.y as i64;
        let k = floor.z as i64;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, corner) in row.iter_mut().enumerate() {
                    let index = self.perm_x[wrap(i + di as i64)]
                        ^ self.perm_y[wrap(j + dj as i64)]
                        ^ self.perm_z[wrap(k + dk as i64)];
                    *corner = self.randvec[index];
                }
            }
        }

        perlin_interp(&c, frac)
    }

    /// Sum of `depth` octaves of noise, each at double frequency and half weight.
    pub fn turb(&self, p: Point3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

#[inline]
fn wrap(n: i64) -> usize {
    (n & (POINT_COUNT as i64 - 1)) as usize
}

fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
    perm.shuffle(rng);
    perm
}

/// Trilinear blend of corner gradients with Hermite smoothing.
fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], frac: Vec3) -> f32 {
    let smooth = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);
    let mut accum = 0.0;

    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight_v = frac - Vec3::new(fi, fj, fk);
                accum += (fi * smooth.x + (1.0 - fi) * (1.0 - smooth.x))
                    * (fj * smooth.y + (1.0 - fj) * (1.0 - smooth.y))
                    * (fk * smooth.z + (1.0 - fk) * (1.0 - smooth.z))
                    * gradient.dot(weight_v);
            }
        }
    }

    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_permutations_are_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        let perlin = Perlin::new(&mut rng);

        let mut sorted = perlin.perm_x.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..POINT_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_noise_vanishes_on_lattice() {
        // Every corner weight vector is zero at an integer point
        let mut rng = StdRng::seed_from_u64(7);
        let perlin = Perlin::new(&mut rng);
        assert!(perlin.noise(Vec3::new(3.0, -2.0, 5.0)).abs() < 1e-6);
    }

    #[test]
    fn test_noise_is_deterministic_per_seed() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(11));
        let b = Perlin::new(&mut StdRng::seed_from_u64(11));
        let p = Vec3::new(0.3, 1.7, -4.2);

        assert_eq!(a.noise(p), b.noise(p));
        assert!(a.turb(p, 7) >= 0.0);
    }

    #[test]
    fn test_negative_coordinates_wrap() {
        assert_eq!(wrap(-1), 255);
        assert_eq!(wrap(256), 0);
    }

    #[test]
    fn test_gradients_are_unit_length() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(3));
        assert_eq!(perlin.randvec.len(), POINT_COUNT);
        for g in &perlin.randvec {
            assert!((g.length() - 1.0).abs() < 1e-4);
        }
    }
}
