//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop bounded by the camera's max depth
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use ember_math::{Color, Interval, Ray};
use rand::RngCore;

use crate::camera::{Background, Camera};
use crate::hittable::Hittable;
use crate::progress::ProgressReporter;

/// Nearest accepted hit distance; skips self-intersections from rounding.
pub const SHADOW_ACNE_EPSILON: f32 = 0.001;

/// Compute the color seen by a ray.
///
/// Follows the path for at most `depth` bounces. Each hit adds the
/// material's emission weighted by the throughput so far, then scales the
/// throughput by the scatter attenuation. Paths that are absorbed end with
/// what they have gathered; paths that run out of bounces gather nothing
/// more. `depth == 0` is always black.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    background: &Background,
    rng: &mut dyn RngCore,
) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    for _ in 0..depth {
        let Some(rec) = world.hit(&ray, Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY)) else {
            return radiance + throughput * background.color(&ray);
        };

        // Get emission from material (for lights)
        radiance += throughput * rec.material.emitted(rec.u, rec.v, rec.p);

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered;
            }
            None => return radiance,
        }
    }

    radiance
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let intensity = Interval::new(0.0, 0.999);
    let quantize = |c: f32| (256.0 * intensity.clamp(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth, &camera.background, rng);
    }

    // Average the samples
    pixel_color * camera.samples_scale()
}

/// Linear-light render output, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Gamma-corrected 8-bit pixels in output order.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|&c| color_to_rgb8(c)).collect()
    }
}

/// Render the entire scene to an image buffer on the calling thread.
///
/// All samples draw from `rng`, so the same generator state reproduces the
/// same image.
pub fn render(camera: &Camera, world: &dyn Hittable, rng: &mut dyn RngCore) -> ImageBuffer {
    assert!(camera.is_initialized(), "Camera::initialize must run before render");
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    let progress = ProgressReporter::new(camera.image_height as usize, "scanlines");

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, world, x, y, rng);
            image.set(x, y, color);
        }
        progress.tick();
    }

    progress.finish();
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BvhNode, DiffuseLight, Lambertian, Material, Metal, Quad, Sphere};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn sphere_world() -> BvhNode {
        let sphere: Arc<dyn Hittable> = Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        ));
        BvhNode::new(vec![sphere])
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8_clamps() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(10.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, -1.0, 1.0)), [128, 0, 255]);
    }

    #[test]
    fn test_zero_depth_is_black() {
        let mut rng = StdRng::seed_from_u64(42);
        let world = sphere_world();

        // Aimed at the sphere and away from it: both black
        for dir in [-Vec3::Z, Vec3::Z, Vec3::Y] {
            let ray = Ray::new_simple(Vec3::ZERO, dir);
            let color = ray_color(&ray, &world, 0, &Background::Sky, &mut rng);
            assert_eq!(color, Color::ZERO);
        }
    }

    #[test]
    fn test_miss_returns_background() {
        let mut rng = StdRng::seed_from_u64(42);
        let world = sphere_world();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Z);

        let solid = Background::Solid(Color::new(0.1, 0.2, 0.3));
        assert_eq!(ray_color(&ray, &world, 5, &solid, &mut rng), Color::new(0.1, 0.2, 0.3));

        let up = Ray::new_simple(Vec3::ZERO, Vec3::Y);
        let sky = ray_color(&up, &world, 5, &Background::Sky, &mut rng);
        assert!((sky - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_emitter_without_scatter() {
        let mut rng = StdRng::seed_from_u64(42);
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(3.0)));
        let world = Quad::new(Vec3::new(-1.0, -1.0, -1.0), 2.0 * Vec3::X, 2.0 * Vec3::Y, light);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let color = ray_color(&ray, &world, 1, &Background::Solid(Color::ONE), &mut rng);
        assert_eq!(color, Color::splat(3.0));
    }

    #[test]
    fn test_bounce_limit_cuts_path() {
        let mut rng = StdRng::seed_from_u64(42);

        // Two facing mirrors: the path never escapes
        let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::splat(0.5), 0.0));
        let near: Arc<dyn Hittable> = Arc::new(Quad::new(
            Vec3::new(-5.0, -5.0, 1.0),
            10.0 * Vec3::X,
            10.0 * Vec3::Y,
            mirror.clone(),
        ));
        let far: Arc<dyn Hittable> = Arc::new(Quad::new(
            Vec3::new(-5.0, -5.0, -1.0),
            10.0 * Vec3::X,
            10.0 * Vec3::Y,
            mirror,
        ));
        let world = BvhNode::new(vec![near, far]);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let color = ray_color(&ray, &world, 10, &Background::Solid(Color::ONE), &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_attenuation_multiplies_background() {
        let mut rng = StdRng::seed_from_u64(42);

        // One mirror bounce, then the ray escapes to a white background
        let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.4), 0.0));
        let world = Quad::new(Vec3::new(-1.0, -1.0, -1.0), 2.0 * Vec3::X, 2.0 * Vec3::Y, mirror);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let color = ray_color(&ray, &world, 5, &Background::Solid(Color::ONE), &mut rng);
        assert!((color - Color::new(0.8, 0.6, 0.4)).length() < 1e-6);
    }

    #[test]
    fn test_render_pixel() {
        let world = sphere_world();

        let mut camera = Camera::new()
            .with_resolution(10, 10)
            .with_quality(4, 5)
            .with_lens(90.0, 0.0, 1.0)
            .with_background(Background::Solid(Color::new(0.5, 0.7, 1.0)));
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);

        // Render center pixel (should hit the sphere)
        let color = render_pixel(&camera, &world, 5, 5, &mut rng);

        // Can't test exact color due to random sampling
        assert!(color.length() > 0.0);
        assert!(color.x <= 1.0 && color.y <= 1.0 && color.z <= 1.0);
    }

    #[test]
    fn test_render_same_seed_same_image() {
        let world = sphere_world();
        let mut camera = Camera::new().with_resolution(8, 6).with_quality(3, 4);
        camera.initialize();

        let a = render(&camera, &world, &mut StdRng::seed_from_u64(7));
        let b = render(&camera, &world, &mut StdRng::seed_from_u64(7));

        assert_eq!(a.width, 8);
        assert_eq!(a.height, 6);
        assert_eq!(a.pixels.len(), 48);
        assert_eq!(a, b);
    }

    #[test]
    fn test_image_buffer_layout() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, Color::ONE);

        assert_eq!(image.get(2, 1), Color::ONE);
        assert_eq!(image.pixels[5], Color::ONE);

        let bytes = image.to_rgb8();
        assert_eq!(bytes.len(), 6);
        assert_eq!(bytes[5], [255, 255, 255]);
        assert_eq!(bytes[0], [0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "initialize must run before render")]
    fn test_render_requires_initialized_camera() {
        let camera = Camera::new().with_aspect_ratio(8, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        render(&camera, &sphere_world(), &mut rng);
    }
}
