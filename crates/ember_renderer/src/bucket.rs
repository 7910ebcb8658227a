//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon. Every bucket draws from its
//! own generator seeded by the bucket's position in the render order, so a
//! fixed seed reproduces the image no matter how rayon schedules the work.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::hittable::Hittable;
use crate::progress::ProgressReporter;
use crate::renderer::{render_pixel, ImageBuffer};
use ember_math::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets are rendered from the center outward so the most important
/// parts of the frame finish first.
///
/// # Panics
///
/// Panics if `bucket_size` is zero.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    assert!(bucket_size > 0, "bucket size must be positive");

    let mut buckets = Vec::new();
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
///
/// The sort is stable, so equidistant buckets keep their row-major order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Seed for one bucket's generator, derived from the render seed.
pub fn bucket_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            pixels.push(render_pixel(camera, world, global_x, global_y, rng));
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

impl ImageBuffer {
    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                let color = result.pixels[(local_y * bucket.width + local_x) as usize];
                self.set(bucket.x + local_x, bucket.y + local_y, color);
            }
        }
    }
}

/// Render the scene on the rayon thread pool.
///
/// The camera must already be initialized. Output depends only on the
/// scene, the camera, `seed` and `bucket_size`.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    seed: u64,
    bucket_size: u32,
) -> ImageBuffer {
    assert!(camera.is_initialized(), "Camera::initialize must run before render_parallel");
    let buckets = generate_buckets(camera.image_width, camera.image_height, bucket_size);
    let progress = ProgressReporter::new(buckets.len(), "buckets");

    log::info!(
        "Rendering {}x{} at {} spp in {} buckets on {} threads",
        camera.image_width,
        camera.image_height,
        camera.samples_per_pixel,
        buckets.len(),
        rayon::current_num_threads()
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket_seed(seed, bucket.index));
            let pixels = render_bucket(bucket, camera, world, &mut rng);
            progress.tick();
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.write_bucket(result);
    }

    progress.finish();
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Background, BvhNode, Dielectric, DiffuseLight, Lambertian, Material, Metal, Quad, Sphere,
    };
    use ember_math::Vec3;
    use std::sync::Arc;

    fn small_scene() -> BvhNode {
        let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
        let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
        let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.2));

        let objects: Vec<Arc<dyn Hittable>> = vec![
            Arc::new(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, ground)),
            Arc::new(Sphere::new(Vec3::new(-0.6, 0.0, -1.0), 0.5, glass)),
            Arc::new(Sphere::moving(
                Vec3::new(0.6, 0.0, -1.0),
                Vec3::new(0.6, 0.2, -1.0),
                0.5,
                metal,
            )),
        ];
        BvhNode::new(objects)
    }

    fn small_camera() -> Camera {
        let mut camera = Camera::new()
            .with_resolution(20, 12)
            .with_quality(4, 6)
            .with_position(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(60.0, 0.0, 2.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);

        // Indices follow the render order
        for (i, bucket) in buckets.iter().enumerate() {
            assert_eq!(bucket.index, i);
        }
    }

    #[test]
    fn test_bucket_seeds_differ() {
        assert_ne!(bucket_seed(0, 0), bucket_seed(0, 1));
        assert_ne!(bucket_seed(1, 0), bucket_seed(2, 0));
        assert_eq!(bucket_seed(5, 3), bucket_seed(5, 3));
    }

    #[test]
    fn test_parallel_render_is_deterministic() {
        let world = small_scene();
        let camera = small_camera();

        let a = render_parallel(&camera, &world, 1234, 8);
        let b = render_parallel(&camera, &world, 1234, 8);
        assert_eq!(a, b);

        let c = render_parallel(&camera, &world, 4321, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parallel_render_independent_of_thread_count() {
        let world = small_scene();
        let camera = small_camera();

        let render_on = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| render_parallel(&camera, &world, 99, 5))
        };

        assert_eq!(render_on(1), render_on(4));
    }

    #[test]
    fn test_emissive_only_scene_has_no_variance() {
        // A light wall filling the whole view: every sample sees the same radiance
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(0.8, 0.4, 0.2)));
        let wall: Arc<dyn Hittable> = Arc::new(Quad::new(
            Vec3::new(-50.0, -50.0, -5.0),
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(0.0, 100.0, 0.0),
            light,
        ));
        let world = BvhNode::new(vec![wall]);

        let mut camera = Camera::new()
            .with_resolution(16, 9)
            .with_quality(8, 10)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(60.0, 0.0, 1.0)
            .with_background(Background::Solid(Color::ZERO));
        camera.initialize();

        let a = render_parallel(&camera, &world, 1, 4).to_rgb8();
        let b = render_parallel(&camera, &world, 987_654, 7).to_rgb8();
        assert_eq!(a, b);

        let expected = crate::color_to_rgb8(Color::new(0.8, 0.4, 0.2));
        assert!(a.iter().all(|&p| p == expected));
    }

    #[test]
    fn test_write_bucket_places_pixels() {
        let mut image = ImageBuffer::new(4, 4);
        let bucket = Bucket::new(2, 1, 2, 2, 0);
        let pixels = vec![Color::X, Color::Y, Color::Z, Color::ONE];
        image.write_bucket(&BucketResult::new(bucket, pixels));

        assert_eq!(image.get(2, 1), Color::X);
        assert_eq!(image.get(3, 1), Color::Y);
        assert_eq!(image.get(2, 2), Color::Z);
        assert_eq!(image.get(3, 2), Color::ONE);
        assert_eq!(image.get(0, 0), Color::ZERO);
    }

    #[test]
    #[should_panic(expected = "initialize must run before render_parallel")]
    fn test_parallel_render_requires_initialized_camera() {
        let camera = Camera::new().with_aspect_ratio(8, 1.0);
        render_parallel(&camera, &small_scene(), 3, 4);
    }
}
