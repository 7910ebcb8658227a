//! Ember Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer: a camera fires jittered rays into a scene of
//! hittables, a BVH prunes the search, and materials decide how each path
//! continues until it escapes, is absorbed or runs out of bounces.
//!
//! Randomness is always passed in explicitly as a `&mut dyn RngCore`, so
//! seeded renders are reproducible and worker threads never share state.

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod material;
mod mesh;
mod perlin;
mod progress;
mod quad;
mod renderer;
pub mod sampling;
mod sphere;
mod subsurface;
mod texture;
mod triangle;

pub use bucket::{
    bucket_seed, generate_buckets, render_bucket, render_parallel, Bucket, BucketResult,
    DEFAULT_BUCKET_SIZE,
};
pub use bvh::BvhNode;
pub use camera::{Background, Camera};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult};
pub use mesh::TriangleMesh;
pub use perlin::Perlin;
pub use progress::ProgressReporter;
pub use quad::{make_box, Quad};
pub use renderer::{color_to_rgb8, linear_to_gamma, ray_color, render, render_pixel, ImageBuffer};
pub use sphere::Sphere;
pub use subsurface::{
    sample_henyey_greenstein, SubsurfaceSimple, SubsurfaceVolumetric, DEFAULT_MAX_BOUNCES,
};
pub use texture::{
    CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, MISSING_TEXTURE_COLOR,
};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
