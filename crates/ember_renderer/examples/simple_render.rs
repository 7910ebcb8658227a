//! Simple path tracer example.
//!
//! Renders three spheres on a ground plane and saves a PPM.

use std::sync::Arc;

use ember_renderer::{
    render_parallel, Background, BvhNode, Camera, Color, Dielectric, Hittable, Lambertian,
    Material, Metal, Sphere, Vec3,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Ember Path Tracer - Simple Example");
    println!("==================================");

    let start = std::time::Instant::now();
    let world = build_scene();
    println!("Scene built in {:?}", start.elapsed());

    let mut camera = Camera::new()
        .with_aspect_ratio(400, 16.0 / 9.0)
        .with_quality(32, 10)
        .with_position(
            Vec3::new(13.0, 2.0, 3.0), // look_from
            Vec3::new(0.0, 0.0, 0.0),  // look_at
            Vec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_lens(20.0, 0.6, 10.0)
        .with_background(Background::Sky);
    camera.initialize();

    println!(
        "Rendering {}x{} @ {} spp...",
        camera.image_width, camera.image_height, camera.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let image = render_parallel(&camera, &world, 42, 32);
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    ember_core::save_image(filename, image.width, image.height, &image.to_rgb8())?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> BvhNode {
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let brown: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1)));
    let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0));

    let objects: Vec<Arc<dyn Hittable>> = vec![
        Arc::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)),
        Arc::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)),
        Arc::new(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, brown)),
        Arc::new(Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0, metal)),
    ];

    BvhNode::new(objects)
}
