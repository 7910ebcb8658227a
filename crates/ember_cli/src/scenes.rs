//! Demo scenes.
//!
//! Each builder returns the world wrapped in a BVH, a camera that is placed
//! but not yet sized, and the render settings the scene looks best with.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use ember_core::{Mesh, RenderSettings};
use ember_renderer::sampling::{gen_f32, gen_range_f32, random_vec3};
use ember_renderer::{
    make_box, Background, BvhNode, Camera, CheckerTexture, Color, Dielectric, DiffuseLight,
    Hittable, HittableList, ImageTexture, Lambertian, Material, Metal, NoiseTexture, Point3, Quad,
    SolidColor, Sphere, SubsurfaceSimple, SubsurfaceVolumetric, Texture, Triangle, TriangleMesh,
    Vec3,
};
use rand::RngCore;

const SKY_BLUE: Color = Color::new(0.70, 0.80, 1.00);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Random small spheres, some in motion, around three large ones
    BouncingSpheres,
    CheckeredSpheres,
    Earth,
    PerlinSpheres,
    /// Five coloured quads facing the camera
    Quads,
    SimpleLight,
    CornellBox,
    /// Wax, matte and noise spheres under a small area light
    Subsurface,
    /// Textured triangles and a small pyramid mesh
    Triangles,
    /// An OBJ model on a ground sphere; needs `--model`
    Mesh,
}

/// A world ready to render and the camera looking at it.
pub struct Scene {
    pub world: BvhNode,
    pub camera: Camera,
    pub settings: RenderSettings,
}

impl Scene {
    fn new(objects: HittableList, camera: Camera, settings: RenderSettings) -> Self {
        Self {
            world: BvhNode::new(objects.into_objects()),
            camera,
            settings,
        }
    }
}

/// Build `kind`, drawing any random placement from `rng`.
pub fn build(kind: SceneKind, rng: &mut dyn RngCore, model: Option<&Path>) -> Result<Scene> {
    let scene = match kind {
        SceneKind::BouncingSpheres => bouncing_spheres(rng),
        SceneKind::CheckeredSpheres => checkered_spheres(),
        SceneKind::Earth => earth(),
        SceneKind::PerlinSpheres => perlin_spheres(rng),
        SceneKind::Quads => quads(),
        SceneKind::SimpleLight => simple_light(rng),
        SceneKind::CornellBox => cornell_box(),
        SceneKind::Subsurface => subsurface(rng),
        SceneKind::Triangles => triangles(rng),
        SceneKind::Mesh => {
            let path = model.context("the mesh scene needs --model <file.obj>")?;
            mesh(path)?
        }
    };

    log::debug!("Built scene {:?} (bvh depth {})", kind, scene.world.depth());
    Ok(scene)
}

fn settings(image_width: u32, aspect_ratio: f32, samples_per_pixel: u32, max_depth: u32) -> RenderSettings {
    RenderSettings {
        image_width,
        aspect_ratio,
        samples_per_pixel,
        max_depth,
        ..Default::default()
    }
}

fn lambertian(albedo: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::new(albedo))
}

fn textured(texture: Arc<dyn Texture>) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_texture(texture))
}

fn sphere(center: Point3, radius: f32, material: Arc<dyn Material>) -> Arc<dyn Hittable> {
    Arc::new(Sphere::new(center, radius, material))
}

fn quad(q: Point3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Arc<dyn Hittable> {
    Arc::new(Quad::new(q, u, v, material))
}

fn ground(material: Arc<dyn Material>) -> Arc<dyn Hittable> {
    sphere(Point3::new(0.0, -1000.0, 0.0), 1000.0, material)
}

fn bouncing_spheres(rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();
    world.add(ground(lambertian(Color::splat(0.5))));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Point3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                let center1 = center + Vec3::new(0.0, gen_range_f32(rng, 0.0, 0.5), 0.0);
                world.add(Arc::new(Sphere::moving(center, center1, 0.2, lambertian(albedo))));
            } else if choose_mat < 0.95 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range_f32(rng, 0.0, 0.5);
                world.add(sphere(center, 0.2, Arc::new(Metal::new(albedo, fuzz))));
            } else {
                world.add(sphere(center, 0.2, Arc::new(Dielectric::new(1.5))));
            }
        }
    }

    world.add(sphere(Point3::new(0.0, 1.0, 0.0), 1.0, Arc::new(Dielectric::new(1.5))));
    world.add(sphere(Point3::new(-4.0, 1.0, 0.0), 1.0, lambertian(Color::new(0.4, 0.2, 0.1))));
    world.add(sphere(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    let camera = Camera::new()
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Scene::new(world, camera, settings(400, 16.0 / 9.0, 100, 50))
}

fn checkered_spheres() -> Scene {
    let checker: Arc<dyn Texture> = Arc::new(CheckerTexture::from_colors(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
    ));

    let mut world = HittableList::new();
    world.add(sphere(Point3::new(0.0, -10.0, 0.0), 10.0, textured(checker.clone())));
    world.add(sphere(Point3::new(0.0, 10.0, 0.0), 10.0, textured(checker)));

    let camera = Camera::new()
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Scene::new(world, camera, settings(400, 16.0 / 9.0, 100, 50))
}

fn earth() -> Scene {
    let earth_texture: Arc<dyn Texture> = Arc::new(ImageTexture::load("earthmap.jpg"));

    let mut world = HittableList::new();
    world.add(sphere(Point3::ZERO, 2.0, textured(earth_texture)));

    let camera = Camera::new()
        .with_position(Point3::new(0.0, 0.0, 12.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Scene::new(world, camera, settings(400, 16.0 / 9.0, 100, 50))
}

fn perlin_spheres(rng: &mut dyn RngCore) -> Scene {
    let noise: Arc<dyn Texture> = Arc::new(NoiseTexture::new(4.0, rng));

    let mut world = HittableList::new();
    world.add(ground(textured(noise.clone())));
    world.add(sphere(Point3::new(0.0, 2.0, 0.0), 2.0, textured(noise)));

    let camera = Camera::new()
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Scene::new(world, camera, settings(400, 16.0 / 9.0, 100, 50))
}

fn quads() -> Scene {
    let left_red = lambertian(Color::new(1.0, 0.2, 0.2));
    let back_green = lambertian(Color::new(0.2, 1.0, 0.2));
    let right_blue = lambertian(Color::new(0.2, 0.2, 1.0));
    let upper_orange = lambertian(Color::new(1.0, 0.5, 0.0));
    let lower_teal = lambertian(Color::new(0.2, 0.8, 0.8));

    let mut world = HittableList::new();
    world.add(quad(Point3::new(-3.0, -2.0, 5.0), Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 4.0, 0.0), left_red));
    world.add(quad(Point3::new(-2.0, -2.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), back_green));
    world.add(quad(Point3::new(3.0, -2.0, 1.0), Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 4.0, 0.0), right_blue));
    world.add(quad(Point3::new(-2.0, 3.0, 1.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), upper_orange));
    world.add(quad(Point3::new(-2.0, -3.0, 5.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -4.0), lower_teal));

    let camera = Camera::new()
        .with_position(Point3::new(0.0, 0.0, 9.0), Point3::ZERO, Vec3::Y)
        .with_lens(80.0, 0.0, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Scene::new(world, camera, settings(400, 1.0, 100, 50))
}

fn simple_light(rng: &mut dyn RngCore) -> Scene {
    let noise: Arc<dyn Texture> = Arc::new(NoiseTexture::new(4.0, rng));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(4.0)));

    let mut world = HittableList::new();
    world.add(ground(textured(noise.clone())));
    world.add(sphere(Point3::new(0.0, 2.0, 0.0), 2.0, textured(noise)));
    world.add(sphere(Point3::new(0.0, 7.0, 0.0), 2.0, light.clone()));
    world.add(quad(Point3::new(3.0, 1.0, -2.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), light));

    let camera = Camera::new()
        .with_position(Point3::new(26.0, 3.0, 6.0), Point3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_background(Background::Solid(Color::ZERO));

    Scene::new(world, camera, settings(400, 16.0 / 9.0, 100, 50))
}

fn cornell_box() -> Scene {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::splat(0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(15.0)));

    let mut world = HittableList::new();
    world.add(quad(Point3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), green));
    world.add(quad(Point3::ZERO, Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), red));
    world.add(quad(Point3::new(343.0, 554.0, 332.0), Vec3::new(-130.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -105.0), light));
    world.add(quad(Point3::ZERO, Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), white.clone()));
    world.add(quad(Point3::splat(555.0), Vec3::new(-555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -555.0), white.clone()));
    world.add(quad(Point3::new(0.0, 0.0, 555.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), white.clone()));

    // Two axis-aligned blocks standing on the floor
    for side in make_box(Point3::new(130.0, 0.0, 65.0), Point3::new(295.0, 165.0, 230.0), white.clone()) {
        world.add(side);
    }
    for side in make_box(Point3::new(265.0, 0.0, 295.0), Point3::new(430.0, 330.0, 460.0), white) {
        world.add(side);
    }

    let camera = Camera::new()
        .with_position(Point3::new(278.0, 278.0, -800.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_background(Background::Solid(Color::ZERO));

    Scene::new(world, camera, settings(400, 1.0, 200, 50))
}

fn subsurface(rng: &mut dyn RngCore) -> Scene {
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(4.0)));
    let wax: Arc<dyn Material> =
        Arc::new(SubsurfaceVolumetric::new(Color::new(0.2, 0.5, 0.2), 0.08, 0.8, 0.7));
    let jade: Arc<dyn Material> = Arc::new(SubsurfaceSimple::new(Color::new(0.3, 0.7, 0.5), 0.4));
    let noise: Arc<dyn Texture> = Arc::new(NoiseTexture::new(50.0, rng));

    let mut world = HittableList::new();
    world.add(quad(Point3::new(-1.0, 0.0, 3.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), light));
    world.add(ground(lambertian(Color::splat(0.5))));
    world.add(sphere(Point3::new(0.0, 0.5, 0.0), 0.5, wax));
    world.add(sphere(Point3::new(-1.0, 0.5, 0.0), 0.5, lambertian(Color::new(0.1, 0.3, 0.1))));
    world.add(sphere(Point3::new(1.0, 0.5, 0.0), 0.5, textured(noise)));
    world.add(sphere(Point3::new(0.0, 0.25, -1.2), 0.25, jade));

    let camera = Camera::new()
        .with_position(Point3::new(0.0, 1.0, -5.0), Point3::new(0.0, 0.5, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Scene::new(world, camera, settings(400, 16.0 / 9.0, 100, 15))
}

fn triangles(rng: &mut dyn RngCore) -> Scene {
    let red: Arc<dyn Texture> = Arc::new(SolidColor::new(Color::new(0.9, 0.2, 0.2)));
    let earth: Arc<dyn Texture> = Arc::new(ImageTexture::load("earthmap.jpg"));
    let noise: Arc<dyn Texture> = Arc::new(NoiseTexture::new(24.0, rng));

    let mut world = HittableList::new();
    world.add(ground(lambertian(Color::splat(0.5))));
    world.add(Arc::new(Triangle::new(
        Point3::new(-2.0, 0.0, -1.0),
        Point3::new(-1.0, 2.0, -1.0),
        Point3::new(0.0, 0.0, -1.0),
        textured(red),
    )));
    world.add(Arc::new(Triangle::new(
        Point3::new(0.5, 0.0, 0.0),
        Point3::new(1.5, 2.0, 0.0),
        Point3::new(2.5, 0.0, 0.0),
        textured(earth),
    )));
    world.add(Arc::new(Triangle::new(
        Point3::new(-0.5, 0.0, 1.0),
        Point3::new(0.5, 2.0, 1.0),
        Point3::new(1.5, 0.0, 1.0),
        textured(noise),
    )));

    let gold: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.1));
    world.add(Arc::new(TriangleMesh::new(
        &pyramid(),
        gold,
        0.6,
        Vec3::new(-2.2, 0.0, 1.2),
        true,
    )));

    let camera = Camera::new()
        .with_position(Point3::new(0.0, 1.0, 5.0), Point3::new(0.5, 1.0, 0.0), Vec3::Y)
        .with_lens(50.0, 0.0, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Scene::new(world, camera, settings(400, 16.0 / 9.0, 100, 50))
}

/// Square-based pyramid with its base on y = 0, one unit on a side.
fn pyramid() -> Mesh {
    let positions = vec![
        Point3::new(-0.5, 0.0, -0.5),
        Point3::new(0.5, 0.0, -0.5),
        Point3::new(0.5, 0.0, 0.5),
        Point3::new(-0.5, 0.0, 0.5),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, // base
        3, 2, 4, 2, 1, 4, 1, 0, 4, 0, 3, 4, // sides
    ];
    Mesh::new(positions, indices)
}

fn mesh(path: &Path) -> Result<Scene> {
    let model = Mesh::load_obj(path)
        .with_context(|| format!("Failed to load model {}", path.display()))?;
    log::info!(
        "Loaded {} ({} triangles, {} vertices)",
        path.display(),
        model.triangle_count(),
        model.vertex_count()
    );

    let wood = lambertian(Color::new(0.6, 0.4, 0.2));
    let mut world = HittableList::new();
    world.add(ground(lambertian(Color::splat(0.5))));
    world.add(Arc::new(TriangleMesh::new(&model, wood, 0.1, Vec3::ZERO, true)));

    let camera = Camera::new()
        .with_position(Point3::new(15.0, 5.0, 10.0), Point3::new(0.0, 1.5, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_background(Background::Solid(SKY_BLUE));

    Ok(Scene::new(world, camera, settings(400, 16.0 / 9.0, 50, 10)))
}
