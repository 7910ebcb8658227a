//! Textures: colour lookup by surface coordinates and world position.

use std::sync::Arc;

use ember_core::ImageData;
use ember_math::{Color, Interval, Point3};
use rand::RngCore;

use crate::perlin::Perlin;

/// Debug colour for textures without pixel data.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// Trait for colour sources sampled by materials.
pub trait Texture: Send + Sync {
    /// Colour at surface coordinates `(u, v)` and hit point `p`.
    fn value(&self, u: f32, v: f32, p: Point3) -> Color;
}

/// A constant colour.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn from_rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(Color::new(red, green, blue))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Point3) -> Color {
        self.albedo
    }
}

/// A 3D checkerboard alternating between two textures.
pub struct CheckerTexture {
    inv_scale: f32,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    /// Checker with cells `scale` units wide.
    pub fn new(scale: f32, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    pub fn from_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Point3) -> Color {
        let cell = (p * self.inv_scale).floor();
        let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);

        if parity == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// An image mapped by `(u, v)` with nearest-neighbour lookup.
///
/// Without pixel data every lookup returns [`MISSING_TEXTURE_COLOR`].
pub struct ImageTexture {
    image: Option<Arc<ImageData>>,
}

impl ImageTexture {
    pub fn new(image: Arc<ImageData>) -> Self {
        Self { image: Some(image) }
    }

    /// A texture with no image; renders as the debug colour.
    pub fn missing() -> Self {
        Self { image: None }
    }

    /// Find and decode `name`, falling back to the debug colour on failure.
    pub fn load(name: &str) -> Self {
        match ImageData::find(name) {
            Ok(image) => Self::new(Arc::new(image)),
            Err(e) => {
                log::warn!("Could not load texture image '{}': {}", name, e);
                Self::missing()
            }
        }
    }

    pub fn has_image(&self) -> bool {
        self.image
            .as_ref()
            .is_some_and(|image| image.width() > 0 && image.height() > 0)
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Point3) -> Color {
        let image = match &self.image {
            Some(image) if image.height() > 0 => image,
            _ => return MISSING_TEXTURE_COLOR,
        };

        // Clamp into [0, 1] and flip v so that v = 1 is the top row
        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        let v = 1.0 - unit.clamp(v);

        let i = (u * image.width() as f32) as i64;
        let j = (v * image.height() as f32) as i64;
        image.pixel(i, j)
    }
}

/// Marble-like Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Point3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turb(p, 7);
        Color::splat(0.5) * (1.0 + phase.sin())
    }
}
