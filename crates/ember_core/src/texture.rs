//! Image loading for texture lookups.
//!
//! Decodes files with the `image` crate into a grid of linear RGB floats
//! that the renderer's image texture samples by pixel coordinate.

use std::env;
use std::path::{Path, PathBuf};

use ember_math::Color;
use thiserror::Error;

/// Environment variable naming a directory searched first for images.
pub const IMAGE_DIR_ENV: &str = "EMBER_IMAGES";

/// How many parent directories are searched for an `images/` folder.
const PARENT_SEARCH_DEPTH: usize = 6;

/// Errors that can occur during image loading.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image decoding error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Could not find image '{name}' (searched {} locations)", .searched.len())]
    NotFound { name: String, searched: Vec<PathBuf> },
}

pub type ImageResult<T> = Result<T, ImageError>;

/// A decoded image in linear RGB, row-major with (0, 0) at the top-left.
#[derive(Clone, Debug)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl ImageData {
    /// Wrap raw pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Self {
        assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize),
            "pixel buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an image file, converting sRGB bytes to linear floats.
    pub fn load(path: impl AsRef<Path>) -> ImageResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels = rgb
            .pixels()
            .map(|p| {
                [
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                ]
            })
            .collect();

        log::debug!("Loaded image {} ({}x{})", path.display(), width, height);

        Ok(Self::new(width, height, pixels))
    }

    /// Load `name` from the first location that decodes.
    ///
    /// Looks in `$EMBER_IMAGES`, then the working directory, then `images/`
    /// and `../images/` up to six levels.
    pub fn find(name: &str) -> ImageResult<Self> {
        let searched = search_paths(name, env::var_os(IMAGE_DIR_ENV).map(PathBuf::from));

        for path in &searched {
            if !path.is_file() {
                continue;
            }
            match Self::load(path) {
                Ok(image) => return Ok(image),
                Err(e) => log::debug!("Skipping {}: {}", path.display(), e),
            }
        }

        Err(ImageError::NotFound {
            name: name.to_string(),
            searched,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, with coordinates clamped into the image.
    ///
    /// An image with no pixels returns magenta.
    pub fn pixel(&self, x: i64, y: i64) -> Color {
        if self.pixels.is_empty() {
            return Color::new(1.0, 0.0, 1.0);
        }

        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let [r, g, b] = self.pixels[y * self.width as usize + x];
        Color::new(r, g, b)
    }
}

/// Candidate locations for an image file, in lookup order.
fn search_paths(name: &str, image_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(PARENT_SEARCH_DEPTH + 3);

    if let Some(dir) = image_dir {
        paths.push(dir.join(name));
    }
    paths.push(PathBuf::from(name));

    let mut prefix = PathBuf::new();
    for _ in 0..=PARENT_SEARCH_DEPTH {
        paths.push(prefix.join("images").join(name));
        prefix.push("..");
    }

    paths
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
