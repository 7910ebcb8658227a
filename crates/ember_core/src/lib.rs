//! Ember Core - the I/O around the path tracer.
//!
//! This crate provides:
//!
//! - **Images**: decoding texture images into linear float grids
//! - **Meshes**: indexed triangle meshes and OBJ loading
//! - **Settings**: JSON render settings
//! - **Output**: PPM and PNG writers
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{Mesh, RenderSettings};
//!
//! let settings = RenderSettings::load("settings.json")?;
//! let teapot = Mesh::load_obj("models/teapot.obj")?;
//! println!("{} triangles at {}px wide", teapot.triangle_count(), settings.image_width);
//! ```

pub mod mesh;
pub mod output;
pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError, MeshResult};
pub use output::{save_image, write_png, write_ppm, OutputError, OutputResult};
pub use settings::{RenderSettings, SettingsError, SettingsResult};
pub use texture::{ImageData, ImageError, ImageResult, IMAGE_DIR_ENV};
