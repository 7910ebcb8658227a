//! Writing finished images to disk.
//!
//! Pixels arrive as quantized RGB triples in row-major order, top row
//! first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Expected {expected} pixels for the image size, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Unsupported output extension: {0}")]
    UnsupportedFormat(String),
}

pub type OutputResult<T> = Result<T, OutputError>;

fn check_size(width: u32, height: u32, pixels: &[[u8; 3]]) -> OutputResult<()> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(OutputError::SizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Write an ASCII PPM (P3) image.
pub fn write_ppm<W: Write>(
    mut out: W,
    width: u32,
    height: u32,
    pixels: &[[u8; 3]],
) -> OutputResult<()> {
    check_size(width, height, pixels)?;

    writeln!(out, "P3\n{} {}\n255", width, height)?;
    for [r, g, b] in pixels {
        writeln!(out, "{} {} {}", r, g, b)?;
    }
    out.flush()?;
    Ok(())
}

/// Encode a PNG through the `image` crate.
pub fn write_png(path: impl AsRef<Path>, width: u32, height: u32, pixels: &[[u8; 3]]) -> OutputResult<()> {
    check_size(width, height, pixels)?;

    let bytes: Vec<u8> = pixels.iter().flatten().copied().collect();
    image::save_buffer(path, &bytes, width, height, image::ColorType::Rgb8)?;
    Ok(())
}

/// Save by file extension: `.ppm` or `.png`.
pub fn save_image(path: impl AsRef<Path>, width: u32, height: u32, pixels: &[[u8; 3]]) -> OutputResult<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "ppm" => write_ppm(BufWriter::new(File::create(path)?), width, height, pixels),
        "png" => write_png(path, width, height, pixels),
        _ => Err(OutputError::UnsupportedFormat(ext)),
    }?;

    log::info!("Wrote {}x{} image to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_layout() {
        let mut buf = Vec::new();
        let pixels = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [10, 20, 30]];
        write_ppm(&mut buf, 2, 2, &pixels).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "P3");
        assert_eq!(lines[1], "2 2");
        assert_eq!(lines[2], "255");
        assert_eq!(lines[3], "255 0 0");
        assert_eq!(lines[6], "10 20 30");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_size_mismatch() {
        let err = write_ppm(Vec::new(), 3, 3, &[[0, 0, 0]]).unwrap_err();
        assert!(matches!(err, OutputError::SizeMismatch { expected: 9, actual: 1 }));
    }

    #[test]
    fn test_save_png_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let pixels = vec![[1, 2, 3]; 6];
        save_image(&path, 3, 2, &pixels).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [1, 2, 3]);
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(dir.path().join("out.tga2"), 1, 1, &[[0, 0, 0]]).unwrap_err();
        assert!(matches!(err, OutputError::UnsupportedFormat(_)));
    }
}
