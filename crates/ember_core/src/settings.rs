//! Render settings shared by the command line and settings files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Image and sampling parameters for a render.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes:
///
/// ```json
/// { "image_width": 1200, "samples_per_pixel": 500 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub image_width: u32,
    /// Width over height; the height is derived from it.
    pub aspect_ratio: f32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Base seed for the per-bucket random generators.
    pub seed: u64,
    /// Bucket edge length in pixels.
    pub bucket_size: u32,
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            seed: 0,
            bucket_size: 32,
            threads: 0,
        }
    }
}

impl RenderSettings {
    /// Read settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate settings from JSON text.
    pub fn from_json(text: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse JSON text whose keys override `base`; missing keys keep the
    /// value from `base` rather than the global default.
    pub fn from_json_over(text: &str, base: &Self) -> SettingsResult<Self> {
        let overrides: Map<String, Value> = serde_json::from_str(text)?;
        let mut merged: Map<String, Value> = serde_json::from_value(serde_json::to_value(base)?)?;
        merged.extend(overrides);

        let settings: Self = serde_json::from_value(Value::Object(merged))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.image_width == 0 {
            return Err(SettingsError::Invalid("image_width must be positive".into()));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "aspect_ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(SettingsError::Invalid("samples_per_pixel must be positive".into()));
        }
        if self.bucket_size == 0 {
            return Err(SettingsError::Invalid("bucket_size must be positive".into()));
        }
        Ok(())
    }

    /// Image height for the configured width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = RenderSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.image_height(), 225);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = RenderSettings::from_json(r#"{ "image_width": 200, "seed": 7 }"#).unwrap();
        assert_eq!(settings.image_width, 200);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.max_depth, RenderSettings::default().max_depth);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = RenderSettings::from_json(r#"{ "samples_per_pixel": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = RenderSettings::from_json(r#"{ "aspect_ratio": -1.0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = RenderSettings::from_json("{ image_width: }").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_height_never_zero() {
        let settings = RenderSettings {
            image_width: 1,
            aspect_ratio: 4.0,
            ..Default::default()
        };
        assert_eq!(settings.image_height(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "max_depth": 5 }"#).unwrap();

        assert_eq!(RenderSettings::load(&path).unwrap().max_depth, 5);
    }

    #[test]
    fn test_json_over_keeps_base_values() {
        let base = RenderSettings {
            aspect_ratio: 1.0,
            max_depth: 12,
            ..Default::default()
        };
        let settings =
            RenderSettings::from_json_over(r#"{ "samples_per_pixel": 8 }"#, &base).unwrap();

        assert_eq!(settings.samples_per_pixel, 8);
        assert_eq!(settings.aspect_ratio, 1.0);
        assert_eq!(settings.max_depth, 12);
    }

    #[test]
    fn test_json_over_validates_and_rejects_non_objects() {
        let base = RenderSettings::default();

        let err = RenderSettings::from_json_over(r#"{ "bucket_size": 0 }"#, &base).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = RenderSettings::from_json_over("[1, 2]", &base).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }
}
