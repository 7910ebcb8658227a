use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ember_core::{RenderSettings, SettingsError};
use log::LevelFilter;

use crate::scenes::SceneKind;

/// Log levels accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments.
///
/// Render options left unset fall back to the settings file, then to the
/// scene's own defaults.
#[derive(Debug, Parser)]
#[command(name = "ember")]
#[command(about = "Offline Monte Carlo path tracer")]
pub struct Args {
    /// Demo scene to render
    #[arg(long, value_enum, default_value = "bouncing-spheres")]
    pub scene: SceneKind,

    /// JSON render settings file
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    pub depth: Option<u32>,

    /// Base random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (0 lets rayon decide)
    #[arg(long)]
    pub threads: Option<usize>,

    /// OBJ model for the mesh scene
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Output image (.ppm or .png)
    #[arg(short, long, default_value = "output.ppm")]
    pub output: PathBuf,

    /// Logging level; RUST_LOG filters still apply
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Seed for scene placement: the command line, then the settings file, then 0.
    pub fn base_seed(&self, settings_json: Option<&str>) -> Result<u64, SettingsError> {
        if let Some(seed) = self.seed {
            return Ok(seed);
        }
        match settings_json {
            Some(text) => Ok(RenderSettings::from_json_over(text, &RenderSettings::default())?.seed),
            None => Ok(0),
        }
    }

    /// Final settings: the settings file over the scene's own settings, then
    /// command line overrides.
    pub fn resolve_settings(
        &self,
        settings_json: Option<&str>,
        scene_settings: &RenderSettings,
    ) -> Result<RenderSettings, SettingsError> {
        let settings = match settings_json {
            Some(text) => RenderSettings::from_json_over(text, scene_settings)?,
            None => scene_settings.clone(),
        };
        Ok(self.apply_overrides(settings))
    }

    /// Apply command line overrides on top of `settings`.
    pub fn apply_overrides(&self, mut settings: RenderSettings) -> RenderSettings {
        if let Some(width) = self.width {
            settings.image_width = width;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(depth) = self.depth {
            settings.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(threads) = self.threads {
            settings.threads = threads;
        }
        settings
    }
}
