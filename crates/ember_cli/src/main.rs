use anyhow::{Context, Result};
use clap::Parser;
use ember_renderer::render_parallel;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;
mod scenes;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Ember");

    let settings_json = match &args.settings {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?,
        ),
        None => None,
    };

    // Scene placement draws from the base seed too, so a seed fixes the whole image
    let seed = args
        .base_seed(settings_json.as_deref())
        .context("Invalid settings file")?;
    let mut rng = StdRng::seed_from_u64(seed);
    let scene = scenes::build(args.scene, &mut rng, args.model.as_deref())?;

    let settings = args
        .resolve_settings(settings_json.as_deref(), &scene.settings)
        .context("Invalid settings file")?;
    settings.validate().context("Invalid render settings")?;

    if settings.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    let mut camera = scene
        .camera
        .with_aspect_ratio(settings.image_width, settings.aspect_ratio)
        .with_quality(settings.samples_per_pixel, settings.max_depth);
    camera.initialize();

    let image = render_parallel(&camera, &scene.world, settings.seed, settings.bucket_size);

    ember_core::save_image(&args.output, image.width, image.height, &image.to_rgb8())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
