use anyhow::{Context, Result};
use clap::Parser;
use lumen_renderer::{render_scene, IntegratorConfig, RenderConfig};
use std::fs;
use std::path::Path;
use std::time::Instant;

mod cli;
mod scenes;

use cli::Args;

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config = serde_json::from_str(&text).with_context(|| format!("invalid settings in {}", path.display()))?;
    log::info!("Loaded settings from {}", path.display());
    Ok(config)
}

/// Apply command line overrides on top of the loaded settings.
fn apply_overrides(config: &mut RenderConfig, args: &Args) {
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(spp) = args.spp {
        config.samples_per_pixel = spp;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(kind) = args.integrator {
        // Keep tuned settings when the file already picked this integrator.
        if config.integrator.name() != kind.name() {
            if let Some(integrator) = IntegratorConfig::from_name(kind.name()) {
                config.integrator = integrator;
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Lumen");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the thread pool")?;
    }
    log::info!("Using {} threads", rayon::current_num_threads());

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    anyhow::ensure!(
        config.width > 0 && config.height > 0,
        "image size must be positive, got {}x{}",
        config.width,
        config.height
    );

    let start = Instant::now();
    let scene = scenes::build(args.scene, &config)?;
    log::info!("Scene {:?} built in {:.2?}", args.scene, start.elapsed());

    let start = Instant::now();
    let image = render_scene(&scene, &config);
    log::info!("Rendered in {:.2?}", start.elapsed());

    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("Saved to {}", args.output.display());

    Ok(())
}
