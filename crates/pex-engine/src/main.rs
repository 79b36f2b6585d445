//! # Pex Sim
//!
//! Headless driver for Pex particle emitters.
//!
//! Loads an emitter description, advances it at a fixed frame rate and
//! reports the live particle count. Optionally writes the final vertex
//! buffer to a JSON file for inspection.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod cli;
mod simulate;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::Vec2;
use pex_kernel::{ParticleEmitter, TextureSource};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;

/// Main entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = cli.log_filter(std::env::var("RUST_LOG").ok().as_deref());
    let env_filter =
        EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter {filter:?}"))?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();

    info!("Pex Sim {}", env!("CARGO_PKG_VERSION"));

    let mut emitter = ParticleEmitter::with_seed(cli.seed);
    emitter
        .load_file(&cli.config)
        .with_context(|| format!("Failed to load emitter from {}", cli.config.display()))?;

    if let Some(source) = &cli.source {
        let [x, y] = source.as_slice() else {
            bail!("--source takes exactly two values");
        };
        emitter.set_source_position(Vec2::new(*x, *y));
    }

    match emitter.texture() {
        Some(TextureSource::File(path)) => info!("Texture file: {}", path.display()),
        Some(TextureSource::Inline(bytes)) => info!("Inline texture: {} bytes", bytes.len()),
        None => {}
    }

    let summary = simulate::run(&mut emitter, cli.frames, cli.fps);
    info!(
        "Simulated {} frames: peak {} particles, {} live at end, active={}",
        summary.frames, summary.peak_live, summary.final_live, summary.active
    );

    if let Some(path) = &cli.dump {
        simulate::dump_vertices(&emitter, summary.frames, path)?;
    }

    Ok(())
}
