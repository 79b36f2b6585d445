//! Fixed-rate headless simulation.

use std::path::Path;

use anyhow::{Context, Result};
use pex_common::PointSprite;
use pex_kernel::ParticleEmitter;
use serde::Serialize;
use tracing::info;

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Frames simulated.
    pub frames: u32,
    /// Most particles alive at once.
    pub peak_live: usize,
    /// Particles alive after the last frame.
    pub final_live: usize,
    /// Whether the emitter was still emitting at the end.
    pub active: bool,
}

/// Vertex buffer snapshot written by `--dump`.
#[derive(Debug, Serialize)]
pub struct VertexDump<'a> {
    /// Frames simulated before the snapshot.
    pub frames: u32,
    /// Number of records.
    pub live: usize,
    /// One record per live particle.
    pub vertices: &'a [PointSprite],
}

/// Advances `emitter` for `frames` steps at `fps`.
///
/// Logs the live count once per simulated second.
pub fn run(emitter: &mut ParticleEmitter, frames: u32, fps: u32) -> RunSummary {
    let fps = fps.max(1);
    let delta = 1.0 / fps as f32;

    let mut peak_live = 0;
    for frame in 1..=frames {
        emitter.advance(delta);
        peak_live = peak_live.max(emitter.live_particle_count());

        if frame % fps == 0 {
            info!(
                "t={}s live={} active={}",
                frame / fps,
                emitter.live_particle_count(),
                emitter.is_active()
            );
        }
    }

    RunSummary {
        frames,
        peak_live,
        final_live: emitter.live_particle_count(),
        active: emitter.is_active(),
    }
}

/// Writes the emitter's current vertex buffer as JSON.
pub fn dump_vertices(emitter: &ParticleEmitter, frames: u32, path: &Path) -> Result<()> {
    let dump = VertexDump {
        frames,
        live: emitter.live_particle_count(),
        vertices: emitter.vertex_buffer(),
    };
    let json = serde_json::to_string_pretty(&dump).context("Failed to serialize vertices")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write vertex dump to {}", path.display()))?;
    info!("Wrote {} vertices to {}", dump.live, path.display());
    Ok(())
}
